use crate::models::{AnnotatedRecord, ProviderFees, SelectionOutcome, SelectionQuery, SelectionResult, TransactionRecord};
use crate::types::InputError;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Running aggregate of one provider's matched records.
#[derive(Debug)]
pub(super) struct ProviderStats {
    attempts: u64,
    successes: u64,
    min_amount: Decimal,
    /// Fees of the first matched record, used only if the country-wide lookup finds nothing.
    fees: ProviderFees
}

impl ProviderStats {
    pub(super) fn new(annotated: &AnnotatedRecord) -> Self {
        Self {
            attempts: 1,
            successes: u64::from(annotated.record.success),
            min_amount: annotated.record.amount,
            fees: annotated.fees
        }
    }

    pub(super) fn observe(&mut self, record: &TransactionRecord) {
        self.attempts += 1;
        self.successes += u64::from(record.success);
        self.min_amount = self.min_amount.min(record.amount);
    }

    fn success_rate(&self) -> f64 {
        self.successes as f64 / self.attempts as f64
    }

    /// Orders by success rate, then by the smallest matched amount.
    ///
    /// Rates are compared as exact fractions.
    pub(super) fn ranking(&self, other: &Self) -> Ordering {
        let lhs = u128::from(self.successes) * u128::from(other.attempts);
        let rhs = u128::from(other.successes) * u128::from(self.attempts);

        lhs.cmp(&rhs).then_with(|| self.min_amount.cmp(&other.min_amount))
    }
}

fn matches(record: &TransactionRecord, query: &SelectionQuery) -> bool {
    record.country == query.country
        && record.card_type == query.card_type
        && record.amount == query.amount
        && record.three_d_secure == query.three_d_secure
}

/// Picks the provider with the lowest historical success rate for `query`.
///
/// Records are filtered by exact equality on country, card type, amount and 3D secure
/// flag. Among the matching providers the lowest success rate wins, then the lowest
/// matched amount, then the lexicographically smallest provider name.
///
/// The reported fees come from the first record in `records` with the query's country
/// and the selected provider, which is not necessarily one of the matched records.
pub fn select(records: &[AnnotatedRecord], query: &SelectionQuery) -> SelectionOutcome {
    let mut groups = BTreeMap::<&str, ProviderStats>::new();

    for annotated in records.iter().filter(|annotated| matches(&annotated.record, query)) {
        groups.entry(annotated.record.provider.as_str())
            .and_modify(|stats| stats.observe(&annotated.record))
            .or_insert_with(|| ProviderStats::new(annotated));
    }

    for (provider, stats) in &groups {
        debug!("Candidate [{provider}]: {}/{} successful, min amount {}", stats.successes, stats.attempts, stats.min_amount);
    }

    //NOTE: BTreeMap iterates in provider order and min_by keeps the first of equal elements
    let Some((provider, stats)) = groups.into_iter().min_by(|(_, lhs), (_, rhs)| lhs.ranking(rhs)) else {
        debug!("No records matched {query:?}");
        return SelectionOutcome::NoMatch;
    };

    let fees = records.iter()
        .find(|annotated| annotated.record.country == query.country && annotated.record.provider == provider)
        .map(|annotated| annotated.fees)
        .unwrap_or(stats.fees);

    SelectionOutcome::Selected(SelectionResult {
        country: query.country.clone(),
        provider: provider.to_string(),
        success_fee: fees.success_fee,
        failure_fee: fees.failure_fee,
        success_rate: stats.success_rate(),
        matched: stats.attempts as usize
    })
}

/// Validates raw form input and runs `select`.
///
/// # Errors
/// Returns `InputError` if the amount or the 3D secure flag cannot be parsed; no
/// selection is attempted in that case.
pub fn select_from_input(
    records: &[AnnotatedRecord],
    country: &str,
    card_type: &str,
    amount: &str,
    three_d_secure: &str
) -> Result<SelectionOutcome, InputError> {
    let query = SelectionQuery::parse(country, card_type, amount, three_d_secure)?;

    Ok(select(records, &query))
}
