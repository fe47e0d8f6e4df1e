use rust_decimal::Decimal;
use std::fmt;
use std::fmt::{Display, Formatter};

use crate::models::ProviderFees;
use crate::types::{parse_amount, parse_flag, CardType, Country, InputError, ProviderId};

/// Exact-match criteria a selection is computed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionQuery {
    pub country: Country,
    pub card_type: CardType,
    pub amount: Decimal,
    pub three_d_secure: bool
}

impl SelectionQuery {
    /// Validates raw form input into a query.
    ///
    /// # Errors
    /// `InputError::InvalidAmount` if `amount` is not a number, then
    /// `InputError::InvalidFlag` if `three_d_secure` is not 0 or 1.
    pub fn parse(country: &str, card_type: &str, amount: &str, three_d_secure: &str) -> Result<Self, InputError> {
        Ok(Self {
            country: country.to_string(),
            card_type: card_type.to_string(),
            amount: parse_amount(amount)?,
            three_d_secure: parse_flag(three_d_secure)?
        })
    }
}

/// The provider chosen for a query, with the fees it charges.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub country: Country,
    pub provider: ProviderId,
    pub success_fee: Decimal,
    pub failure_fee: Decimal,
    /// Empirical success rate of the provider over the matched records.
    pub success_rate: f64,
    /// Number of matched records processed by the provider.
    pub matched: usize
}

impl SelectionResult {
    pub fn fees(&self) -> ProviderFees {
        ProviderFees::new(self.success_fee, self.failure_fee)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    Selected(SelectionResult),
    /// No historical record matched the criteria.
    NoMatch
}

impl SelectionOutcome {
    pub fn selected(&self) -> Option<&SelectionResult> {
        match self {
            SelectionOutcome::Selected(result) => Some(result),
            SelectionOutcome::NoMatch => None
        }
    }
}

impl Display for SelectionOutcome {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SelectionOutcome::Selected(result) => {
                writeln!(formatter, "The suggested PSP for {} with the given criteria is {}.", result.country, result.provider)?;
                writeln!(formatter, "The credit card router will be processed to {}.", result.provider)?;
                writeln!(formatter, "Fee on successful transactions: {} Euro", result.success_fee)?;
                write!(formatter, "Fee on failed transactions: {} Euro", result.failure_fee)
            }
            SelectionOutcome::NoMatch => write!(formatter, "No data found for the given input.")
        }
    }
}
