//! Read-only summaries of the annotated transaction log.
//!
//! Covers outcomes, countries, card types, providers, 3D secure usage, fees,
//! amounts and daily success rates.

use crate::models::AnnotatedRecord;
use crate::storage::Dataset;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use tracing::warn;

pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Per-provider usage and the fees it would have charged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderSummary {
    pub attempts: usize,
    pub successes: usize,
    pub fees_incurred: Decimal
}

impl ProviderSummary {
    pub fn success_rate(&self) -> f64 {
        ratio(self.successes, self.attempts)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmountStatistics {
    pub min: Decimal,
    pub max: Decimal,
    /// `None` when the sum of all amounts overflows `Decimal`.
    pub mean: Option<Decimal>,
    /// Record counts per equal-width bin between `min` and `max`.
    /// `None` when `max - min` overflows `Decimal`.
    pub histogram: Option<Vec<usize>>
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetReport {
    pub total: usize,
    pub successes: usize,
    pub by_country: BTreeMap<String, usize>,
    pub by_card_type: BTreeMap<String, usize>,
    pub by_provider: BTreeMap<String, ProviderSummary>,
    pub secured: usize,
    pub unsecured: usize,
    /// `None` for an empty dataset.
    pub amounts: Option<AmountStatistics>,
    /// (successes, attempts) keyed by the date part of the timestamp.
    pub daily: BTreeMap<String, (usize, usize)>
}

impl DatasetReport {
    /// Summarizes `dataset` using `bins` histogram bins (at least one).
    pub fn build(dataset: &Dataset, bins: usize) -> Self {
        let records = dataset.records();
        let mut report = Self {
            total: records.len(),
            successes: 0,
            by_country: BTreeMap::new(),
            by_card_type: BTreeMap::new(),
            by_provider: BTreeMap::new(),
            secured: 0,
            unsecured: 0,
            amounts: amount_statistics(records, bins.max(1)),
            daily: BTreeMap::new()
        };

        for annotated in records {
            let record = &annotated.record;
            let success = usize::from(record.success);

            report.successes += success;
            *report.by_country.entry(record.country.clone()).or_default() += 1;
            *report.by_card_type.entry(record.card_type.clone()).or_default() += 1;

            if record.three_d_secure {
                report.secured += 1;
            } else {
                report.unsecured += 1;
            }

            let provider = report.by_provider.entry(record.provider.clone()).or_default();
            provider.attempts += 1;
            provider.successes += success;
            provider.fees_incurred = provider.fees_incurred.saturating_add(annotated.incurred_fee());

            let day = record.timestamp.get(..10).unwrap_or(&record.timestamp).to_string();
            let daily = report.daily.entry(day).or_default();
            daily.0 += success;
            daily.1 += 1;
        }

        report
    }

    pub fn failures(&self) -> usize {
        self.total - self.successes
    }

    pub fn success_rate(&self) -> f64 {
        ratio(self.successes, self.total)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn amount_statistics(records: &[AnnotatedRecord], bins: usize) -> Option<AmountStatistics> {
    let first = records.first()?.record.amount;
    let (min, max, sum) = records.iter()
        .map(|annotated| annotated.record.amount)
        .fold((first, first, Some(Decimal::ZERO)), |(min, max, sum), amount| {
            (min.min(amount), max.max(amount), sum.and_then(|sum| sum.checked_add(amount)))
        });

    let mean = sum
        .and_then(|sum| sum.checked_div(Decimal::from(records.len())))
        .map(|mean| mean.round_dp(2));

    if mean.is_none() {
        warn!("Amount sum overflowed, mean omitted from report");
    }

    let histogram = histogram(records, min, max, bins);

    if histogram.is_none() {
        warn!("Amount range overflowed, histogram omitted from report");
    }

    Some(AmountStatistics { min, max, mean, histogram })
}

fn histogram(records: &[AnnotatedRecord], min: Decimal, max: Decimal, bins: usize) -> Option<Vec<usize>> {
    let width = max.checked_sub(min)?.checked_div(Decimal::from(bins))?;
    let mut histogram = vec![0usize; bins];

    for annotated in records {
        let index = if width.is_zero() {
            0
        } else {
            annotated.record.amount.checked_sub(min)?
                .checked_div(width)?
                .floor()
                .to_usize()
                .unwrap_or(0)
                .min(bins - 1)
        };

        histogram[index] += 1;
    }

    Some(histogram)
}

impl Display for DatasetReport {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        writeln!(formatter, "Transactions: {}", self.total)?;
        writeln!(formatter, "Successful: {} | Failed: {} | Success rate: {:.2}%", self.successes, self.failures(), self.success_rate() * 100.0)?;
        writeln!(formatter, "3D secured: {} | Not 3D secured: {}", self.secured, self.unsecured)?;

        writeln!(formatter, "\nTransactions by country")?;
        for (country, count) in &self.by_country {
            writeln!(formatter, "  {country}: {count}")?;
        }

        writeln!(formatter, "\nTransactions by card type")?;
        for (card_type, count) in &self.by_card_type {
            writeln!(formatter, "  {card_type}: {count}")?;
        }

        writeln!(formatter, "\nProviders")?;
        for (provider, summary) in &self.by_provider {
            writeln!(
                formatter,
                "  {provider}: {} attempts, {} successful ({:.2}%), fees incurred {} Euro",
                summary.attempts,
                summary.successes,
                summary.success_rate() * 100.0,
                summary.fees_incurred
            )?;
        }

        if let Some(amounts) = &self.amounts {
            let mean = amounts.mean.map_or_else(|| "n/a".to_string(), |mean| mean.to_string());
            writeln!(formatter, "\nAmounts: min {} | max {} | mean {}", amounts.min, amounts.max, mean)?;

            match &amounts.histogram {
                Some(histogram) => writeln!(formatter, "  Histogram: {}", histogram.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "))?,
                None => writeln!(formatter, "  Histogram: n/a (amount range too large)")?
            }
        }

        writeln!(formatter, "\nDaily success rate")?;
        for (day, (successes, attempts)) in &self.daily {
            writeln!(formatter, "  {day}: {:.2}% of {attempts}", ratio(*successes, *attempts) * 100.0)?;
        }

        Ok(())
    }
}
