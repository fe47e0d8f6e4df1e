use crate::models::errors::FeeTableError;
use crate::types::ProviderId;
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use tracing::debug;

/// Fixed fees charged by a provider, in Euro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderFees {
    pub success_fee: Decimal,
    pub failure_fee: Decimal
}

impl ProviderFees {
    pub fn new(success_fee: Decimal, failure_fee: Decimal) -> Self {
        Self { success_fee, failure_fee }
    }
}

#[derive(Debug, Deserialize)]
struct FeeRow {
    #[serde(rename = "PSP")]
    provider: ProviderId,
    #[serde(rename = "fee_successful")]
    success_fee: Decimal,
    #[serde(rename = "fee_failed")]
    failure_fee: Decimal
}

/// Static mapping from provider identity to its fees.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeTable {
    fees: BTreeMap<ProviderId, ProviderFees>
}

impl FeeTable {
    /// Builds a table from `(provider, fees)` pairs.
    ///
    /// # Errors
    /// Returns `FeeTableError` if the table is empty, a provider appears twice
    /// or any fee is negative.
    pub fn new<I>(entries: I) -> Result<Self, FeeTableError>
    where
        I: IntoIterator<Item = (ProviderId, ProviderFees)>,
    {
        let mut fees = BTreeMap::new();

        for (provider, provider_fees) in entries {
            if provider_fees.success_fee.is_sign_negative() || provider_fees.failure_fee.is_sign_negative() {
                return Err(FeeTableError::NegativeFee { provider });
            }

            if fees.contains_key(&provider) {
                return Err(FeeTableError::DuplicateProvider { provider });
            }

            fees.insert(provider, provider_fees);
        }

        if fees.is_empty() {
            return Err(FeeTableError::Empty);
        }

        Ok(Self { fees })
    }

    /// Reads a table from CSV with the header `PSP,fee_successful,fee_failed`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FeeTableError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();

        for result in reader.deserialize::<FeeRow>() {
            let row = result?;
            debug!("Fee table entry [{}]: success {} / failure {}", row.provider, row.success_fee, row.failure_fee);
            entries.push((row.provider, ProviderFees::new(row.success_fee, row.failure_fee)));
        }

        Self::new(entries)
    }

    pub fn fees_for(&self, provider: &str) -> Option<ProviderFees> {
        self.fees.get(provider).copied()
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.fees.keys().map(String::as_str)
    }
}

impl Default for FeeTable {
    fn default() -> Self {
        let entries = [
            ("Moneycard", 5, 0, 2, 0),
            ("Goldcard", 10, 0, 5, 0),
            ("UK_Card", 3, 0, 1, 0),
            ("Simplecard", 1, 0, 5, 1),
        ];

        let fees = entries.into_iter()
            .map(|(provider, success, success_scale, failure, failure_scale)| {
                let fees = ProviderFees::new(Decimal::new(success, success_scale), Decimal::new(failure, failure_scale));
                (provider.to_string(), fees)
            })
            .collect();

        Self { fees }
    }
}
