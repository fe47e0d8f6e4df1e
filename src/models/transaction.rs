use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::ProviderFees;
use crate::types::{deserialize_flag, CardType, Country, ProviderId};

/// Represents a single row of the historical transaction log.
///
/// Column names follow the source export (`tmsp`, `PSP`, `3D_secured`, ...).
/// Columns not listed here are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionRecord {
    /// Timestamp of the attempt, kept in its textual form.
    #[serde(rename = "tmsp")]
    pub timestamp: String,
    pub country: Country,
    #[serde(rename = "card")]
    pub card_type: CardType,
    /// The requested amount.
    pub amount: Decimal,
    /// Whether the cardholder went through 3D secure authentication.
    #[serde(rename = "3D_secured", deserialize_with = "deserialize_flag")]
    pub three_d_secure: bool,
    /// The provider that processed the attempt.
    #[serde(rename = "PSP")]
    pub provider: ProviderId,
    /// Outcome of the attempt.
    #[serde(deserialize_with = "deserialize_flag")]
    pub success: bool
}

/// A `TransactionRecord` enriched with the fees of its provider.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRecord {
    pub record: TransactionRecord,
    pub fees: ProviderFees
}

impl AnnotatedRecord {
    /// The fee actually charged for this attempt given its outcome.
    pub fn incurred_fee(&self) -> Decimal {
        if self.record.success {
            self.fees.success_fee
        } else {
            self.fees.failure_fee
        }
    }
}
