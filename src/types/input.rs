use crate::types::errors::InputError;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer};
use std::str::FromStr;

/// Parses a user supplied transaction amount.
///
/// Accepts plain decimals ("150", "150.0", "-3.25") and scientific notation ("1.5e2"),
/// with surrounding whitespace ignored. Anything else, including "NaN" and "inf",
/// is rejected with `InputError::InvalidAmount`.
pub fn parse_amount(value: &str) -> Result<Decimal, InputError> {
    let trimmed = value.trim();

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| InputError::InvalidAmount { input: value.to_string() })
}

/// Parses a user supplied 3D secure flag.
///
/// The value must be an integer equal to 0 or 1. Whitespace, a leading `+`
/// and leading zeros are tolerated ("+1", " 01 ").
pub fn parse_flag(value: &str) -> Result<bool, InputError> {
    match value.trim().parse::<i64>() {
        Ok(0) => Ok(false),
        Ok(1) => Ok(true),
        _ => Err(InputError::InvalidFlag { input: value.to_string() })
    }
}

/// Deserializes a `0`/`1` CSV column into a `bool`.
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_flag(&value).map_err(de::Error::custom)
}
