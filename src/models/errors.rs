use crate::types::ProviderId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Provider [{provider}] of record [{position}] has no entry in the fee table")]
    UnknownProvider {
        provider: ProviderId,
        position: usize
    }
}

#[derive(Debug, Error)]
pub enum FeeTableError {
    #[error("Fee table error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Fee table error: provider [{provider}] is listed more than once")]
    DuplicateProvider {
        provider: ProviderId
    },
    #[error("Fee table error: provider [{provider}] has a negative fee")]
    NegativeFee {
        provider: ProviderId
    },
    #[error("Fee table error: no providers configured")]
    Empty
}
