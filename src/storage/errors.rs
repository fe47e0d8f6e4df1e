use crate::models::{AnnotationError, FeeTableError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset error: cannot open [{path}] | {source}")]
    Io {
        path: String,
        source: std::io::Error
    },
    #[error("Dataset error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Dataset error: {0}")]
    Annotation(#[from] AnnotationError),
    #[error("Dataset error: {0}")]
    FeeTable(#[from] FeeTableError)
}
