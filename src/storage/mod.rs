mod dataset;
mod errors;
mod record_source;
mod result_storage;

use crate::models::TransactionRecord;

pub use dataset::Dataset;
pub use errors::DatasetError;
pub use record_source::{read_fee_table, CsvRecordSource};
#[cfg(test)]
pub use record_source::MemoryRecordSource;
pub use result_storage::{QueryOutcome, ResultStorage};

/// Supplies the raw transaction log, in order.
pub trait RecordSource {
    fn records(&self) -> Result<Vec<TransactionRecord>, DatasetError>;
}
