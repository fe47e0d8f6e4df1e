use crate::models::{FeeTable, TransactionRecord};
use crate::storage::{DatasetError, RecordSource};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Reads the transaction log from a CSV file.
pub struct CsvRecordSource {
    path: PathBuf
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Deserializes every row of `reader`, logging and skipping rows that fail.
    pub fn read<R: Read>(reader: R) -> Result<Vec<TransactionRecord>, DatasetError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(reader);

        //NOTE: Fail fast when the header itself cannot be read, only data rows are skippable
        reader.headers()?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for result in reader.deserialize::<TransactionRecord>() {
            match result {
                Ok(record) => records.push(record),
                Err(error) => {
                    error!("CSV deserialization error: {error}");
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!("Skipped {skipped} malformed transaction rows");
        }

        Ok(records)
    }
}

impl RecordSource for CsvRecordSource {
    fn records(&self) -> Result<Vec<TransactionRecord>, DatasetError> {
        let file = File::open(&self.path).map_err(|source| DatasetError::Io {
            path: self.path.display().to_string(),
            source
        })?;

        let records = Self::read(BufReader::new(file))?;

        info!("Read {} transactions from {}", records.len(), self.path.display());

        Ok(records)
    }
}

/// Serves records that are already in memory.
#[cfg(test)]
pub struct MemoryRecordSource {
    records: Vec<TransactionRecord>
}

#[cfg(test)]
impl MemoryRecordSource {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self { records }
    }
}

#[cfg(test)]
impl RecordSource for MemoryRecordSource {
    fn records(&self) -> Result<Vec<TransactionRecord>, DatasetError> {
        Ok(self.records.clone())
    }
}

/// Reads a fee table override from a CSV file.
pub fn read_fee_table(path: &Path) -> Result<FeeTable, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source
    })?;

    let fee_table = FeeTable::from_reader(BufReader::new(file))?;

    info!("Loaded fee table for {} providers from {}", fee_table.providers().count(), path.display());

    Ok(fee_table)
}
