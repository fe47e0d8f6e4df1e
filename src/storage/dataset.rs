use crate::annotator::annotate;
use crate::models::{AnnotatedRecord, FeeTable, SelectionOutcome, SelectionQuery};
use crate::selector::select;
use crate::storage::{DatasetError, RecordSource};
use tracing::info;

/// The annotated transaction log. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<AnnotatedRecord>
}

impl Dataset {
    /// Reads all records from `source` and annotates them with `fee_table`.
    ///
    /// # Errors
    /// Returns `DatasetError` if the source cannot be read or a record's provider is
    /// missing from the fee table.
    pub fn load<S: RecordSource>(source: &S, fee_table: &FeeTable) -> Result<Self, DatasetError> {
        let records = annotate(source.records()?, fee_table)?;

        info!("Loaded dataset with {} annotated records", records.len());

        Ok(Self { records })
    }

    pub fn records(&self) -> &[AnnotatedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn select(&self, query: &SelectionQuery) -> SelectionOutcome {
        select(&self.records, query)
    }
}
