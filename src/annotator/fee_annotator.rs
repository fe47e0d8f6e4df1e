use crate::models::{AnnotatedRecord, AnnotationError, FeeTable, TransactionRecord};
use tracing::debug;

/// Attaches provider fees to every record, preserving order.
///
/// # Errors
/// Returns `AnnotationError::UnknownProvider` for the first record whose provider
/// has no entry in `fee_table`. No partial result is produced.
pub fn annotate<I>(records: I, fee_table: &FeeTable) -> Result<Vec<AnnotatedRecord>, AnnotationError>
where
    I: IntoIterator<Item = TransactionRecord>,
{
    let annotated = records.into_iter()
        .enumerate()
        .map(|(position, record)| -> Result<AnnotatedRecord, AnnotationError> {
            let fees = fee_table.fees_for(&record.provider)
                .ok_or_else(|| AnnotationError::UnknownProvider { provider: record.provider.clone(), position })?;

            Ok(AnnotatedRecord { record, fees })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Annotated {} records with provider fees", annotated.len());

    Ok(annotated)
}
