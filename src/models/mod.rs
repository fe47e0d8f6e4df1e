mod errors;
mod fees;
mod selection;
mod transaction;

pub use errors::{AnnotationError, FeeTableError};
pub use fees::{FeeTable, ProviderFees};
pub use selection::{SelectionOutcome, SelectionQuery, SelectionResult};
pub use transaction::{AnnotatedRecord, TransactionRecord};
