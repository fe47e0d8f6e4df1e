mod dataset_report;

pub use dataset_report::{DatasetReport, DEFAULT_HISTOGRAM_BINS};
