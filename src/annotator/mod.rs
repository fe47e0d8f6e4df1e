mod fee_annotator;

pub use fee_annotator::annotate;
