mod batch_engine;

pub use batch_engine::{BatchEngine, DEFAULT_CACHE_CAPACITY};
