use crate::models::{SelectionOutcome, SelectionQuery};
use crate::storage::{Dataset, QueryOutcome, ResultStorage};
use anyhow::anyhow;
use csv::{ReaderBuilder, Trim};
use moka::future::Cache;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{spawn_blocking, JoinHandle};
use tracing::{debug, error, warn};

pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// A row of the query file. Amount and flag stay raw until validated.
#[derive(Debug, Clone, Deserialize)]
struct QueryRow {
    country: String,
    #[serde(rename = "card")]
    card_type: String,
    amount: String,
    #[serde(rename = "3D_secured")]
    three_d_secure: String
}

/// Evaluates a file of selection queries against a shared, read-only dataset.
pub struct BatchEngine {
    dataset: Arc<Dataset>,
    storage: Arc<ResultStorage>,
    cache: Cache<SelectionQuery, SelectionOutcome>,
    cache_capacity: u64,
    cache_timeout: Option<Duration>,
    backpressure: usize
}

impl BatchEngine {
    /// Creates a new engine over `dataset`, writing outcomes into `storage`.
    pub fn new(dataset: Arc<Dataset>, storage: Arc<ResultStorage>) -> Self {
        Self {
            dataset,
            storage,
            cache: build_cache(DEFAULT_CACHE_CAPACITY, None),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_timeout: None,
            backpressure: 256
        }
    }

    /// Limits how many distinct queries keep a memoized outcome.
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self.cache = build_cache(self.cache_capacity, self.cache_timeout);
        self
    }

    /// Expires memoized outcomes after `timeout`.
    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = Some(timeout);
        self.cache = build_cache(self.cache_capacity, self.cache_timeout);
        self
    }

    /// Reads the query CSV at `path` and stores one outcome per readable row.
    ///
    /// # Errors
    /// Fails if the query file cannot be opened. Malformed rows are logged and skipped.
    pub async fn run(&self, path: &str) -> anyhow::Result<()> {
        let file = File::open(path)
            .map_err(|error| anyhow!("Error opening CSV at path: {path} | {error}"))?;

        let (sender, receiver) = mpsc::channel::<(usize, QueryRow)>(self.backpressure);
        let csv_handle = self.spawn_csv_reader(file, sender);
        let processing_result = self.process_queries(receiver).await;

        if let Err(error) = csv_handle.await {
            error!("CSV ingestion failed: {error}");
        }

        processing_result
    }

    #[cfg(test)]
    pub async fn is_cached(&self, query: &SelectionQuery) -> bool {
        self.cache.run_pending_tasks().await;
        self.cache.contains_key(query)
    }

    fn spawn_csv_reader(&self, file: File, sender: mpsc::Sender<(usize, QueryRow)>) -> JoinHandle<()> {
        spawn_blocking(move || {
            let mut reader = ReaderBuilder::new()
                .trim(Trim::All)
                .flexible(true)
                .from_reader(BufReader::new(file));

            for (index, result) in reader.deserialize::<QueryRow>().enumerate() {
                match result {
                    Ok(row) => {
                        if sender.blocking_send((index + 1, row)).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        error!("CSV deserialization error: {error}");
                    }
                }
            }
        })
    }

    async fn process_queries(&self, mut receiver: mpsc::Receiver<(usize, QueryRow)>) -> anyhow::Result<()> {
        let mut handles = Vec::new();

        while let Some((line, row)) = receiver.recv().await {
            let dataset = self.dataset.clone();
            let storage = self.storage.clone();
            let cache = self.cache.clone();

            handles.push(tokio::spawn(async move {
                let result = match SelectionQuery::parse(&row.country, &row.card_type, &row.amount, &row.three_d_secure) {
                    Ok(query) => {
                        let outcome = cache.get_with(query.clone(), async { dataset.select(&query) }).await;
                        debug!("Query [{line}] evaluated: {outcome:?}");
                        Ok(outcome)
                    }
                    Err(error) => {
                        warn!("Query [{line}] rejected: {error}");
                        Err(error)
                    }
                };

                storage.save(QueryOutcome {
                    line,
                    country: row.country,
                    card_type: row.card_type,
                    amount: row.amount,
                    three_d_secure: row.three_d_secure,
                    result
                });
            }));
        }

        for handle in handles {
            if let Err(error) = handle.await {
                error!("A query task did not complete gracefully: {error:?}");
            }
        }

        Ok(())
    }
}

fn build_cache(capacity: u64, timeout: Option<Duration>) -> Cache<SelectionQuery, SelectionOutcome> {
    let builder = Cache::builder().max_capacity(capacity);

    match timeout {
        Some(timeout) => builder.time_to_live(timeout).build(),
        None => builder.build()
    }
}
