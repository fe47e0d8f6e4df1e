use crate::models::SelectionOutcome;
use crate::types::InputError;
use dashmap::DashMap;
use std::sync::Arc;

/// Outcome of one batch query, keyed by its line in the query file.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub line: usize,
    pub country: String,
    pub card_type: String,
    pub amount: String,
    pub three_d_secure: String,
    pub result: Result<SelectionOutcome, InputError>
}

pub struct ResultStorage {
    results: Arc<DashMap<usize, QueryOutcome>>
}

impl ResultStorage {
    pub fn new() -> Self {
        Self {
            results: Arc::new(DashMap::new())
        }
    }

    pub fn save(&self, outcome: QueryOutcome) {
        self.results.insert(outcome.line, outcome);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// All outcomes ordered by line.
    pub fn sorted(&self) -> Vec<QueryOutcome> {
        let mut outcomes: Vec<_> = self.results.iter().map(|entry| entry.value().clone()).collect();
        outcomes.sort_by_key(|outcome| outcome.line);
        outcomes
    }
}
