//! In-memory engine adapter for tests and offline runs.
//!
//! Holds seeded documents per index and serves them paged. It does not
//! evaluate the query tree; matching is the real engine's job.

use crate::error::Result;
use crate::query::QueryNode;
use crate::search::{RawHit, SearchEngine};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryEngine {
    indices: HashMap<String, Vec<Value>>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, name: impl Into<String>, documents: Vec<Value>) -> Self {
        self.indices.insert(name.into(), documents);
        self
    }

    pub fn insert(&mut self, index: impl Into<String>, document: Value) {
        self.indices.entry(index.into()).or_default().push(document);
    }
}

#[async_trait]
impl SearchEngine for InMemoryEngine {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        Ok(self.indices.contains_key(index))
    }

    async fn execute(
        &self,
        index: &str,
        _query: &QueryNode,
        from: i64,
        size: i64,
    ) -> Result<Vec<RawHit>> {
        let documents = self.indices.get(index).cloned().unwrap_or_default();
        Ok(documents
            .into_iter()
            .skip(from.max(0) as usize)
            .take(size.max(0) as usize)
            .map(|source| RawHit { id: None, source })
            .collect())
    }
}
