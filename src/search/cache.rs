//! Memoized search results keyed by a canonical request fingerprint.
//!
//! A hit must return a value previously computed for an identical key;
//! nothing more is guaranteed. Two requests racing on the same key may both
//! compute, and the map never evicts.

use crate::domain::catalog::CatalogResponse;
use crate::domain::request::SearchRequest;
use crate::domain::LogicalOperator;
use crate::error::Result;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<String, CatalogResponse>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical fingerprint of everything that determines a search result.
    pub fn fingerprint(
        request: &SearchRequest,
        page: i64,
        size: i64,
        operator: LogicalOperator,
    ) -> Result<String> {
        let mut s = serde_json::to_string(request)?;
        s.push('|');
        s.push_str(&page.to_string());
        s.push('|');
        s.push_str(&size.to_string());
        s.push('|');
        s.push_str(match operator {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        });

        let mut hasher = Sha256::new();
        hasher.update(s.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }

    pub fn get(&self, key: &str) -> Option<CatalogResponse> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(key).cloned()
    }

    pub fn put(&self, key: String, value: CatalogResponse) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key, value);
    }
}
