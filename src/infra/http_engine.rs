//! HTTP adapter for a remote search engine.

use crate::error::{Result, SearchError};
use crate::query::QueryNode;
use crate::search::{RawHit, SearchEngine};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub struct HttpSearchEngine {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSearchEngine {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, 30)
    }

    /// A timed-out call is reported like any other engine failure; there is
    /// no retry here.
    pub fn with_timeout(base_url: impl Into<String>, timeout_seconds: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl SearchEngine for HttpSearchEngine {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        let url = format!("{}/{}", self.base_url, index);
        let resp = self.client.head(&url).send().await?;
        Ok(resp.status().is_success())
    }

    async fn execute(
        &self,
        index: &str,
        query: &QueryNode,
        from: i64,
        size: i64,
    ) -> Result<Vec<RawHit>> {
        let url = format!("{}/{}/_search", self.base_url, index);
        let body = json!({
            "query": query.to_value(),
            "from": from,
            "size": size,
        });
        debug!(%url, "Posting search query");

        let resp = self.client.post(&url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(SearchError::Upstream(format!(
                "Search request returned {}: {}",
                status, detail
            )));
        }

        let payload: Value = resp.json().await?;
        let hits = payload["hits"]["hits"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        Ok(hits
            .into_iter()
            .map(|hit| RawHit {
                id: hit
                    .get("_id")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                source: hit.get("_source").cloned().unwrap_or(Value::Null),
            })
            .collect())
    }
}
