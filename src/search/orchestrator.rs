//! Thin seam between the query compiler and the external search engine.
//!
//! Resolves the domain to an index name, clamps pagination, executes the
//! compiled query, and hands raw hits to the merger. Engine failures are
//! reported once, never retried here.

use crate::config::SearchConfig;
use crate::domain::catalog::CatalogResponse;
use crate::domain::request::SearchRequest;
use crate::domain::LogicalOperator;
use crate::error::{Result, SearchError};
use crate::merge::merge_raw_catalog;
use crate::observability::metrics;
use crate::query::QueryCompiler;
use crate::search::{RawHit, ResultCache, SearchEngine};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub struct SearchOrchestrator {
    engine: Arc<dyn SearchEngine>,
    compiler: QueryCompiler,
    config: SearchConfig,
    cache: ResultCache,
}

impl SearchOrchestrator {
    pub fn new(engine: Arc<dyn SearchEngine>, config: SearchConfig) -> Self {
        Self {
            engine,
            compiler: QueryCompiler::new(config.clone()),
            config,
            cache: ResultCache::new(),
        }
    }

    /// Maps the request domain to a physical index name.
    pub fn resolve_index(request: &SearchRequest) -> Result<String> {
        let domain = request
            .context
            .as_ref()
            .and_then(|c| c.domain.as_deref())
            .ok_or_else(|| {
                SearchError::InvalidInput(
                    "Domain must be specified in the request context".to_string(),
                )
            })?;
        Ok(domain.to_lowercase().replace(':', "-"))
    }

    /// Pagination: size in (0, max_results], page number at least zero.
    fn clamp_page(&self, page: i64, size: i64) -> (i64, i64) {
        let size = if size > 0 {
            size.min(self.config.max_results)
        } else {
            self.config.default_page_size
        };
        (page.max(0), size)
    }

    /// Executes the compiled query and returns raw hits untouched.
    pub async fn search(
        &self,
        request: &SearchRequest,
        page: i64,
        size: i64,
        operator: LogicalOperator,
    ) -> Result<Vec<RawHit>> {
        let index = Self::resolve_index(request)?;
        if !self.engine.index_exists(&index).await? {
            return Err(SearchError::IndexNotFound(index));
        }

        let query = self.compiler.compile(request, operator)?;
        let (page, size) = self.clamp_page(page, size);

        debug!(index = %index, page, size, "Executing search");
        metrics::search_executed(&index);
        self.engine.execute(&index, &query, page * size, size).await
    }

    /// Collects the per-hit catalog fragments into one JSON array string,
    /// "[]" when there are no hits.
    pub async fn search_raw_catalog(
        &self,
        request: &SearchRequest,
        page: i64,
        size: i64,
        operator: LogicalOperator,
    ) -> Result<String> {
        let hits = self.search(request, page, size, operator).await?;

        let raw_catalogs: Vec<String> = hits
            .iter()
            .filter_map(|hit| hit.source.get("raw_catalog"))
            .map(raw_catalog_text)
            .collect();

        info!(hits = hits.len(), fragments = raw_catalogs.len(), "Search completed");
        Ok(serde_json::to_string(&raw_catalogs)?)
    }

    /// The full flow: compile, execute, merge, with result memoization.
    pub async fn search_merged(
        &self,
        request: &SearchRequest,
        page: i64,
        size: i64,
        operator: LogicalOperator,
    ) -> Result<CatalogResponse> {
        let key = ResultCache::fingerprint(request, page, size, operator)?;
        if let Some(cached) = self.cache.get(&key) {
            debug!("Serving merged catalog from cache");
            metrics::cache_hit();
            return Ok(cached);
        }
        metrics::cache_miss();

        let raw = self.search_raw_catalog(request, page, size, operator).await?;
        let mut response = merge_raw_catalog(&raw);
        if let Some(error) = response.error.as_ref() {
            metrics::merge_flagged(&error.code);
        }
        if response.context.is_none() {
            response.context = request.context.clone();
        }

        self.cache.put(key, response.clone());
        Ok(response)
    }
}

fn raw_catalog_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // A fragment stored as an object is carried forward as its JSON text.
        other => other.to_string(),
    }
}
