pub mod cache;
pub mod orchestrator;

use crate::error::Result;
use crate::query::QueryNode;
use async_trait::async_trait;
use serde_json::Value;

pub use cache::ResultCache;
pub use orchestrator::SearchOrchestrator;

/// One result document from the engine, source payload untouched.
#[derive(Debug, Clone)]
pub struct RawHit {
    pub id: Option<String>,
    pub source: Value,
}

/// The seam to the external search engine. The orchestrator owns no
/// translation logic; adapters receive the compiled query tree as-is.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    async fn index_exists(&self, index: &str) -> Result<bool>;

    async fn execute(
        &self,
        index: &str,
        query: &QueryNode,
        from: i64,
        size: i64,
    ) -> Result<Vec<RawHit>>;
}
