use crate::error::{Result, SearchError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Search-side configuration consumed by the query compiler and orchestrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Radius applied to geo-distance predicates, e.g. "1km".
    pub geo_distance: String,
    /// Page size used when the caller does not supply one.
    pub default_page_size: i64,
    /// Hard ceiling on the page size accepted from callers.
    pub max_results: i64,
    /// Columns the free-text query is matched against.
    pub fulltext_columns: Vec<String>,
    /// When false, flattened intent fields compile to exact term predicates
    /// instead of analyzed text matches.
    pub intent_text_match: bool,
    /// Base URL of the search engine, if one is wired in.
    pub engine_url: Option<String>,
    /// Request-level timeout applied around engine calls.
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            geo_distance: "1km".to_string(),
            default_page_size: 10,
            max_results: 100,
            fulltext_columns: vec![
                "providers_descriptor_name".to_string(),
                "providers_items_descriptor_name".to_string(),
                "providers_items_descriptor_short_desc".to_string(),
                "providers_items_descriptor_long_desc".to_string(),
            ],
            intent_text_match: true,
            engine_url: None,
            timeout_seconds: 30,
        }
    }
}

impl SearchConfig {
    /// Loads `config.toml` from the working directory, falling back to
    /// defaults when the file is absent.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        if !Path::new(config_path).exists() {
            debug!("No config file at '{}', using defaults", config_path);
            return Ok(Self::default());
        }
        Self::from_file(config_path)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            SearchError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let config: SearchConfig = toml::from_str(&config_content)?;
        Ok(config)
    }
}
