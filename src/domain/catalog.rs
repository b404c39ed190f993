//! The merged catalog response returned to callers.

use crate::domain::intent::{Context, Descriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<CatalogMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CatalogError>,
}

impl CatalogResponse {
    pub fn from_error(error: CatalogError) -> Self {
        Self {
            context: None,
            message: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Catalog>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<Descriptor>,
    /// Always an array after merging, even when a source document carried a
    /// single bare provider object.
    #[serde(default)]
    pub providers: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogError {
    pub code: String,
    pub message: String,
}

impl CatalogError {
    pub fn no_catalog_data() -> Self {
        Self {
            code: "NO_CATALOG_DATA".to_string(),
            message: "Raw catalog cannot be null or empty".to_string(),
        }
    }

    pub fn no_search_results() -> Self {
        Self {
            code: "NO_SEARCH_RESULTS".to_string(),
            message: "No results found for the search criteria".to_string(),
        }
    }

    pub fn no_providers_found(message: &str) -> Self {
        Self {
            code: "NO_PROVIDERS_FOUND".to_string(),
            message: message.to_string(),
        }
    }

    pub fn transform_error(detail: &str) -> Self {
        Self {
            code: "TRANSFORM_ERROR".to_string(),
            message: format!("Failed to transform response: {}", detail),
        }
    }
}
