//! Merges raw catalog documents into one normalized catalog response.
//!
//! Input is either a JSON array of per-hit catalog fragments (each a
//! serialized JSON string or an inline object) or a single bare document.
//! The merger always returns a response-shaped value; parse failures are
//! reported through the error channel, never thrown past this boundary.
//! Parsed documents are never mutated in place: normalized providers are
//! newly built values.

use crate::domain::catalog::{Catalog, CatalogError, CatalogMessage, CatalogResponse};
use crate::domain::intent::{Context, Descriptor};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Unwraps a hit document that carries its fragment under a `raw_catalog`
/// key; any other document is returned unchanged.
pub fn extract_raw_catalog(document: &str) -> crate::error::Result<String> {
    let node: Value = serde_json::from_str(document)?;
    if let Some(inner) = node.get("raw_catalog").and_then(Value::as_str) {
        return Ok(inner.to_string());
    }
    Ok(document.to_string())
}

pub fn merge_raw_catalog(raw: &str) -> CatalogResponse {
    if raw.trim().is_empty() {
        return CatalogResponse::from_error(CatalogError::no_catalog_data());
    }

    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Raw catalog is not valid JSON: {}", e);
            return CatalogResponse::from_error(CatalogError::transform_error(&e.to_string()));
        }
    };

    match parsed {
        Value::Array(elements) if elements.is_empty() => {
            CatalogResponse::from_error(CatalogError::no_search_results())
        }
        Value::Array(elements) => merge_elements(&elements),
        single => merge_single(&single),
    }
}

/// Merges one catalog fragment per hit. The descriptor comes from the first
/// fragment that has one; providers from every fragment are concatenated.
fn merge_elements(elements: &[Value]) -> CatalogResponse {
    let mut resolved = Vec::with_capacity(elements.len());
    for element in elements {
        match resolve_element(element) {
            Ok(value) => resolved.push(value),
            Err(e) => {
                warn!("Catalog fragment failed to parse: {}", e);
                return CatalogResponse::from_error(CatalogError::transform_error(&e.to_string()));
            }
        }
    }

    let descriptor = resolved
        .first()
        .and_then(catalog_node)
        .and_then(|catalog| catalog.get("descriptor"))
        .and_then(parse_descriptor);

    let mut providers = Vec::new();
    for element in &resolved {
        let Some(catalog) = catalog_node(element) else {
            debug!("Fragment has no message.catalog, contributing nothing");
            continue;
        };
        match catalog.get("providers") {
            Some(Value::Array(entries)) => {
                for entry in entries {
                    if let Some(provider) = normalize_provider(entry) {
                        providers.push(provider);
                    }
                }
            }
            Some(single) => {
                if let Some(provider) = normalize_provider(single) {
                    providers.push(provider);
                }
            }
            None => {}
        }
    }

    let error = if providers.is_empty() {
        Some(CatalogError::no_providers_found(
            "No matching providers found in the search results",
        ))
    } else {
        None
    };

    CatalogResponse {
        context: None,
        message: Some(CatalogMessage {
            catalog: Some(Catalog {
                descriptor,
                providers,
            }),
        }),
        error,
    }
}

/// Merges a single bare document, which must carry `message.catalog`.
fn merge_single(document: &Value) -> CatalogResponse {
    // Hit sources sometimes wrap their fragment one level deeper.
    if let Some(inner) = document.get("raw_catalog").and_then(Value::as_str) {
        return merge_raw_catalog(inner);
    }

    let Some(catalog) = catalog_node(document) else {
        return CatalogResponse::from_error(CatalogError::transform_error(
            "document is missing message.catalog",
        ));
    };

    let context = document
        .get("context")
        .and_then(|c| serde_json::from_value::<Context>(c.clone()).ok());
    let descriptor = catalog.get("descriptor").and_then(parse_descriptor);

    let (providers, error) = match catalog.get("providers") {
        Some(Value::Array(entries)) => (
            entries.iter().filter_map(normalize_provider).collect(),
            None,
        ),
        Some(single) => (normalize_provider(single).into_iter().collect(), None),
        None => (
            Vec::new(),
            Some(CatalogError::no_providers_found(
                "No providers found in the catalog",
            )),
        ),
    };

    CatalogResponse {
        context,
        message: Some(CatalogMessage {
            catalog: Some(Catalog {
                descriptor,
                providers,
            }),
        }),
        error,
    }
}

/// Array elements are serialized fragments or inline objects.
fn resolve_element(element: &Value) -> serde_json::Result<Value> {
    match element {
        Value::String(serialized) => serde_json::from_str(serialized),
        other => Ok(other.clone()),
    }
}

fn catalog_node(document: &Value) -> Option<&Map<String, Value>> {
    document
        .get("message")
        .and_then(|m| m.get("catalog"))
        .and_then(Value::as_object)
}

fn parse_descriptor(node: &Value) -> Option<Descriptor> {
    serde_json::from_value(node.clone()).ok()
}

/// Builds a normalized copy of a provider, forcing its `items` field to
/// array shape. Entries that are not objects are dropped.
fn normalize_provider(provider: &Value) -> Option<Value> {
    let Some(fields) = provider.as_object() else {
        warn!("Skipping non-object provider entry");
        return None;
    };
    let mut normalized = fields.clone();
    if let Some(items) = normalized.get("items") {
        if !items.is_array() {
            let wrapped = Value::Array(vec![items.clone()]);
            normalized.insert("items".to_string(), wrapped);
        }
    }
    Some(Value::Object(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_doc() -> Value {
        json!({
            "context": {"domain": "retail"},
            "message": {"catalog": {
                "descriptor": {"name": "City Market"},
                "providers": [
                    {"id": "p1", "items": {"descriptor": {"name": "Latte"}}},
                    {"id": "p2", "items": [{"descriptor": {"name": "Mocha"}}]}
                ]
            }}
        })
    }

    #[test]
    fn test_empty_input_is_invalid() {
        let response = merge_raw_catalog("   ");
        assert_eq!(response.error.unwrap().code, "NO_CATALOG_DATA");
        assert!(response.message.is_none());
    }

    #[test]
    fn test_empty_array_is_no_search_results() {
        let response = merge_raw_catalog("[]");
        assert_eq!(response.error.unwrap().code, "NO_SEARCH_RESULTS");
    }

    #[test]
    fn test_invalid_json_is_transform_error() {
        let response = merge_raw_catalog("{\"invalid: json}");
        let error = response.error.unwrap();
        assert_eq!(error.code, "TRANSFORM_ERROR");
        assert!(error.message.contains("Failed to transform"));
    }

    #[test]
    fn test_single_document_merges_providers() {
        let response = merge_raw_catalog(&sample_doc().to_string());
        let catalog = response.message.unwrap().catalog.unwrap();
        assert_eq!(catalog.descriptor.unwrap().name.as_deref(), Some("City Market"));
        assert_eq!(catalog.providers.len(), 2);
        assert!(response.error.is_none());
    }

    #[test]
    fn test_bare_items_object_normalizes_to_array() {
        let response = merge_raw_catalog(&sample_doc().to_string());
        let catalog = response.message.unwrap().catalog.unwrap();
        let items = catalog.providers[0].get("items").unwrap();
        assert!(items.is_array());
        assert_eq!(items.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_array_of_serialized_fragments_concatenates_providers() {
        let second = json!({
            "message": {"catalog": {
                "descriptor": {"name": "Ignored Later Descriptor"},
                "providers": {"id": "p3"}
            }}
        });
        let raw = serde_json::to_string(&json!([
            sample_doc().to_string(),
            second.to_string()
        ]))
        .unwrap();

        let response = merge_raw_catalog(&raw);
        let catalog = response.message.unwrap().catalog.unwrap();
        // Descriptor is first-wins; providers accumulate across fragments.
        assert_eq!(catalog.descriptor.unwrap().name.as_deref(), Some("City Market"));
        assert_eq!(catalog.providers.len(), 3);
    }

    #[test]
    fn test_single_provider_object_becomes_one_element_array() {
        let doc = json!({
            "message": {"catalog": {"providers": {"id": "solo", "items": {"x": 1}}}}
        });
        let response = merge_raw_catalog(&doc.to_string());
        let catalog = response.message.unwrap().catalog.unwrap();
        assert_eq!(catalog.providers.len(), 1);
        assert!(catalog.providers[0]["items"].is_array());
    }

    #[test]
    fn test_array_with_no_providers_keeps_catalog_and_flags_error() {
        let doc = json!({"message": {"catalog": {"descriptor": {"name": "Empty"}}}});
        let raw = json!([doc.to_string()]).to_string();
        let response = merge_raw_catalog(&raw);

        let error = response.error.unwrap();
        assert_eq!(error.code, "NO_PROVIDERS_FOUND");
        // The catalog structure is still returned alongside the error.
        let catalog = response.message.unwrap().catalog.unwrap();
        assert!(catalog.providers.is_empty());
        assert_eq!(catalog.descriptor.unwrap().name.as_deref(), Some("Empty"));
    }

    #[test]
    fn test_object_without_catalog_is_transform_error() {
        let response = merge_raw_catalog("{\"unexpected\": true}");
        let error = response.error.unwrap();
        assert_eq!(error.code, "TRANSFORM_ERROR");
    }

    #[test]
    fn test_malformed_fragment_inside_array_is_transform_error() {
        let raw = json!(["{not json"]).to_string();
        let response = merge_raw_catalog(&raw);
        assert_eq!(response.error.unwrap().code, "TRANSFORM_ERROR");
    }

    #[test]
    fn test_single_element_array_matches_bare_object_content() {
        let doc = sample_doc();
        let from_array = merge_raw_catalog(&json!([doc.to_string()]).to_string());
        let from_object = merge_raw_catalog(&doc.to_string());

        let array_catalog = from_array.message.unwrap().catalog.unwrap();
        let object_catalog = from_object.message.unwrap().catalog.unwrap();
        assert_eq!(array_catalog.descriptor, object_catalog.descriptor);
        assert_eq!(array_catalog.providers, object_catalog.providers);
    }

    #[test]
    fn test_non_object_provider_entries_are_skipped() {
        let doc = json!({
            "message": {"catalog": {"providers": [{"id": "ok"}, "stray-string", 42]}}
        });
        let response = merge_raw_catalog(&doc.to_string());
        let catalog = response.message.unwrap().catalog.unwrap();
        assert_eq!(catalog.providers.len(), 1);
    }

    #[test]
    fn test_raw_catalog_wrapper_is_unwrapped() {
        let inner = sample_doc().to_string();
        let wrapped = json!({"raw_catalog": inner}).to_string();

        let direct = merge_raw_catalog(&inner);
        let unwrapped = merge_raw_catalog(&wrapped);
        assert_eq!(
            direct.message.unwrap().catalog.unwrap().providers.len(),
            unwrapped.message.unwrap().catalog.unwrap().providers.len()
        );
    }

    #[test]
    fn test_extract_raw_catalog_passthrough() {
        let plain = sample_doc().to_string();
        assert_eq!(extract_raw_catalog(&plain).unwrap(), plain);

        let wrapped = json!({"raw_catalog": "{\"a\": 1}"}).to_string();
        assert_eq!(extract_raw_catalog(&wrapped).unwrap(), "{\"a\": 1}");
    }
}
