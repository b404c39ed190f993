//! Search request shapes and the logical-operator token.

use crate::domain::filters::Filter;
use crate::domain::intent::{Context, Message};
use crate::error::{Result, SearchError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// The body the compiler works on: a Beckn-style context/message pair plus
/// the optional structured search parameters (free text, geo, filters).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchParams>,
}

impl SearchRequest {
    /// Parses a request from JSON, accepting either the bare body or the
    /// versioned envelope (unwrapped to its `request` payload).
    pub fn parse(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("request").is_some() {
            let envelope: RequestEnvelope = serde_json::from_value(value)?;
            return envelope
                .request
                .ok_or_else(|| SearchError::InvalidInput("Envelope has no request body".into()));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Versioned wrapper some callers put around the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<RequestParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<SearchRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msgid: Option<Uuid>,
}

/// Structured search parameters, orthogonal to the flattened intent fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_spatial: Option<GeoSpatial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<Page>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoSpatial {
    pub distance: String,
    pub unit: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub from: i64,
    pub size: i64,
}

/// How the per-field predicates combine at the top of the query tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl FromStr for LogicalOperator {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "AND" => Ok(LogicalOperator::And),
            "OR" => Ok(LogicalOperator::Or),
            _ => Err(SearchError::InvalidInput(
                "Invalid operator. Must be either 'AND' or 'OR'".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_parsing_is_case_insensitive() {
        assert_eq!("and".parse::<LogicalOperator>().unwrap(), LogicalOperator::And);
        assert_eq!("Or".parse::<LogicalOperator>().unwrap(), LogicalOperator::Or);
        assert!("xor".parse::<LogicalOperator>().is_err());
    }

    #[test]
    fn test_parse_bare_body() {
        let request = SearchRequest::parse(
            r#"{"context": {"domain": "retail"}, "message": {"intent": {}}}"#,
        )
        .unwrap();
        assert_eq!(
            request.context.unwrap().domain.as_deref(),
            Some("retail")
        );
    }

    #[test]
    fn test_parse_envelope_unwraps_request() {
        let envelope = json!({
            "id": "api.catalog.search",
            "ver": "1.0",
            "params": {"msgid": "9e860d66-5d97-42a1-a4a1-3f2e2e4e2f58"},
            "request": {
                "context": {"domain": "retail"},
                "search": {"text": "espresso"}
            }
        });

        let request = SearchRequest::parse(&envelope.to_string()).unwrap();
        assert_eq!(
            request.search.unwrap().text.as_deref(),
            Some("espresso")
        );
    }

    #[test]
    fn test_search_params_carry_filters_and_page() {
        let request = SearchRequest::parse(
            &json!({
                "context": {"domain": "retail"},
                "search": {
                    "filters": [{"type": "and", "fields": [
                        {"name": "city", "op": "eq", "value": "Austin"}
                    ]}],
                    "page": {"from": 2, "size": 25}
                }
            })
            .to_string(),
        )
        .unwrap();

        let search = request.search.unwrap();
        assert_eq!(search.filters.unwrap().len(), 1);
        let page = search.page.unwrap();
        assert_eq!(page, Page { from: 2, size: 25 });
    }

    #[test]
    fn test_parse_envelope_without_body_is_invalid() {
        let err = SearchRequest::parse(r#"{"request": null}"#).unwrap_err();
        assert!(matches!(err, SearchError::InvalidInput(_)));
    }
}
