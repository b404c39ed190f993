//! Compiles a search request into a boolean query tree.
//!
//! Flattened intent fields, the context location, the free-text parameter,
//! the geo-spatial parameter, and any explicit filter groups all contribute
//! predicates; the caller's logical operator decides how the per-field
//! groups combine at the top.

use crate::config::SearchConfig;
use crate::domain::intent::Location;
use crate::domain::request::{GeoSpatial, SearchRequest};
use crate::domain::LogicalOperator;
use crate::error::Result;
use crate::query::filters::compile_filters;
use crate::query::flatten::{flatten_fields, is_gps_field, FieldMap, FlatValue};
use crate::query::node::{BoolOp, Predicate, QueryNode, DESCRIPTOR_BOOST};
use tracing::{debug, warn};

pub struct QueryCompiler {
    config: SearchConfig,
}

impl QueryCompiler {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn compile(
        &self,
        request: &SearchRequest,
        operator: LogicalOperator,
    ) -> Result<QueryNode> {
        let op = BoolOp::from(operator);
        let mut queries: Vec<QueryNode> = Vec::new();

        if let Some(location) = request.context.as_ref().and_then(|c| c.location.as_ref()) {
            self.push_context_location(location, &mut queries);
        }

        if let Some(intent) = request.message.as_ref().and_then(|m| m.intent.as_ref()) {
            let intent_value = serde_json::to_value(intent)?;
            let flattened = flatten_fields("", &intent_value);
            debug!(fields = flattened.len(), "Flattened intent");
            self.push_intent_fields(&flattened, op, &mut queries);
        }

        if let Some(search) = request.search.as_ref() {
            if let Some(text) = search.text.as_deref() {
                queries.push(self.fulltext_query(text));
            }
            if let Some(geo) = search.geo_spatial.as_ref() {
                queries.push(geo_spatial_query(geo));
            }
            if let Some(filters) = search.filters.as_deref() {
                if !filters.is_empty() {
                    queries.push(compile_filters(filters)?);
                }
            }
        }

        if queries.is_empty() {
            return Ok(QueryNode::MatchAll);
        }
        Ok(QueryNode::group(op, queries))
    }

    /// Context-level location constraints are appended to the outer
    /// composite directly, independent of the intent fields.
    fn push_context_location(&self, location: &Location, queries: &mut Vec<QueryNode>) {
        let location_value = match serde_json::to_value(location) {
            Ok(v) => v,
            Err(e) => {
                warn!("Could not serialize context location: {}", e);
                return;
            }
        };
        for (field, value) in flatten_fields("context_location", &location_value) {
            if is_gps_field(&field) {
                if let Some(gps) = value.first() {
                    if let Some(node) = self.geo_distance_query(&field, gps) {
                        queries.push(node);
                    }
                }
            } else if let Some(scalar) = value.first() {
                queries.push(self.field_leaf(&field, scalar));
            }
        }
    }

    /// Turns the flattened intent into grouped predicates: GPS and
    /// fulfillment-type fields go straight to the outer composite, the rest
    /// split into a descriptor-boosted group and an ordinary group.
    fn push_intent_fields(&self, flattened: &FieldMap, op: BoolOp, queries: &mut Vec<QueryNode>) {
        let mut descriptor_queries = Vec::new();
        let mut ordinary_queries = Vec::new();

        for (field, value) in flattened {
            if is_gps_field(field) {
                if let Some(gps) = value.first() {
                    if gps.contains(',') {
                        if let Some(node) = self.geo_distance_query(field, gps) {
                            queries.push(node);
                        }
                    }
                }
                continue;
            }

            if field == "providers_fulfillments_type" {
                if let Some(kind) = value.first() {
                    queries.push(QueryNode::leaf(field.clone(), Predicate::Text(kind.to_string())));
                }
                continue;
            }

            let node = match value {
                FlatValue::Many(values) if !values.is_empty() => {
                    // Any one of the accumulated values may match the field.
                    QueryNode::or(
                        values
                            .iter()
                            .map(|v| self.field_leaf(field, v))
                            .collect(),
                    )
                }
                FlatValue::Many(_) => continue,
                FlatValue::One(v) => self.field_leaf(field, v),
            };

            if field.contains("descriptor") {
                descriptor_queries.push(node);
            } else {
                ordinary_queries.push(node);
            }
        }

        if !descriptor_queries.is_empty() {
            queries.push(QueryNode::group(op, descriptor_queries).with_boost(DESCRIPTOR_BOOST));
        }
        if !ordinary_queries.is_empty() {
            queries.push(QueryNode::group(op, ordinary_queries));
        }
    }

    fn field_leaf(&self, field: &str, value: &str) -> QueryNode {
        let predicate = if self.config.intent_text_match {
            Predicate::Text(value.to_string())
        } else {
            Predicate::Eq(value.to_string())
        };
        let boost = if field.contains("descriptor") {
            DESCRIPTOR_BOOST
        } else {
            crate::query::node::DEFAULT_BOOST
        };
        QueryNode::boosted_leaf(field, predicate, boost)
    }

    /// Parses "lat,lon" and builds a geo-distance predicate. Malformed
    /// coordinates are skipped, never fatal.
    fn geo_distance_query(&self, field: &str, gps: &str) -> Option<QueryNode> {
        let coordinates: Vec<&str> = gps.split(',').collect();
        if coordinates.len() != 2 {
            warn!(field, gps, "GPS value is not a lat,lon pair, skipping");
            return None;
        }
        let lat = coordinates[0].trim().parse::<f64>();
        let lon = coordinates[1].trim().parse::<f64>();
        match (lat, lon) {
            (Ok(lat), Ok(lon)) => Some(QueryNode::leaf(
                field,
                Predicate::GeoDistance {
                    lat,
                    lon,
                    distance: self.config.geo_distance.clone(),
                },
            )),
            _ => {
                warn!(field, gps, "Invalid GPS coordinates, skipping");
                None
            }
        }
    }

    fn fulltext_query(&self, text: &str) -> QueryNode {
        QueryNode::leaf(
            "",
            Predicate::FullText {
                query: text.to_string(),
                columns: self.config.fulltext_columns.clone(),
            },
        )
    }
}

fn geo_spatial_query(geo: &GeoSpatial) -> QueryNode {
    QueryNode::leaf(
        "location",
        Predicate::GeoDistance {
            lat: geo.location.lat,
            lon: geo.location.lon,
            distance: format!("{}{}", geo.distance, geo.unit),
        },
    )
}
