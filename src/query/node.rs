//! The compiled query tree and its engine-facing JSON rendering.

use crate::domain::LogicalOperator;
use serde_json::{json, Map, Value};

pub const DEFAULT_BOOST: f32 = 1.0;
/// Relevance default for fields whose path mentions a descriptor. Callers
/// may override per leaf.
pub const DESCRIPTOR_BOOST: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl From<LogicalOperator> for BoolOp {
    fn from(op: LogicalOperator) -> Self {
        match op {
            LogicalOperator::And => BoolOp::And,
            LogicalOperator::Or => BoolOp::Or,
        }
    }
}

/// A terminal field predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact term equality.
    Eq(String),
    /// Membership in a value list.
    In(Vec<String>),
    /// Open or half-open numeric range.
    Range { gt: Option<f64>, lt: Option<f64> },
    /// Analyzed text match against one field.
    Text(String),
    /// Analyzed text match across the configured full-text columns.
    FullText { query: String, columns: Vec<String> },
    /// Distance constraint around a point, e.g. distance "1km".
    GeoDistance { lat: f64, lon: f64, distance: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// Sentinel for "no constraints": matches every document.
    MatchAll,
    Leaf {
        field: String,
        predicate: Predicate,
        boost: f32,
    },
    Composite {
        op: BoolOp,
        children: Vec<QueryNode>,
        boost: f32,
        /// For OR composites this is always 1: at least one child matches.
        minimum_match: Option<u32>,
    },
}

impl QueryNode {
    pub fn leaf(field: impl Into<String>, predicate: Predicate) -> Self {
        QueryNode::Leaf {
            field: field.into(),
            predicate,
            boost: DEFAULT_BOOST,
        }
    }

    pub fn boosted_leaf(field: impl Into<String>, predicate: Predicate, boost: f32) -> Self {
        QueryNode::Leaf {
            field: field.into(),
            predicate,
            boost,
        }
    }

    pub fn and(children: Vec<QueryNode>) -> Self {
        QueryNode::Composite {
            op: BoolOp::And,
            children,
            boost: DEFAULT_BOOST,
            minimum_match: None,
        }
    }

    pub fn or(children: Vec<QueryNode>) -> Self {
        QueryNode::Composite {
            op: BoolOp::Or,
            children,
            boost: DEFAULT_BOOST,
            minimum_match: Some(1),
        }
    }

    /// A composite using the caller's chosen operator.
    pub fn group(op: BoolOp, children: Vec<QueryNode>) -> Self {
        match op {
            BoolOp::And => QueryNode::and(children),
            BoolOp::Or => QueryNode::or(children),
        }
    }

    pub fn with_boost(self, boost: f32) -> Self {
        match self {
            QueryNode::Leaf { field, predicate, .. } => QueryNode::Leaf {
                field,
                predicate,
                boost,
            },
            QueryNode::Composite {
                op,
                children,
                minimum_match,
                ..
            } => QueryNode::Composite {
                op,
                children,
                boost,
                minimum_match,
            },
            QueryNode::MatchAll => QueryNode::MatchAll,
        }
    }

    /// Renders the tree as engine query DSL.
    pub fn to_value(&self) -> Value {
        match self {
            QueryNode::MatchAll => json!({"match_all": {}}),
            QueryNode::Leaf {
                field,
                predicate,
                boost,
            } => render_leaf(field, predicate, *boost),
            QueryNode::Composite {
                op,
                children,
                boost,
                minimum_match,
            } => {
                let rendered: Vec<Value> = children.iter().map(QueryNode::to_value).collect();
                let mut bool_body = Map::new();
                match op {
                    BoolOp::And => {
                        bool_body.insert("must".to_string(), Value::Array(rendered));
                    }
                    BoolOp::Or => {
                        bool_body.insert("should".to_string(), Value::Array(rendered));
                        if let Some(min) = minimum_match {
                            bool_body.insert("minimum_should_match".to_string(), json!(min));
                        }
                    }
                }
                if has_boost(*boost) {
                    bool_body.insert("boost".to_string(), json!(*boost));
                }
                json!({"bool": bool_body})
            }
        }
    }
}

fn has_boost(boost: f32) -> bool {
    (boost - DEFAULT_BOOST).abs() > f32::EPSILON
}

fn render_leaf(field: &str, predicate: &Predicate, boost: f32) -> Value {
    match predicate {
        Predicate::Eq(value) => {
            let mut body = Map::new();
            body.insert("value".to_string(), json!(value));
            if has_boost(boost) {
                body.insert("boost".to_string(), json!(boost));
            }
            json!({"term": {field: body}})
        }
        Predicate::In(values) => {
            let mut body = Map::new();
            body.insert(field.to_string(), json!(values));
            if has_boost(boost) {
                body.insert("boost".to_string(), json!(boost));
            }
            json!({"terms": body})
        }
        Predicate::Range { gt, lt } => {
            let mut bounds = Map::new();
            if let Some(gt) = gt {
                bounds.insert("gt".to_string(), json!(gt));
            }
            if let Some(lt) = lt {
                bounds.insert("lt".to_string(), json!(lt));
            }
            json!({"range": {field: bounds}})
        }
        Predicate::Text(value) => {
            let mut body = Map::new();
            body.insert("query".to_string(), json!(value));
            if has_boost(boost) {
                body.insert("boost".to_string(), json!(boost));
            }
            json!({"match": {field: body}})
        }
        Predicate::FullText { query, columns } => json!({
            "multi_match": {
                "query": query,
                "fields": columns,
                "type": "best_fields"
            }
        }),
        Predicate::GeoDistance { lat, lon, distance } => json!({
            "geo_distance": {
                "distance": distance,
                field: format!("{},{}", lat, lon)
            }
        }),
    }
}
