//! Caller-supplied filter groups.
//!
//! A filter is a flat list of clauses combined under its own `type`; each
//! clause is either a leaf predicate or a nested group, recursively. Groups
//! and leaves are separate variants so the compiler never has to branch on
//! which fields happen to be populated.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// How this filter's own clauses combine. Defaults to AND when absent.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub combine: Option<FilterType>,
    pub fields: Vec<FieldClause>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldClause {
    Group {
        #[serde(rename = "type")]
        combine: FilterType,
        fields: Vec<FieldClause>,
    },
    Leaf {
        name: String,
        /// Operator token; validated at compile time, not at parse time, so
        /// an unknown operator surfaces as an invalid-input error rather
        /// than a deserialization failure.
        op: String,
        value: FilterValue,
    },
}

/// The closed set of value shapes a filter leaf can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    String(String),
    StringList(Vec<String>),
    Number(f64),
    NumberRange { min: f64, max: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leaf_clause_deserializes() {
        let clause: FieldClause =
            serde_json::from_value(json!({"name": "city", "op": "eq", "value": "Austin"}))
                .unwrap();
        match clause {
            FieldClause::Leaf { name, op, value } => {
                assert_eq!(name, "city");
                assert_eq!(op, "eq");
                assert_eq!(value, FilterValue::String("Austin".to_string()));
            }
            FieldClause::Group { .. } => panic!("expected a leaf"),
        }
    }

    #[test]
    fn test_nested_group_deserializes() {
        let filter: Filter = serde_json::from_value(json!({
            "type": "and",
            "fields": [
                {"name": "city", "op": "eq", "value": "Austin"},
                {"type": "or", "fields": [
                    {"name": "rating", "op": "gt", "value": 4},
                    {"name": "tags", "op": "in", "value": ["organic", "fair-trade"]}
                ]}
            ]
        }))
        .unwrap();

        assert_eq!(filter.combine, Some(FilterType::And));
        assert_eq!(filter.fields.len(), 2);
        assert!(matches!(filter.fields[1], FieldClause::Group { .. }));
    }

    #[test]
    fn test_value_shapes() {
        let number: FilterValue = serde_json::from_value(json!(3.5)).unwrap();
        assert_eq!(number, FilterValue::Number(3.5));

        let range: FilterValue = serde_json::from_value(json!({"min": 10, "max": 20})).unwrap();
        assert_eq!(range, FilterValue::NumberRange { min: 10.0, max: 20.0 });
    }
}
