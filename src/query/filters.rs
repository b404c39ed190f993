//! Compiles explicit filter groups into the query tree.
//!
//! A filter's own `type` governs how its clauses combine; multiple
//! top-level filters are always conjunctive with each other. An unknown
//! leaf operator is program-level misuse and fails the whole compile;
//! a value shape an operator cannot use is rejected the same way.

use crate::domain::filters::{FieldClause, Filter, FilterType, FilterValue};
use crate::error::{Result, SearchError};
use crate::query::node::{Predicate, QueryNode};

pub fn compile_filters(filters: &[Filter]) -> Result<QueryNode> {
    if filters.len() == 1 {
        return compile_filter(&filters[0]);
    }
    let compiled = filters
        .iter()
        .map(compile_filter)
        .collect::<Result<Vec<_>>>()?;
    Ok(QueryNode::and(compiled))
}

fn compile_filter(filter: &Filter) -> Result<QueryNode> {
    compile_group(filter.combine.unwrap_or(FilterType::And), &filter.fields)
}

fn compile_group(combine: FilterType, fields: &[FieldClause]) -> Result<QueryNode> {
    let children = fields
        .iter()
        .map(compile_clause)
        .collect::<Result<Vec<_>>>()?;
    Ok(match combine {
        FilterType::And => QueryNode::and(children),
        FilterType::Or => QueryNode::or(children),
    })
}

fn compile_clause(clause: &FieldClause) -> Result<QueryNode> {
    match clause {
        FieldClause::Group { combine, fields } => compile_group(*combine, fields),
        FieldClause::Leaf { name, op, value } => compile_leaf(name, op, value),
    }
}

fn compile_leaf(name: &str, op: &str, value: &FilterValue) -> Result<QueryNode> {
    let predicate = match op {
        "eq" => match value {
            FilterValue::String(s) => Predicate::Eq(s.clone()),
            FilterValue::Number(n) => Predicate::Eq(number_text(*n)),
            FilterValue::NumberRange { min, max } => Predicate::Range {
                gt: Some(*min),
                lt: Some(*max),
            },
            FilterValue::StringList(_) => {
                return Err(invalid_value(name, op, "a scalar"));
            }
        },
        "in" => match value {
            FilterValue::StringList(values) => Predicate::In(values.clone()),
            _ => return Err(invalid_value(name, op, "a value list")),
        },
        "lt" => match value {
            FilterValue::Number(n) => Predicate::Range {
                gt: None,
                lt: Some(*n),
            },
            _ => return Err(invalid_value(name, op, "a number")),
        },
        "gt" => match value {
            FilterValue::Number(n) => Predicate::Range {
                gt: Some(*n),
                lt: None,
            },
            _ => return Err(invalid_value(name, op, "a number")),
        },
        other => return Err(SearchError::UnsupportedOperator(other.to_string())),
    };
    Ok(QueryNode::leaf(name, predicate))
}

fn invalid_value(name: &str, op: &str, expected: &str) -> SearchError {
    SearchError::InvalidInput(format!(
        "Filter field '{}' with op '{}' requires {}",
        name, op, expected
    ))
}

fn number_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::node::BoolOp;
    use serde_json::json;

    fn parse_filters(value: serde_json::Value) -> Vec<Filter> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_and_filter_with_nested_or_group() {
        let filters = parse_filters(json!([{
            "type": "and",
            "fields": [
                {"name": "city", "op": "eq", "value": "X"},
                {"type": "or", "fields": [
                    {"name": "a", "op": "eq", "value": "1"},
                    {"name": "b", "op": "eq", "value": "2"}
                ]}
            ]
        }]));

        let query = compile_filters(&filters).unwrap();
        let children = match query {
            QueryNode::Composite {
                op: BoolOp::And,
                children,
                ..
            } => children,
            other => panic!("expected an AND composite, got {:?}", other),
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(
            children[0],
            QueryNode::Leaf {
                predicate: Predicate::Eq(_),
                ..
            }
        ));
        match &children[1] {
            QueryNode::Composite {
                op: BoolOp::Or,
                children,
                minimum_match,
                ..
            } => {
                assert_eq!(children.len(), 2);
                assert_eq!(*minimum_match, Some(1));
            }
            other => panic!("expected an OR composite, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_filters_combine_under_and() {
        let filters = parse_filters(json!([
            {"type": "or", "fields": [{"name": "a", "op": "eq", "value": "1"}]},
            {"type": "or", "fields": [{"name": "b", "op": "eq", "value": "2"}]}
        ]));

        let query = compile_filters(&filters).unwrap();
        match query {
            QueryNode::Composite {
                op: BoolOp::And,
                children,
                ..
            } => assert_eq!(children.len(), 2),
            other => panic!("expected conjunction of filters, got {:?}", other),
        }
    }

    #[test]
    fn test_in_compiles_to_membership() {
        let filters = parse_filters(json!([{
            "type": "and",
            "fields": [{"name": "tags", "op": "in", "value": ["a", "b"]}]
        }]));
        let query = compile_filters(&filters).unwrap();
        let rendered = query.to_value();
        assert_eq!(rendered["bool"]["must"][0]["terms"]["tags"], json!(["a", "b"]));
    }

    #[test]
    fn test_range_operators() {
        let filters = parse_filters(json!([{
            "type": "and",
            "fields": [
                {"name": "price", "op": "lt", "value": 100},
                {"name": "rating", "op": "gt", "value": 4}
            ]
        }]));
        let rendered = compile_filters(&filters).unwrap().to_value();
        assert_eq!(rendered["bool"]["must"][0]["range"]["price"]["lt"], json!(100.0));
        assert_eq!(rendered["bool"]["must"][1]["range"]["rating"]["gt"], json!(4.0));
    }

    #[test]
    fn test_number_range_bounds_both_ends() {
        let filters = parse_filters(json!([{
            "type": "and",
            "fields": [{"name": "price", "op": "eq", "value": {"min": 90, "max": 110}}]
        }]));
        let rendered = compile_filters(&filters).unwrap().to_value();
        let range = &rendered["bool"]["must"][0]["range"]["price"];
        assert_eq!(range["gt"], json!(90.0));
        assert_eq!(range["lt"], json!(110.0));
    }

    #[test]
    fn test_unknown_operator_is_fatal() {
        let filters = parse_filters(json!([{
            "type": "and",
            "fields": [{"name": "city", "op": "like", "value": "X"}]
        }]));
        let err = compile_filters(&filters).unwrap_err();
        assert!(matches!(err, SearchError::UnsupportedOperator(_)));
    }

    #[test]
    fn test_operator_value_mismatch_is_invalid_input() {
        let filters = parse_filters(json!([{
            "type": "and",
            "fields": [{"name": "price", "op": "lt", "value": "cheap"}]
        }]));
        let err = compile_filters(&filters).unwrap_err();
        assert!(matches!(err, SearchError::InvalidInput(_)));
    }

    #[test]
    fn test_numeric_eq_keeps_integer_text() {
        let query = compile_leaf("count", "eq", &FilterValue::Number(7.0)).unwrap();
        let rendered = query.to_value();
        assert_eq!(rendered["term"]["count"]["value"], json!("7"));
    }
}
