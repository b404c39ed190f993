//! Flattens a nested intent value into a flat field map.
//!
//! Paths join traversed keys with `_`. A node keyed `provider` or
//! `providers` resets the path prefix to `providers` wherever it appears, so
//! the singular and plural spellings land in the same field family. Array
//! position is never part of a path: objects inside an array flatten under
//! the array's own prefix and their same-named fields accumulate into lists.

use serde_json::Value;
use std::collections::BTreeMap;

/// A flattened field value: one scalar, or the accumulated list an array
/// produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    One(String),
    Many(Vec<String>),
}

impl FlatValue {
    /// The first scalar, whichever shape this value has.
    pub fn first(&self) -> Option<&str> {
        match self {
            FlatValue::One(v) => Some(v),
            FlatValue::Many(vs) => vs.first().map(String::as_str),
        }
    }
}

pub type FieldMap = BTreeMap<String, FlatValue>;

/// True for paths that hold a "lat,lon" coordinate pair.
pub fn is_gps_field(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == "gps" || lower.ends_with("_gps")
}

/// Flattening never fails; unexpected shapes degrade to their JSON text.
pub fn flatten_fields(prefix: &str, node: &Value) -> FieldMap {
    let mut out = FieldMap::new();
    flatten_into(prefix, node, &mut out);
    out
}

fn flatten_into(prefix: &str, node: &Value, out: &mut FieldMap) {
    match node {
        Value::Object(fields) => {
            for (key, child) in fields {
                let child_prefix = if key == "provider" || key == "providers" {
                    "providers".to_string()
                } else if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}_{}", prefix, key)
                };
                flatten_into(&child_prefix, child, out);
            }
        }
        Value::Array(elements) => {
            let mut scalars = Vec::new();
            let mut collected: BTreeMap<String, Vec<String>> = BTreeMap::new();

            for element in elements {
                if element.is_object() {
                    let mut element_fields = FieldMap::new();
                    flatten_into(prefix, element, &mut element_fields);
                    for (key, value) in element_fields {
                        let slot = collected.entry(key).or_default();
                        match value {
                            FlatValue::One(v) => slot.push(v),
                            FlatValue::Many(vs) => slot.extend(vs),
                        }
                    }
                } else if !element.is_null() {
                    scalars.push(scalar_text(element));
                }
            }

            if !scalars.is_empty() {
                out.insert(prefix.to_string(), FlatValue::Many(scalars));
            }

            for (key, values) in collected {
                if is_gps_field(&key) {
                    // Multiple GPS candidates collapse to the first one.
                    if let Some(first) = values.into_iter().next() {
                        out.insert(key, FlatValue::One(first));
                    }
                } else if !values.is_empty() {
                    out.insert(key, FlatValue::Many(values));
                }
            }
        }
        Value::Null => {}
        scalar => {
            out.insert(prefix.to_string(), FlatValue::One(scalar_text(scalar)));
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
