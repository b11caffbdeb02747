//! A minimal JSON-Schema-7 structural validator (spec.md §4.9).
//!
//! This does not validate schema semantics against a data instance; it
//! flags structural risk factors that make a schema unreliable as a
//! contract for a model to honor: `properties` without a `type`, `items`
//! without a `type`, and unrecognized `type` names.

use serde_json::Value;

/// JSON-Schema-7's primitive type names.
const VALID_TYPE_NAMES: &[&str] = &[
    "object", "array", "string", "number", "integer", "boolean", "null",
];

/// A single structural problem found in a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidationError {
    /// Which structural rule was violated.
    pub keyword: SchemaIssueKeyword,
    /// JSON-pointer-style path to the offending node (e.g. `/properties/name`).
    pub path: String,
    /// Human-readable detail.
    pub message: String,
}

/// The kind of structural problem a [`SchemaValidationError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaIssueKeyword {
    /// An object schema declares `properties` but no `type: "object"`.
    PropertiesWithoutType,
    /// An array schema declares `items` but no `type: "array"`.
    ItemsWithoutType,
    /// A `type` value isn't one of the seven JSON-Schema-7 primitives.
    InvalidTypeName,
}

impl SchemaIssueKeyword {
    /// Stable label used for grouping (spec.md §4.9: "grouped by keyword").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PropertiesWithoutType => "properties-without-type",
            Self::ItemsWithoutType => "items-without-type",
            Self::InvalidTypeName => "invalid-type-name",
        }
    }
}

/// Walks `schema` depth-first and collects every structural violation, in
/// document order.
#[must_use]
pub fn validate(schema: &Value) -> Vec<SchemaValidationError> {
    let mut errors = Vec::new();
    walk(schema, "", &mut errors);
    errors
}

fn walk(node: &Value, path: &str, errors: &mut Vec<SchemaValidationError>) {
    let Value::Object(map) = node else {
        return;
    };

    if let Some(type_value) = map.get("type") {
        check_type(type_value, path, errors);
    }

    if let Some(Value::Object(properties)) = map.get("properties") {
        if map.get("type").is_none() {
            errors.push(SchemaValidationError {
                keyword: SchemaIssueKeyword::PropertiesWithoutType,
                path: path.to_string(),
                message: format!(
                    "schema at `{}` declares `properties` without `type: \"object\"`",
                    display_path(path)
                ),
            });
        }
        for (name, child) in properties {
            walk(child, &format!("{path}/properties/{name}"), errors);
        }
    }

    if let Some(items) = map.get("items") {
        if map.get("type").is_none() {
            errors.push(SchemaValidationError {
                keyword: SchemaIssueKeyword::ItemsWithoutType,
                path: path.to_string(),
                message: format!(
                    "schema at `{}` declares `items` without `type: \"array\"`",
                    display_path(path)
                ),
            });
        }
        match items {
            Value::Object(_) => walk(items, &format!("{path}/items"), errors),
            Value::Array(variants) => {
                for (index, variant) in variants.iter().enumerate() {
                    walk(variant, &format!("{path}/items/{index}"), errors);
                }
            }
            _ => {}
        }
    }

    if let Some(additional) = map.get("additionalProperties") {
        if additional.is_object() {
            walk(additional, &format!("{path}/additionalProperties"), errors);
        }
    }

    for keyword in ["definitions", "$defs"] {
        if let Some(Value::Object(defs)) = map.get(keyword) {
            for (name, child) in defs {
                walk(child, &format!("{path}/{keyword}/{name}"), errors);
            }
        }
    }
}

fn check_type(type_value: &Value, path: &str, errors: &mut Vec<SchemaValidationError>) {
    match type_value {
        Value::String(name) => {
            if !VALID_TYPE_NAMES.contains(&name.as_str()) {
                errors.push(SchemaValidationError {
                    keyword: SchemaIssueKeyword::InvalidTypeName,
                    path: path.to_string(),
                    message: format!("unrecognized type name `{name}` at `{}`", display_path(path)),
                });
            }
        }
        Value::Array(names) => {
            for name in names {
                if let Value::String(name) = name {
                    if !VALID_TYPE_NAMES.contains(&name.as_str()) {
                        errors.push(SchemaValidationError {
                            keyword: SchemaIssueKeyword::InvalidTypeName,
                            path: path.to_string(),
                            message: format!(
                                "unrecognized type name `{name}` at `{}`",
                                display_path(path)
                            ),
                        });
                    }
                }
            }
        }
        _ => {}
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}
