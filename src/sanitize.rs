// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! FAIRsharing rejects (or mishandles) empty fields,
//! so they get stripped from a record before it is submitted.

use serde_json::{Map, Value};

/// Whether `value` is one of the "empty" forms:
/// `null`, `""`, `[]` or `{}`.
#[must_use]
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(string) => string.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Whether `value` is a container that ended up empty once sanitized.
fn is_emptied(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => false,
    }
}

/// Recursively removes empty values from mappings and sequences.
///
/// - mapping: entries whose value is empty are removed,
///   and so are those whose value becomes `{}` or `[]` once sanitized
/// - sequence: same as for mappings, applied to the elements
/// - scalars are returned unchanged
///
/// Containers that end up empty are removed by their parent
/// within the same pass, so `sanitize(sanitize(x)) == sanitize(x)`.
#[must_use]
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sanitize_map(map)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|item| !is_empty(item))
                .map(sanitize)
                .filter(|item| !is_emptied(item))
                .collect(),
        ),
        scalar @ (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)) => scalar,
    }
}

fn sanitize_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter(|(_key, value)| !is_empty(value))
        .map(|(key, value)| (key, sanitize(value)))
        .filter(|(_key, value)| !is_emptied(value))
        .collect()
}
