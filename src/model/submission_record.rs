// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde_json::{Map, Value};

use crate::error::ValidationError;

pub const RECORD_KEY: &str = "fairsharing_record";
pub const SUBJECT_IDS_KEY: &str = "subject_ids";
pub const DOMAIN_IDS_KEY: &str = "domain_ids";

/// A registry entry as received from the client.
///
/// Apart from it being a JSON object,
/// and `fairsharing_record` (if present) being one too,
/// its structure is left to the registry to judge.
/// Key order is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord(Map<String, Value>);

impl TryFrom<Value> for SubmissionRecord {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(ValidationError::NotAnObject);
        };
        match map.get(RECORD_KEY) {
            None | Some(Value::Object(_) | Value::Null) => Ok(Self(map)),
            Some(_) => Err(ValidationError::RecordNotAnObject),
        }
    }
}

impl SubmissionRecord {
    fn record_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.0.get_mut(RECORD_KEY).and_then(Value::as_object_mut)
    }

    /// Removes the sequence stored under `key` within `fairsharing_record`
    /// and returns it, if it is a sequence.
    /// Anything else stored under that key is left untouched.
    pub fn take_ids(&mut self, key: &str) -> Option<Vec<Value>> {
        match self.record_mut()?.get_mut(key)? {
            Value::Array(ids) => Some(std::mem::take(ids)),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Object(_) => {
                None
            }
        }
    }

    /// Stores `ids` under `key` within `fairsharing_record`,
    /// creating the latter if it is missing or `null`.
    pub fn set_ids(&mut self, key: &str, ids: Vec<Value>) {
        if let Some(record) = self.record_mut() {
            record.insert(key.to_owned(), Value::Array(ids));
        } else {
            let mut record = Map::new();
            record.insert(key.to_owned(), Value::Array(ids));
            self.0.insert(RECORD_KEY.to_owned(), Value::Object(record));
        }
    }

    #[must_use]
    pub fn ids(&self, key: &str) -> Option<&Vec<Value>> {
        self.0
            .get(RECORD_KEY)
            .and_then(|record| record.get(key))
            .and_then(Value::as_array)
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
