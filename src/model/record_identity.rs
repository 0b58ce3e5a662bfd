// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt::{self, Display};

use serde::Serialize;

use crate::tools;

pub const RDF_FILE_EXT: &str = "ttl";

/// The identity of an RDF record,
/// derived from the path of its canonical subject URI:
/// `https://host/.../{category}/{record_id}[.ttl]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordIdentity {
    pub record_id: String,
    pub category: String,
    pub subject_uri: String,
}

impl RecordIdentity {
    #[must_use]
    pub fn new<R, C, S>(record_id: R, category: C, subject_uri: S) -> Self
    where
        R: Into<String>,
        C: Into<String>,
        S: Into<String>,
    {
        Self {
            record_id: record_id.into(),
            category: category.into(),
            subject_uri: subject_uri.into(),
        }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{RDF_FILE_EXT}", self.record_id)
    }

    /// Repository-root relative path of the file storing this record,
    /// e.g. `survey/item123.ttl`.
    #[must_use]
    pub fn storage_path(&self) -> String {
        format!("{}/{}", self.category, self.file_name())
    }

    /// Same as [`Self::storage_path`], but percent-encoded
    /// for use within a URL.
    #[must_use]
    pub fn storage_path_encoded(&self) -> String {
        tools::encode_path([self.category.as_str(), self.file_name().as_str()])
    }
}

impl Display for RecordIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.storage_path(), self.subject_uri)
    }
}
