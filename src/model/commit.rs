// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::Serialize;
use strum::{AsRefStr, Display};

/// Whether a commit created a new file or replaced an existing one.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CommitAction {
    Create,
    Update,
}

impl CommitAction {
    /// The action derived from the content hash of the file
    /// as it was found before writing.
    #[must_use]
    pub const fn from_prior_sha(sha: Option<&String>) -> Self {
        if sha.is_some() {
            Self::Update
        } else {
            Self::Create
        }
    }

    #[must_use]
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
        }
    }
}

/// The outcome of a successful write to the content store.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub action: CommitAction,
    pub record_id: String,
    pub category: String,
    /// Web URL of the commit that produced the file
    pub commit_url: Option<String>,
    /// Web URL of the created/updated file
    pub file_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names() {
        assert_eq!(CommitAction::Create.to_string(), "create");
        assert_eq!(CommitAction::Update.as_ref(), "update");
        assert_eq!(
            serde_json::to_value(CommitAction::Update).unwrap(),
            serde_json::json!("update")
        );
        assert_eq!(CommitAction::from_prior_sha(None), CommitAction::Create);
        assert_eq!(
            CommitAction::from_prior_sha(Some(&"abc".to_owned())),
            CommitAction::Update
        );
    }
}
