// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Talking to the FAIRsharing registry:
//! resolving identifier IRIs to internal IDs through its GraphQL API,
//! and submitting records through its authenticated REST API.

use reqwest::StatusCode;
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

use crate::model::submission_record::{DOMAIN_IDS_KEY, SUBJECT_IDS_KEY};

pub mod client;
pub mod resolver;

pub use client::{RegistryClient, RegistryResponse};
pub use resolver::{resolve_all, IdResolver, RegistryIdResolver, Resolution};

/// Thrown when exchanging the credentials for a session token failed.
#[derive(Error, Debug)]
pub enum AuthenticationError {
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Login was refused ({0}): {1}")]
    Status(StatusCode, String),
    #[error("Failed to deserialize the login response: {0}")]
    Decode(#[source] serde_json::Error, String),
    #[error("Missing jwt token")]
    MissingToken,
}

/// Thrown when the registry did not accept a submitted record.
#[derive(Error, Debug)]
pub enum RegistrySubmissionError {
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Submission was refused ({0}): {1}")]
    Status(StatusCode, String),
}

/// The kind of term an identifier IRI refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum IdKind {
    Subject,
    Domain,
}

impl IdKind {
    /// Name of the GraphQL search operation for this kind.
    #[must_use]
    pub const fn query_field(self) -> &'static str {
        match self {
            Self::Subject => "searchSubjects",
            Self::Domain => "searchDomains",
        }
    }

    /// Key of the sequence of identifiers of this kind
    /// within a `fairsharing_record`.
    #[must_use]
    pub const fn record_key(self) -> &'static str {
        match self {
            Self::Subject => SUBJECT_IDS_KEY,
            Self::Domain => DOMAIN_IDS_KEY,
        }
    }
}
