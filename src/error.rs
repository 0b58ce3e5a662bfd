// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use reqwest::StatusCode;
use thiserror::Error;

use crate::{
    content_store::StoreError,
    registry::{AuthenticationError, RegistrySubmissionError},
};

/// Maximum number of entries of an error source chain
/// reported back to the caller.
pub const TRACE_DEPTH: usize = 5;

/// The client sent something we can not work with.
/// These are always detected before any network call is made.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Empty RDF body received.")]
    EmptyBody,
    #[error("Request body is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::string::FromUtf8Error),
    #[error("Invalid RDF format: {0}")]
    InvalidRdfSyntax(String),
    #[error("No valid identifier or subject URI found in RDF.")]
    MissingIdentifier,
    #[error("URI '{0}' is malformed or missing path structure.")]
    MalformedUriPath(String),
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),
    #[error("The submission body has to be a JSON object")]
    NotAnObject,
    #[error("The property 'fairsharing_record' has to be a JSON object")]
    RecordNotAnObject,
}

/// A value required by a component was not configured.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required configuration value is missing: '{0}'")]
    Missing(&'static str),
    #[error("Configuration value is not usable: '{0}'")]
    Invalid(&'static str),
}

/// Everything that can make one of the two submission flows fail.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("GitHub request failed: {0}")]
    Store(#[from] StoreError),
    #[error("FAIRsharing authentication failed: {0}")]
    Authentication(#[from] AuthenticationError),
    #[error("FAIRsharing submission failed: {0}")]
    Submission(#[from] RegistrySubmissionError),
}

impl Error {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Store(_) | Self::Authentication(_) | Self::Submission(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The tail of the chain of underlying causes,
    /// meant for operators diagnosing upstream failures.
    #[must_use]
    pub fn trace(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            chain.push(err.to_string());
            cause = err.source();
        }
        let skip = chain.len().saturating_sub(TRACE_DEPTH);
        chain.into_iter().skip(skip).collect()
    }
}
