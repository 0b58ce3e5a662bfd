// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The two independent submission pipelines:
//!
//! - [`PushFlow`]: RDF (Turtle) record -> GitHub repository
//! - [`SubmitFlow`]: JSON record -> FAIRsharing
//!
//! They share no state, and neither knows about the other;
//! a record pushed to one is in no way reconciled with the other.

use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::{
    content_store::ContentStore,
    error::{Error, ValidationError},
    model::{commit::CommitResult, submission_record::SubmissionRecord},
    rdf_identity,
    registry::{resolve_all, IdKind, IdResolver, RegistryClient, RegistryIdResolver, Resolution},
    sanitize::sanitize,
    settings::Settings,
};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    #[serde(flatten)]
    pub commit: CommitResult,
    pub message: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub data_status_code: u16,
    pub response: Value,
    /// Identifiers that were removed from the record
    /// because they could not be resolved to internal IDs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<Value>,
}

/// RDF record -> identity -> file in the content store
#[derive(Debug, Clone)]
pub struct PushFlow {
    store: ContentStore,
}

impl PushFlow {
    #[must_use]
    pub const fn new(store: ContentStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings, client: Client) -> Self {
        Self::new(ContentStore::new(settings.content_store.clone(), client))
    }

    /// Stores an RDF (Turtle) record,
    /// creating or updating its file.
    ///
    /// # Errors
    ///
    /// - [`ValidationError`] if the body is empty, not UTF-8,
    ///   or not an RDF record with a usable identifier
    /// - any error of [`ContentStore::commit`]
    #[instrument(skip_all)]
    pub async fn push(&self, body: &[u8]) -> Result<PushOutcome, Error> {
        let rdf_text = String::from_utf8(body.to_vec()).map_err(ValidationError::from)?;
        if rdf_text.trim().is_empty() {
            return Err(ValidationError::EmptyBody.into());
        }
        let identity = rdf_identity::extract_identity(&rdf_text)?;
        tracing::info!("Received RDF record {identity}");

        let commit = self.store.commit(&identity, &rdf_text).await?;
        let message = format!(
            "RDF record '{}' successfully {} in GitHub repository '{}'.",
            commit.record_id,
            commit.action.past_tense(),
            self.store.settings().repository,
        );
        Ok(PushOutcome { commit, message })
    }
}

/// JSON record -> resolved IDs -> sanitized -> FAIRsharing
#[derive(Clone)]
pub struct SubmitFlow {
    resolver: Arc<dyn IdResolver>,
    registry: RegistryClient,
    concurrency: usize,
}

impl std::fmt::Debug for SubmitFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitFlow")
            .field("registry", &self.registry)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl SubmitFlow {
    #[must_use]
    pub fn new(resolver: Arc<dyn IdResolver>, registry: RegistryClient) -> Self {
        let concurrency = registry.settings().resolve_concurrency();
        Self {
            resolver,
            registry,
            concurrency,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings, client: Client) -> Self {
        let resolver = RegistryIdResolver::new(settings.registry.clone(), client.clone());
        let registry = RegistryClient::new(settings.registry.clone(), client);
        Self::new(Arc::new(resolver), registry)
    }

    async fn resolve_kind(&self, ids: Option<Vec<Value>>, kind: IdKind) -> Option<Resolution> {
        match ids {
            Some(ids) => Some(resolve_all(&*self.resolver, ids, kind, self.concurrency).await),
            None => None,
        }
    }

    /// Replaces the identifier IRIs in `subject_ids` and `domain_ids`
    /// with internal IDs, dropping those that do not resolve.
    /// Returns the dropped identifiers.
    async fn resolve_ids(&self, record: &mut SubmissionRecord) -> Vec<Value> {
        let subjects = record.take_ids(IdKind::Subject.record_key());
        let domains = record.take_ids(IdKind::Domain.record_key());
        let (subjects, domains) = futures::join!(
            self.resolve_kind(subjects, IdKind::Subject),
            self.resolve_kind(domains, IdKind::Domain),
        );

        let mut unresolved = Vec::new();
        for (kind, resolution) in [(IdKind::Subject, subjects), (IdKind::Domain, domains)] {
            if let Some(resolution) = resolution {
                record.set_ids(kind.record_key(), resolution.resolved);
                unresolved.extend(resolution.dropped);
            }
        }
        unresolved
    }

    /// Submits a record to the registry.
    ///
    /// The steps happen strictly in this order:
    ///
    /// 1. resolve `subject_ids` and `domain_ids` to internal IDs
    /// 2. sanitize the resulting record (remove empty values)
    /// 3. log in and send it
    ///
    /// Sanitizing before resolving would hide sequences
    /// that only became empty through failed resolution.
    ///
    /// # Errors
    ///
    /// - [`ValidationError`] if the record is not a JSON object
    /// - [`crate::error::ConfigError`] if the registry is not fully configured
    ///   (checked before any network request)
    /// - any error of [`RegistryClient::submit`]
    #[instrument(skip_all)]
    pub async fn submit(&self, body: Value) -> Result<SubmitOutcome, Error> {
        let mut record = SubmissionRecord::try_from(body)?;
        self.registry.check_config()?;

        let unresolved = self.resolve_ids(&mut record).await;
        if !unresolved.is_empty() {
            tracing::warn!(
                "{} identifier(s) could not be resolved and were removed",
                unresolved.len()
            );
        }
        let payload = sanitize(record.into_value());
        tracing::debug!("Submitting sanitized record:\n{payload:#}");

        let response = self.registry.submit(&payload).await?;
        Ok(SubmitOutcome {
            data_status_code: response.status_code,
            response: response.body,
            unresolved,
        })
    }
}
