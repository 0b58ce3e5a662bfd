// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use async_trait::async_trait;
use futures::{stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::instrument;

use super::IdKind;
use crate::settings::RegistrySettings;

pub const GRAPHQL_KEY_HEADER: &str = "x-graphql-key";

/// Maps identifier IRIs to registry-internal IDs.
#[async_trait]
pub trait IdResolver: Send + Sync {
    /// Looks up the internal ID of the term identified by `iri`.
    ///
    /// Failing to do so is expected to happen regularly,
    /// and thus is not an error, but simply yields `None`.
    async fn resolve(&self, iri: &str, kind: IdKind) -> Option<Value>;
}

#[derive(Error, Debug)]
enum LookupError {
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("GraphQL endpoint returned status {0}: {1}")]
    Status(StatusCode, String),
    #[error("Failed to deserialize the GraphQL response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("GraphQL query failed: {0}")]
    Query(String),
}

#[derive(Serialize, Debug)]
struct SearchVariables<'a> {
    q: &'a str,
}

#[derive(Serialize, Debug)]
struct GraphQlRequest<'a> {
    query: String,
    variables: SearchVariables<'a>,
}

#[derive(Deserialize, Debug)]
struct GraphQlResponse {
    data: Option<Map<String, Value>>,
    #[serde(default)]
    errors: Vec<Value>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    id: Option<Value>,
}

/// The search term is handed over as a variable,
/// so IRIs never get spliced into the query text.
#[must_use]
pub fn search_query(kind: IdKind) -> String {
    format!(
        "query ($q: String!) {{ {field}(q: $q) {{ id iri }} }}",
        field = kind.query_field()
    )
}

/// Whether a value returned as ID is actually usable as one.
fn is_usable_id(id: &Value) -> bool {
    match id {
        Value::Null => false,
        Value::String(id_str) => !id_str.is_empty(),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => true,
    }
}

/// Resolves identifiers through the FAIRsharing GraphQL API.
#[derive(Debug, Clone)]
pub struct RegistryIdResolver {
    settings: RegistrySettings,
    client: Client,
}

impl RegistryIdResolver {
    #[must_use]
    pub const fn new(settings: RegistrySettings, client: Client) -> Self {
        Self { settings, client }
    }

    async fn lookup(&self, iri: &str, kind: IdKind) -> Result<Option<Value>, LookupError> {
        let request_body = GraphQlRequest {
            query: search_query(kind),
            variables: SearchVariables { q: iri },
        };
        let mut request = self
            .client
            .post(self.settings.graphql_url.clone())
            .timeout(self.settings.resolve_timeout())
            .json(&request_body);
        if let Some(key) = &self.settings.graphql_key {
            request = request.header(GRAPHQL_KEY_HEADER, key.expose());
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status, response.text().await?));
        }
        let body = response.text().await?;
        let parsed = serde_json::from_str::<GraphQlResponse>(&body)?;
        if !parsed.errors.is_empty() {
            return Err(LookupError::Query(Value::Array(parsed.errors).to_string()));
        }

        let candidates = parsed
            .data
            .and_then(|mut data| data.remove(kind.query_field()))
            .unwrap_or(Value::Null);
        let candidates = match candidates {
            Value::Null => Vec::new(),
            other => serde_json::from_value::<Vec<Candidate>>(other)?,
        };
        Ok(candidates
            .into_iter()
            .next()
            .and_then(|first| first.id)
            .filter(is_usable_id))
    }
}

#[async_trait]
impl IdResolver for RegistryIdResolver {
    #[instrument(skip(self))]
    async fn resolve(&self, iri: &str, kind: IdKind) -> Option<Value> {
        match self.lookup(iri, kind).await {
            Ok(Some(id)) => {
                tracing::debug!("Resolved {kind} '{iri}' to internal ID {id}");
                Some(id)
            }
            Ok(None) => {
                tracing::debug!("No {kind} found for '{iri}'");
                None
            }
            Err(err) => {
                tracing::warn!("GraphQL query failed for {iri}: {err}");
                None
            }
        }
    }
}

/// The outcome of resolving a sequence of identifiers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Internal IDs, in the order of their identifiers in the input
    pub resolved: Vec<Value>,
    /// Identifiers that could not be resolved, in input order
    pub dropped: Vec<Value>,
}

/// Resolves a sequence of identifiers of one kind,
/// with up to `concurrency` look-ups in flight at once.
///
/// Entries that are numbers already are internal IDs, and are kept as-is.
/// Strings are taken to be IRIs and get resolved.
/// Everything else, and each IRI that fails to resolve, is dropped.
pub async fn resolve_all<R: IdResolver + ?Sized>(
    resolver: &R,
    ids: Vec<Value>,
    kind: IdKind,
    concurrency: usize,
) -> Resolution {
    let outcomes: Vec<(Value, Option<Value>)> = stream::iter(ids)
        .map(|id| async move {
            let internal = match &id {
                Value::String(iri) => resolver.resolve(iri, kind).await,
                Value::Number(_) => Some(id.clone()),
                Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
            };
            (id, internal)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut resolution = Resolution::default();
    for (id, internal) in outcomes {
        match internal {
            Some(internal_id) => resolution.resolved.push(internal_id),
            None => {
                tracing::warn!("Removed {kind} URI without internal ID: {id}");
                resolution.dropped.push(id);
            }
        }
    }
    resolution
}
