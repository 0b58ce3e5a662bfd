// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Commits RDF records into a GitHub repository,
//! through the REST "contents" API.
//!
//! Writes are guarded by optimistic concurrency:
//! The blob hash (`sha`) of the file is fetched right before writing,
//! and handed back with the write.
//! If somebody else changed the file in between,
//! GitHub rejects the write (409/422),
//! which we report as-is, without retrying.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Client, StatusCode,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::{
    error::{ConfigError, Error},
    model::{
        commit::{CommitAction, CommitResult},
        record_identity::RecordIdentity,
    },
    settings::ContentStoreSettings,
    tools,
};

pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";
pub const GITHUB_API_VERSION_HEADER: &str = "x-github-api-version";
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Thrown when talking to the content store failed,
/// or it refused what we asked for.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to construct the content API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("GitHub preflight failed ({0}): {1}")]
    Preflight(StatusCode, String),
    #[error("GitHub write failed ({0}): {1}")]
    Write(StatusCode, String),
    #[error("Failed to deserialize the GitHub file metadata: {0}")]
    Decode(#[source] serde_json::Error, String),
}

impl StoreError {
    /// Whether the write was rejected because the file changed
    /// between our preflight and our write.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Write(status, _)
                if *status == StatusCode::CONFLICT || *status == StatusCode::UNPROCESSABLE_ENTITY
        )
    }
}

#[derive(Deserialize, Debug)]
struct FileMeta {
    sha: Option<String>,
}

#[derive(Serialize, Debug)]
struct FileWrite<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct HtmlLink {
    html_url: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct FileWritten {
    #[serde(default)]
    commit: Option<HtmlLink>,
    #[serde(default)]
    content: Option<HtmlLink>,
}

#[must_use]
pub fn commit_message(identity: &RecordIdentity) -> String {
    format!(
        "Add or update RDF record '{}' in category '{}'.",
        identity.record_id, identity.category
    )
}

/// A GitHub repository (branch) holding RDF records,
/// one file per record, at `{category}/{record_id}.ttl`.
#[derive(Debug, Clone)]
pub struct ContentStore {
    settings: ContentStoreSettings,
    client: Client,
}

impl ContentStore {
    #[must_use]
    pub const fn new(settings: ContentStoreSettings, client: Client) -> Self {
        Self { settings, client }
    }

    #[must_use]
    pub const fn settings(&self) -> &ContentStoreSettings {
        &self.settings
    }

    fn headers(&self) -> Result<HeaderMap, ConfigError> {
        let token = self.settings.token()?;
        let auth_value =
            tools::bearer(token.expose()).ok_or(ConfigError::Invalid("content_store.token"))?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            GITHUB_API_VERSION_HEADER,
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        Ok(headers)
    }

    /// The contents API URL of the file storing the given record.
    pub fn file_api_url(&self, identity: &RecordIdentity) -> Result<Url, Error> {
        let url_str = format!(
            "{}/repos/{}/{}/contents/{}",
            self.settings.api_base.as_str().trim_end_matches('/'),
            tools::url_encode(self.settings.owner()?),
            tools::url_encode(self.settings.repository()?),
            identity.storage_path_encoded(),
        );
        Ok(Url::parse(&url_str).map_err(StoreError::from)?)
    }

    /// Creates the file for the given record,
    /// or replaces its content if it already exists.
    ///
    /// Makes exactly one preflight and one write request.
    ///
    /// # Errors
    ///
    /// - [`ConfigError`] if token, owner or repository are not configured
    ///   (before any network request)
    /// - [`StoreError`] on network failures, unexpected preflight status,
    ///   or rejected writes (including conflicts)
    #[instrument(skip(self, rdf_text), fields(path = %identity.storage_path()))]
    pub async fn commit(
        &self,
        identity: &RecordIdentity,
        rdf_text: &str,
    ) -> Result<CommitResult, Error> {
        let headers = self.headers()?;
        let url = self.file_api_url(identity)?;
        Ok(self
            .create_or_update(url, headers, identity, rdf_text)
            .await?)
    }

    async fn create_or_update(
        &self,
        url: Url,
        headers: HeaderMap,
        identity: &RecordIdentity,
        rdf_text: &str,
    ) -> Result<CommitResult, StoreError> {
        let sha = self.fetch_sha(url.clone(), headers.clone()).await?;
        let action = CommitAction::from_prior_sha(sha.as_ref());
        tracing::info!(
            "Writing record to GitHub ({action}): {}",
            identity.storage_path()
        );

        let payload = FileWrite {
            message: commit_message(identity),
            content: BASE64.encode(rdf_text.as_bytes()),
            branch: &self.settings.branch,
            sha,
        };
        let response = self
            .client
            .put(url)
            .headers(headers)
            .timeout(self.settings.timeout())
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let err = StoreError::Write(status, body);
            if err.is_conflict() {
                tracing::warn!(
                    "The file '{}' was changed concurrently; not retrying",
                    identity.storage_path()
                );
            }
            return Err(err);
        }

        let written = serde_json::from_str::<FileWritten>(&body).unwrap_or_else(|err| {
            tracing::warn!("Unexpected GitHub write response ({err}):\n{body}");
            FileWritten::default()
        });
        Ok(CommitResult {
            action,
            record_id: identity.record_id.clone(),
            category: identity.category.clone(),
            commit_url: written.commit.and_then(|link| link.html_url),
            file_url: written.content.and_then(|link| link.html_url),
        })
    }

    /// Fetches the current blob hash of the file at `url`,
    /// or `None` if it does not exist (yet).
    async fn fetch_sha(&self, url: Url, headers: HeaderMap) -> Result<Option<String>, StoreError> {
        let response = self
            .client
            .get(url)
            .headers(headers)
            .query(&[("ref", self.settings.branch.as_str())])
            .timeout(self.settings.timeout())
            .send()
            .await?;
        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                let meta = serde_json::from_str::<FileMeta>(&body)
                    .map_err(|err| StoreError::Decode(err, body))?;
                tracing::debug!("File exists, sha: {:?}", meta.sha);
                Ok(meta.sha)
            }
            StatusCode::NOT_FOUND => {
                tracing::debug!("File does not exist yet");
                Ok(None)
            }
            status => Err(StoreError::Preflight(status, response.text().await?)),
        }
    }
}
