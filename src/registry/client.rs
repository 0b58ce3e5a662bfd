// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use reqwest::{
    header::{HeaderValue, ACCEPT, AUTHORIZATION},
    Client,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::{AuthenticationError, RegistrySubmissionError};
use crate::{
    error::{ConfigError, Error},
    settings::{RegistryCredentials, RegistrySettings, Secret},
    tools,
};

const JSON_MIME: &str = "application/json";

#[derive(Serialize, Debug)]
struct Login<'a> {
    login: &'a str,
    password: &'a str,
}

#[derive(Serialize, Debug)]
struct LoginRequest<'a> {
    user: Login<'a>,
}

#[derive(Deserialize, Debug)]
struct LoginResponse {
    jwt: Option<String>,
}

/// What the registry answered to a successful submission.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RegistryResponse {
    pub status_code: u16,
    pub body: Value,
}

/// Submits records to FAIRsharing,
/// logging in anew for each submission.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    settings: RegistrySettings,
    client: Client,
}

impl RegistryClient {
    #[must_use]
    pub const fn new(settings: RegistrySettings, client: Client) -> Self {
        Self { settings, client }
    }

    #[must_use]
    pub const fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Fails if anything required to submit is not configured.
    pub fn check_config(&self) -> Result<(), ConfigError> {
        self.settings.credentials().map(|_| ())
    }

    /// Exchanges login and password for a short-lived session token.
    #[instrument(skip_all, fields(auth_url = %credentials.auth_url))]
    pub async fn authenticate(
        &self,
        credentials: &RegistryCredentials<'_>,
    ) -> Result<Secret, AuthenticationError> {
        let login = LoginRequest {
            user: Login {
                login: credentials.username,
                password: credentials.password.expose(),
            },
        };
        let response = self
            .client
            .post(credentials.auth_url.clone())
            .header(ACCEPT, JSON_MIME)
            .timeout(self.settings.auth_timeout())
            .json(&login)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AuthenticationError::Status(status, body));
        }
        let parsed = serde_json::from_str::<LoginResponse>(&body)
            .map_err(|err| AuthenticationError::Decode(err, body))?;
        let jwt = parsed
            .jwt
            .filter(|jwt| !jwt.is_empty())
            .ok_or(AuthenticationError::MissingToken)?;
        tracing::debug!("Obtained a session token");
        Ok(Secret::from(jwt))
    }

    async fn post_record(
        &self,
        data_url: &Url,
        jwt: &Secret,
        record: &Value,
    ) -> Result<RegistryResponse, Error> {
        let auth_value = tools::bearer(jwt.expose())
            .ok_or(AuthenticationError::MissingToken)?;
        let response = self
            .client
            .post(data_url.clone())
            .header(ACCEPT, HeaderValue::from_static(JSON_MIME))
            .header(AUTHORIZATION, auth_value)
            .timeout(self.settings.submit_timeout())
            .json(record)
            .send()
            .await
            .map_err(RegistrySubmissionError::from)?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(RegistrySubmissionError::from)?;
        if !status.is_success() {
            return Err(RegistrySubmissionError::Status(status, text).into());
        }
        let body = serde_json::from_str::<Value>(&text).unwrap_or_else(|_err| {
            tracing::debug!("Registry response is not JSON; passing it on as text");
            Value::String(text)
        });
        Ok(RegistryResponse {
            status_code: status.as_u16(),
            body,
        })
    }

    /// Logs in and submits the record.
    ///
    /// The record is sent as-is;
    /// resolving and sanitizing it is the callers job.
    ///
    /// # Errors
    ///
    /// - [`ConfigError`] if URLs or credentials are not configured
    ///   (before any network request)
    /// - [`AuthenticationError`] if the login fails or yields no token;
    ///   the record is then not sent at all
    /// - [`RegistrySubmissionError`] if the registry does not accept the record
    #[instrument(skip_all)]
    pub async fn submit(&self, record: &Value) -> Result<RegistryResponse, Error> {
        let credentials = self.settings.credentials()?;
        let jwt = self.authenticate(&credentials).await?;
        let response = self.post_record(credentials.data_url, &jwt, record).await?;
        tracing::info!(
            "FAIRsharing accepted the record with status {}",
            response.status_code
        );
        Ok(response)
    }
}
