// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

#![allow(clippy::shadow_reuse)]

use config::{Config, ConfigError};
use serde::Deserialize;
use std::{fmt, net::SocketAddr, path::Path, time::Duration};
use thiserror::Error;
use typed_builder::TypedBuilder;
use url::Url;

use crate::error;

pub const DEFAULT_CONFIG_FILE: &str = "config.yml";
pub const ENV_PREFIX: &str = "FAIR_PROXY";
pub const ENV_SEPARATOR: &str = "__";

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_OWNER: &str = "OSTrails";
pub const DEFAULT_GITHUB_REPO: &str = "assessment-component-metadata-records";
pub const DEFAULT_GITHUB_BRANCH: &str = "main";
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.fairsharing.org/graphql";
/// The public key of the FAIRsharing web client,
/// which allows anonymous read access to the GraphQL API.
pub const DEFAULT_GRAPHQL_KEY: &str = "484de7ca-4496-4ee7-8cbf-578d2923c08f";

/// Request timeouts, in milliseconds (ms)
pub const DEFAULT_STORE_TIMEOUT: u64 = 20_000;
pub const DEFAULT_RESOLVE_TIMEOUT: u64 = 10_000;
pub const DEFAULT_AUTH_TIMEOUT: u64 = 15_000;
pub const DEFAULT_SUBMIT_TIMEOUT: u64 = 30_000;

/// Max number of identifier look-ups in flight per sequence.
pub const DEFAULT_RESOLVE_CONCURRENCY: usize = 8;

/// Plain environment variable names understood for compatibility
/// with existing deployments, mapped to their settings key.
/// These take precedence over everything else.
const LEGACY_ENV_VARS: [(&str, &str); 5] = [
    ("registry.auth_url", "AUTH_URL"),
    ("registry.data_url", "DATA_URL"),
    ("registry.username", "USERNAME"),
    ("registry.password", "PASSWORD"),
    ("content_store.token", "GITHUB_TOKEN"),
];

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load the configuration data: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid bind address '{0}': {1}")]
    InvalidBind(String, #[source] std::net::AddrParseError),
}

/// A configuration value that must never show up in logs.
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"***\"")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

fn default_user_agent() -> String {
    crate::tools::USER_AGENT.to_owned()
}

fn default_bind() -> String {
    DEFAULT_BIND.to_owned()
}

fn default_github_api() -> Url {
    Url::parse(DEFAULT_GITHUB_API).unwrap()
}

fn default_github_owner() -> String {
    DEFAULT_GITHUB_OWNER.to_owned()
}

fn default_github_repo() -> String {
    DEFAULT_GITHUB_REPO.to_owned()
}

fn default_github_branch() -> String {
    DEFAULT_GITHUB_BRANCH.to_owned()
}

fn default_graphql_url() -> Url {
    Url::parse(DEFAULT_GRAPHQL_URL).unwrap()
}

#[allow(clippy::unnecessary_wraps)]
fn default_graphql_key() -> Option<Secret> {
    Some(Secret::from(DEFAULT_GRAPHQL_KEY))
}

/// Where and how RDF records get committed to.
#[derive(Deserialize, Debug, Clone, TypedBuilder)]
pub struct ContentStoreSettings {
    /// Base URL of the GitHub REST API
    #[serde(default = "default_github_api")]
    #[builder(default = default_github_api())]
    pub api_base: Url,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub token: Option<Secret>,
    #[serde(default = "default_github_owner")]
    #[builder(default = default_github_owner(), setter(into))]
    pub owner: String,
    #[serde(default = "default_github_repo")]
    #[builder(default = default_github_repo(), setter(into))]
    pub repository: String,
    #[serde(default = "default_github_branch")]
    #[builder(default = default_github_branch(), setter(into))]
    pub branch: String,
    /// Timeout per request in milliseconds (ms)
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub timeout: Option<u64>,
}

impl ContentStoreSettings {
    pub fn token(&self) -> Result<&Secret, error::ConfigError> {
        self.token
            .as_ref()
            .ok_or(error::ConfigError::Missing("content_store.token"))
    }

    pub fn owner(&self) -> Result<&str, error::ConfigError> {
        non_empty(&self.owner).ok_or(error::ConfigError::Missing("content_store.owner"))
    }

    pub fn repository(&self) -> Result<&str, error::ConfigError> {
        non_empty(&self.repository).ok_or(error::ConfigError::Missing("content_store.repository"))
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout.unwrap_or(DEFAULT_STORE_TIMEOUT))
    }
}

impl Default for ContentStoreSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// How to reach and authenticate against FAIRsharing.
#[derive(Deserialize, Debug, Clone, TypedBuilder)]
pub struct RegistrySettings {
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub auth_url: Option<Url>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub data_url: Option<Url>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub username: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub password: Option<Secret>,
    #[serde(default = "default_graphql_url")]
    #[builder(default = default_graphql_url())]
    pub graphql_url: Url,
    #[serde(default = "default_graphql_key")]
    #[builder(default = default_graphql_key())]
    pub graphql_key: Option<Secret>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub resolve_concurrency: Option<usize>,
    /// Timeout per identifier look-up in milliseconds (ms)
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub resolve_timeout: Option<u64>,
    /// Timeout of the credentials exchange in milliseconds (ms)
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub auth_timeout: Option<u64>,
    /// Timeout of the record submission in milliseconds (ms)
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub submit_timeout: Option<u64>,
}

/// The checked, non-optional part of [`RegistrySettings`]
/// needed to submit a record.
#[derive(Debug)]
pub struct RegistryCredentials<'a> {
    pub auth_url: &'a Url,
    pub data_url: &'a Url,
    pub username: &'a str,
    pub password: &'a Secret,
}

impl RegistrySettings {
    pub fn credentials(&self) -> Result<RegistryCredentials<'_>, error::ConfigError> {
        Ok(RegistryCredentials {
            auth_url: self
                .auth_url
                .as_ref()
                .ok_or(error::ConfigError::Missing("registry.auth_url"))?,
            data_url: self
                .data_url
                .as_ref()
                .ok_or(error::ConfigError::Missing("registry.data_url"))?,
            username: self
                .username
                .as_deref()
                .and_then(non_empty)
                .ok_or(error::ConfigError::Missing("registry.username"))?,
            password: self
                .password
                .as_ref()
                .ok_or(error::ConfigError::Missing("registry.password"))?,
        })
    }

    #[must_use]
    pub fn resolve_concurrency(&self) -> usize {
        self.resolve_concurrency
            .unwrap_or(DEFAULT_RESOLVE_CONCURRENCY)
            .max(1)
    }

    #[must_use]
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout.unwrap_or(DEFAULT_RESOLVE_TIMEOUT))
    }

    #[must_use]
    pub fn auth_timeout(&self) -> Duration {
        Duration::from_millis(self.auth_timeout.unwrap_or(DEFAULT_AUTH_TIMEOUT))
    }

    #[must_use]
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout.unwrap_or(DEFAULT_SUBMIT_TIMEOUT))
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Deserialize, Debug, Clone, TypedBuilder)]
pub struct Settings {
    #[serde(default = "default_user_agent")]
    #[builder(default = default_user_agent(), setter(into))]
    pub user_agent: String,
    /// Address the HTTP server listens on
    #[serde(default = "default_bind")]
    #[builder(default = default_bind(), setter(into))]
    pub bind: String,
    #[serde(default)]
    #[builder(default)]
    pub content_store: ContentStoreSettings,
    #[serde(default)]
    #[builder(default)]
    pub registry: RegistrySettings,
}

impl Settings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind
            .parse()
            .map_err(|err| SettingsError::InvalidBind(self.bind.clone(), err))
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Loads the settings from (in increasing order of precedence):
///
/// 1. built-in defaults
/// 2. the config file (`config.yml` if none is given, which may be absent)
/// 3. environment variables prefixed with `FAIR_PROXY__`,
///    e.g. `FAIR_PROXY__REGISTRY__AUTH_URL`
/// 4. the plain variables `AUTH_URL`, `DATA_URL`, `USERNAME`, `PASSWORD`
///    and `GITHUB_TOKEN`
///
/// # Errors
///
/// - the config loader fails to build
/// - settings failed to load and deserialize
pub fn load(config_file: Option<&Path>) -> Result<Settings, SettingsError> {
    let file_source = config_file.map_or_else(
        || config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        |path| config::File::from(path).required(true),
    );
    let mut settings_loader = Config::builder().add_source(file_source).add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );
    for (key, var) in LEGACY_ENV_VARS {
        let value = std::env::var(var).ok().filter(|val| !val.is_empty());
        if value.is_some() {
            tracing::debug!("Using legacy environment variable '{var}' for '{key}'");
        }
        settings_loader = settings_loader.set_override_option(key, value)?;
    }

    let settings = settings_loader.build()?.try_deserialize::<Settings>()?;

    tracing::debug!("{settings:#?}");

    Ok(settings)
}
