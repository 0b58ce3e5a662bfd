// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::borrow::Cow;

use reqwest::{
    header::{self, HeaderValue},
    Client,
};
use urlencoding::encode;

pub const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " github.com/OSTrails"
);

/// Creates the value of an HTTP `Authorization` header
/// for the given bearer token,
/// marked as sensitive so it does not end up in logs.
///
/// Returns `None` if the token contains characters
/// that are not allowed in a header value.
#[must_use]
pub fn bearer(token: &str) -> Option<HeaderValue> {
    let mut auth_value = HeaderValue::from_str(&format!("Bearer {token}")).ok()?;
    auth_value.set_sensitive(true);
    Some(auth_value)
}

/// Creates a new [`reqwest::Client`] sending the given user agent.
///
/// Timeouts are set per request instead of per client,
/// because the different calls we make to the same host
/// have quite different expected durations.
pub fn create_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    let mut headers = header::HeaderMap::new();
    if let Ok(user_agent_val) = HeaderValue::from_str(user_agent) {
        headers.insert(header::USER_AGENT, user_agent_val);
    } else {
        tracing::warn!("Invalid user agent '{user_agent}'; using the default one");
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    }
    Client::builder().default_headers(headers).build()
}

/// Percent-encodes a single path segment.
///
/// ```
/// # use fair_submit_proxy::tools::url_encode;
/// assert_eq!(url_encode(r#"Hello World"#), "Hello%20World");
/// ```
#[must_use]
pub fn url_encode(input: &str) -> Cow<'_, str> {
    encode(input)
}

/// Joins path segments into a single, percent-encoded URL path
/// (without leading slash).
#[must_use]
pub fn encode_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .map(url_encode)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_each_segment_separately() {
        assert_eq!(
            encode_path(["survey", "item 123.ttl"]),
            "survey/item%20123.ttl"
        );
        assert_eq!(encode_path(["a/b"]), "a%2Fb");
    }

    #[test]
    fn bearer_is_sensitive() {
        let value = bearer("abc").unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer abc");
        assert!(bearer("line\nbreak").is_none());
    }
}
