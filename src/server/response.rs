// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{Error, TRACE_DEPTH};

/// Body of every successful response:
/// `{"status": "success", ...}`
#[derive(Serialize, Debug)]
pub struct Success<T: Serialize> {
    status: &'static str,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Success<T> {
    pub const fn new(body: T) -> Self {
        Self {
            status: "success",
            body,
        }
    }
}

/// Body of every error response:
/// `{"status": "error", "message": "...", "trace": [...]}`
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn new(message: String, trace: Vec<String>) -> Self {
        Self {
            status: "error",
            message,
            trace,
        }
    }
}

/// Wraps [`Error`] to turn it into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let trace = if self.0.is_client_error() {
            tracing::info!("Rejected request ({status}): {}", self.0);
            Vec::new()
        } else {
            tracing::error!("Request failed ({status}): {}", self.0);
            self.0.trace()
        };
        (status, Json(ErrorBody::new(self.0.to_string(), trace))).into_response()
    }
}

/// Turns a panic within a handler into a generic error response.
#[allow(clippy::needless_pass_by_value)]
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|msg| (*msg).to_owned()))
        .unwrap_or_else(|| "Unknown panic message".to_owned());
    tracing::error!("Handler panicked: {details}");
    let trace = details
        .lines()
        .rev()
        .take(TRACE_DEPTH)
        .map(ToOwned::to_owned)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(
            format!("Unexpected internal error: {}", details.lines().next().unwrap_or("")),
            trace,
        )),
    )
        .into_response()
}
