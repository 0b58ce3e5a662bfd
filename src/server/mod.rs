// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The HTTP surface: health check, push to GitHub and submit to FAIRsharing.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    error::{Error, ValidationError},
    flows::{PushFlow, PushOutcome, SubmitFlow, SubmitOutcome},
    settings::{Settings, SettingsError},
    tools,
};

pub mod response;

use response::{handle_panic, ApiError, Success};

pub const BASE_PATH: &str = "/questionnaire";
pub const SERVICE_TITLE: &str = "OSTrails proxy service";
/// No interactive API documentation is served, so none is advertised.
pub const HEALTH_MESSAGE: &str = "API is running.";

#[derive(Error, Debug)]
pub enum ServeError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Failed to create the HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Failed to bind or serve: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared by all requests; immutable.
#[derive(Debug)]
pub struct AppState {
    pub push: PushFlow,
    pub submit: SubmitFlow,
}

impl AppState {
    #[must_use]
    pub const fn new(push: PushFlow, submit: SubmitFlow) -> Self {
        Self { push, submit }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        let client = tools::create_client(&settings.user_agent)?;
        Ok(Self::new(
            PushFlow::from_settings(settings, client.clone()),
            SubmitFlow::from_settings(settings, client),
        ))
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": HEALTH_MESSAGE,
        "version": crate::VERSION,
    }))
}

async fn push(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Success<PushOutcome>>, ApiError> {
    let outcome = state.push.push(&body).await?;
    Ok(Json(Success::new(outcome)))
}

async fn submit(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Success<SubmitOutcome>>, ApiError> {
    let Json(body) = payload
        .map_err(|rejection| Error::from(ValidationError::InvalidJson(rejection.body_text())))?;
    let outcome = state.submit.submit(body).await?;
    Ok(Json(Success::new(outcome)))
}

/// Builds the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(&format!("{BASE_PATH}/"), get(health))
        .route(&format!("{BASE_PATH}/push"), post(push))
        .route(&format!("{BASE_PATH}/submit"), post(submit))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for the shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down ...");
}

/// Serves the API until interrupted.
pub async fn serve(settings: &Settings) -> Result<(), ServeError> {
    let addr: SocketAddr = settings.bind_addr()?;
    let state = Arc::new(AppState::from_settings(settings)?);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("{SERVICE_TITLE} listening on http://{addr}{BASE_PATH}/");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
