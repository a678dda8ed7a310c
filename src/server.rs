//! Axum HTTP server exposing the OpenAI-compatible relay surface.
//!
//! Routes:
//! - `POST /v1/chat/completions` (and `/chat/completions`) — relay handler
//! - `GET /v1/models` (and `/models`) — static model catalog
//! - `GET /` — health check

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use reqwest::Client;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::{ProxyConfig, UPSTREAM_TIMEOUT};
use crate::forward::relay_chat_completion;
use crate::models::{ErrorResponse, ModelsResponse};

/// Shared application state. Cloned per request; the client is an internally
/// reference-counted connection pool, safe for concurrent reuse without
/// locking.
#[derive(Clone)]
pub struct AppState {
    pub client: Client,
    pub config: ProxyConfig,
}

impl AppState {
    /// Build the long-lived outbound client and wrap it with the config.
    pub fn new(config: ProxyConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(UPSTREAM_TIMEOUT).build()?;
        Ok(Self { client, config })
    }
}

/// Build the relay router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/v1/models", get(list_models))
        .route("/models", get(list_models))
        .route("/v1/chat/completions", post(chat_completions))
        .route("/chat/completions", post(chat_completions))
        .with_state(state)
}

/// Run the relay server on a pre-bound listener until it fails or the
/// process is stopped.
pub async fn serve(listener: TcpListener, config: ProxyConfig) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let state = AppState::new(config)?;

    info!("relay listening on {addr}");
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "chutes relay online"
    }))
}

/// Static model catalog, served identically on both path aliases.
async fn list_models() -> impl IntoResponse {
    Json(ModelsResponse::catalog())
}

/// Whether the inbound payload requests a streamed response. Anything other
/// than boolean `true` (absent field, `false`, a string) means buffered.
fn wants_stream(payload: &serde_json::Value) -> bool {
    payload
        .get("stream")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
}

/// Relay handler: validate the body, resolve the token, forward upstream.
async fn chat_completions(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            error!("invalid request body: {e}");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    format!("Invalid request body: {e}"),
                    "invalid_request_error",
                )),
            )
                .into_response();
        }
    };

    let is_streaming = wants_stream(&payload);
    info!(streaming = is_streaming, "request payload: {payload}");

    // Token resolution happens before any upstream traffic; with a deferred
    // source a missing variable fails this request and nothing else.
    let token = match state.config.token.resolve() {
        Ok(t) => t,
        Err(e) => {
            error!("bearer token unavailable: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::missing_token(&e.to_string())),
            )
                .into_response();
        }
    };

    relay_chat_completion(
        &state.client,
        &state.config.upstream_url,
        &token,
        body,
        is_streaming,
    )
    .await
}
