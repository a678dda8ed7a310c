//! Outbound relay to the Chutes API.
//!
//! Builds the upstream request with the substituted bearer token and relays
//! the response back. Streaming responses are forwarded chunk-by-chunk in
//! arrival order with no buffering beyond the chunk in flight; buffered
//! responses are decoded as JSON and returned whole. The upstream HTTP
//! status code is forwarded on both paths.

use axum::{
    Json,
    body::Body,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::Client;
use tracing::{error, info};

use crate::models::ErrorResponse;

/// Relay a chat completion to the upstream endpoint.
///
/// Inbound headers are never forwarded; the outbound request carries exactly
/// `content-type: application/json` and the bearer token. `body` is the raw
/// inbound body, already validated as JSON by the caller, forwarded
/// byte-for-byte.
pub async fn relay_chat_completion(
    client: &Client,
    upstream_url: &str,
    token: &str,
    body: Bytes,
    is_streaming: bool,
) -> Response {
    let upstream = match client
        .post(upstream_url)
        .header("content-type", "application/json")
        .bearer_auth(token)
        .body(body)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            error!("upstream request failed: {e}");
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::upstream_error(&e.to_string())),
            )
                .into_response();
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);

    if is_streaming {
        relay_streaming_response(upstream, status)
    } else {
        relay_buffered_response(upstream, status).await
    }
}

/// Forward the upstream byte stream to the caller unmodified.
///
/// Each upstream read is a suspension point; the chunk is handed to the
/// caller-facing body before the next read is awaited, so delivery order is
/// exactly arrival order. The stream ends when upstream closes it.
fn relay_streaming_response(upstream: reqwest::Response, status: StatusCode) -> Response {
    let content_type = upstream
        .headers()
        .get("content-type")
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    let relayed = upstream.bytes_stream().map(|chunk| {
        if let Ok(bytes) = &chunk {
            info!("streaming chunk from upstream: {}", String::from_utf8_lossy(bytes));
        }
        // Body::from_stream wants io::Error
        chunk.map_err(std::io::Error::other)
    });

    Response::builder()
        .status(status)
        .header("content-type", content_type)
        .header("cache-control", "no-cache")
        .body(Body::from_stream(relayed))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Read the full upstream body, decode it as JSON, and return it.
async fn relay_buffered_response(upstream: reqwest::Response, status: StatusCode) -> Response {
    match upstream.json::<serde_json::Value>().await {
        Ok(payload) => {
            info!("upstream response: {payload}");
            (status, Json(payload)).into_response()
        }
        Err(e) => {
            error!("failed to decode upstream response as JSON: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::upstream_error(&e.to_string())),
            )
                .into_response()
        }
    }
}
