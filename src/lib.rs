//! OpenAI-compatible relay proxy for the Chutes AI inference API.
//!
//! Accepts chat-completion requests on the OpenAI surface
//! (`POST /v1/chat/completions` plus the unprefixed alias), substitutes the
//! server-held bearer token, and forwards the request to the Chutes API.
//! Buffered responses come back as JSON; streaming responses are relayed
//! chunk-by-chunk with the upstream content type preserved.

#![deny(unsafe_code)]

pub mod config;
pub mod forward;
pub mod models;
pub mod server;

pub use server::{AppState, serve};
