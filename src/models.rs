//! OpenAI API data models for the relay surface.
//!
//! Chat-completion payloads are opaque to the relay and never get typed
//! here; this module only carries the model-catalog and error envelopes.

use serde::Serialize;

/// Models hosted on Chutes that this relay advertises. The catalog is
/// static; `/v1/models` never calls upstream.
const CATALOG: &[&str] = &[
    "deepseek-ai/DeepSeek-R1-0528",
    "NousResearch/DeepHermes-3-Mistral-24B-Preview",
    "RekaAI/reka-flash-3",
    "TheDrummer/Cydonia-24B-v2.1",
    "all-hands/openhands-lm-32b-v0.1-ep3",
    "OpenGVLab/InternVL3-78B",
    "thedrummer/skyfall-36b-v2",
    "TheDrummer/Tunguska-39B-v1",
    "TheDrummer/Donnager-70B-v1",
];

/// Response from the `/v1/models` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<ModelInfo>,
}

impl ModelsResponse {
    /// The fixed model catalog in OpenAI list format.
    pub fn catalog() -> Self {
        Self {
            object: "list".to_string(),
            data: CATALOG.iter().map(|id| ModelInfo::new(id)).collect(),
        }
    }
}

/// Information about a single model (OpenAI format).
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: String,
    pub owned_by: String,
}

impl ModelInfo {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            object: "model".to_string(),
            owned_by: "chutes".to_string(),
        }
    }
}

/// Error response matching OpenAI format.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail within an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: error_type.into(),
                code: None,
            },
        }
    }

    /// Create an error response with a code.
    pub fn with_code(
        message: impl Into<String>,
        error_type: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: error_type.into(),
                code: Some(code.into()),
            },
        }
    }

    /// Upstream connection or decode failure.
    pub fn upstream_error(reason: &str) -> Self {
        Self::with_code(
            format!("Failed to reach the Chutes API: {reason}"),
            "server_error",
            "upstream_error",
        )
    }

    /// The bearer token could not be resolved.
    pub fn missing_token(reason: &str) -> Self {
        Self::with_code(
            format!("Relay is not configured: {reason}"),
            "server_error",
            "missing_token",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_every_model_once() {
        let response = ModelsResponse::catalog();
        assert_eq!(response.object, "list");
        assert_eq!(response.data.len(), CATALOG.len());
        assert!(
            response
                .data
                .iter()
                .any(|m| m.id == "deepseek-ai/DeepSeek-R1-0528")
        );
        assert!(response.data.iter().all(|m| m.object == "model"));
    }

    #[test]
    fn error_envelope_skips_absent_code() {
        let json = serde_json::to_value(ErrorResponse::new("nope", "invalid_request_error"))
            .unwrap();
        assert_eq!(json["error"]["message"], "nope");
        assert!(json["error"].get("code").is_none());

        let json = serde_json::to_value(ErrorResponse::missing_token("x")).unwrap();
        assert_eq!(json["error"]["code"], "missing_token");
    }
}
