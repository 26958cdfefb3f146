//! Open Floor endpoint: parse the body, run the agent, wrap the reply.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::agent::ParrotAgent;
use crate::protocol::{Envelope, Payload};

/// Transport-level failures. Each becomes an HTTP error with a JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid JSON payload")]
    InvalidJson,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Invalid OpenFloor payload format: {0}")]
    InvalidPayload(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::InvalidJson
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, body) = match self {
            ApiError::InvalidJson => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid JSON payload" }),
            ),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({ "error": "Payload too large" }),
            ),
            ApiError::InvalidPayload(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid OpenFloor payload format", "details": details }),
            ),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error", "message": message }),
            ),
        };
        (code, Json(body)).into_response()
    }
}

/// Decode a request body into an inbound envelope.
///
/// Accepts `{"openFloor": envelope}` or a bare envelope. Anything that is not
/// JSON, or is a blank JSON value, is `InvalidJson`; any other shape is left
/// to the envelope decoder to reject.
pub fn parse_envelope(body: &[u8]) -> Result<Envelope, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;
    if is_blank(&value) {
        return Err(ApiError::InvalidJson);
    }

    let is_wrapped = value
        .as_object()
        .is_some_and(|map| map.contains_key("openFloor"));

    let envelope = if is_wrapped {
        serde_json::from_value::<Payload>(value).map(|payload| payload.open_floor)
    } else {
        serde_json::from_value::<Envelope>(value)
    };

    envelope.map_err(|e| {
        tracing::warn!("🦜 Parsing error: {}", e);
        ApiError::InvalidPayload(e.to_string())
    })
}

// null, false, 0, "", [] and {}
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Run one request body through the agent and encode the reply payload.
pub fn handle_request(agent: &ParrotAgent, body: &[u8]) -> Result<Vec<u8>, ApiError> {
    let inbound = parse_envelope(body)?;
    tracing::info!("🦜 Processing envelope from: {}", inbound.sender.speaker_uri);

    let outbound = agent.process_envelope(&inbound);
    let payload = Payload::new(outbound);

    serde_json::to_vec(&payload).map_err(|e| ApiError::Internal(e.to_string()))
}

/// `POST /`
pub async fn openfloor_message(
    State(agent): State<Arc<ParrotAgent>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let encoded = body
        .map_err(ApiError::from)
        .and_then(|body| handle_request(&agent, &body))
        .inspect_err(|e| {
            tracing::error!("🦜 Error processing request: {}", e);
        })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        encoded,
    )
        .into_response())
}

/// `OPTIONS /`
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::create_parrot_agent;

    fn agent() -> ParrotAgent {
        create_parrot_agent("tag:parrot", "http://localhost:8080/", "Polly", "Org", "Parrot")
    }

    #[test]
    fn test_rejects_non_json() {
        assert!(matches!(parse_envelope(b"{nope"), Err(ApiError::InvalidJson)));
        assert!(matches!(parse_envelope(b""), Err(ApiError::InvalidJson)));
    }

    #[test]
    fn test_rejects_blank_json() {
        for body in ["{}", "[]", "null", "false", "0", "\"\""] {
            assert!(
                matches!(parse_envelope(body.as_bytes()), Err(ApiError::InvalidJson)),
                "{} should be invalid JSON",
                body
            );
        }
    }

    #[test]
    fn test_non_object_json_is_payload_error() {
        for body in ["[1, 2]", "\"x\"", "5", "true"] {
            assert!(
                matches!(parse_envelope(body.as_bytes()), Err(ApiError::InvalidPayload(_))),
                "{} should be an invalid payload",
                body
            );
        }
    }

    #[test]
    fn test_rejects_schema_violation_with_details() {
        let err = parse_envelope(br#"{"openFloor": {"events": []}}"#).unwrap_err();
        let ApiError::InvalidPayload(details) = err else {
            panic!("expected payload error");
        };
        assert!(details.contains("sender"));
    }

    #[test]
    fn test_accepts_wrapped_and_bare_envelopes() {
        let wrapped = parse_envelope(br#"{"openFloor": {"sender": {"speakerUri": "tag:a"}}}"#)
            .unwrap();
        let bare = parse_envelope(br#"{"sender": {"speakerUri": "tag:a"}}"#).unwrap();
        assert_eq!(wrapped, bare);
    }

    #[test]
    fn test_handle_request_wraps_reply() {
        let body = br#"{"sender": {"speakerUri": "tag:a"}, "events": [{"eventType": "getManifests"}]}"#;
        let encoded = handle_request(&agent(), body).unwrap();

        let value: Value = serde_json::from_slice(&encoded).unwrap();
        let events = value["openFloor"]["events"].as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["eventType"], "publishManifests");
        assert_eq!(value["openFloor"]["sender"]["speakerUri"], "tag:parrot");
    }
}
