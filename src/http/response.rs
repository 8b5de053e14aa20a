//! Response building module
//!
//! Builders for the load balancer response shape. Every branch of the router
//! produces its output through these functions.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";

/// Seconds clients are told to wait before retrying during maintenance
pub const RETRY_AFTER_SECS: u32 = 3600;

/// Response in the shape the load balancer integration expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundResponse {
    pub status_code: u16,
    #[serde(default)]
    pub status_description: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: String,
}

/// What the router hands back to its caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// Response built by this service
    Built(OutboundResponse),
    /// Delegate payload, returned exactly as received
    Passthrough(Value),
}

#[cfg(test)]
impl OutboundResponse {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl Reply {
    /// Status code, if the reply carries one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Built(resp) => Some(resp.status_code),
            Self::Passthrough(value) => value
                .get("statusCode")
                .and_then(Value::as_u64)
                .and_then(|code| u16::try_from(code).ok()),
        }
    }
}

impl From<OutboundResponse> for Reply {
    fn from(resp: OutboundResponse) -> Self {
        Self::Built(resp)
    }
}

/// Standard description for the status codes this service emits
pub fn status_description(status: u16) -> String {
    let reason = hyper::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    format!("{status} {reason}")
}

/// Build a response with a single content-type header
pub fn build_response(status: u16, content_type: &str, body: String) -> OutboundResponse {
    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), content_type.to_string());
    OutboundResponse {
        status_code: status,
        status_description: status_description(status),
        is_base64_encoded: false,
        headers,
        body,
    }
}

/// Build a JSON response from any serializable value
pub fn build_json_response(status: u16, body: &Value) -> OutboundResponse {
    build_response(status, CONTENT_TYPE_JSON, body.to_string())
}

/// Build the 503 maintenance page response
pub fn build_maintenance_response(html: String) -> OutboundResponse {
    let mut resp = build_response(503, CONTENT_TYPE_HTML, html);
    resp.headers
        .insert("Retry-After".to_string(), RETRY_AFTER_SECS.to_string());
    resp
}

/// Build 200 response for normal operation
pub fn build_operational_response(path: &str) -> OutboundResponse {
    build_json_response(
        200,
        &json!({ "message": "Service is operational", "path": path }),
    )
}

/// Build 503 response for a delegate that was never configured
pub fn build_delegate_unconfigured_response() -> OutboundResponse {
    build_json_response(503, &json!({ "error": "Special Lambda ARN not configured" }))
}

/// Build 500 response for a failed delegate invocation
pub fn build_delegate_error_response(detail: &str) -> OutboundResponse {
    build_json_response(
        500,
        &json!({ "error": format!("Error invoking special Lambda: {detail}") }),
    )
}

/// Build the last-resort 500 response
pub fn build_internal_error_response(detail: &str) -> OutboundResponse {
    build_json_response(
        500,
        &json!({ "error": "Internal server error", "message": detail }),
    )
}
