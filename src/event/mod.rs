//! Load balancer event module
//!
//! Normalized view of the triggering request and of the execution context.
//! Events keep every field they were given so the delegate receives the
//! original request without loss.

mod context;
mod normalize;

pub use context::{DelegateContext, InvocationContext};
pub use normalize::from_http_parts;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Source IP reported when the event carries none
pub const UNKNOWN: &str = "unknown";

/// Inbound request as delivered by the load balancer integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundRequest {
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_method")]
    pub http_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_context: Option<RequestContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_base64_encoded: Option<bool>,
    /// Event fields this router does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `requestContext` block of the event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `requestContext.identity` block of the event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_path() -> String {
    "/".to_string()
}

fn default_method() -> String {
    "GET".to_string()
}

impl Default for InboundRequest {
    fn default() -> Self {
        Self {
            path: default_path(),
            http_method: default_method(),
            query_string_parameters: None,
            headers: None,
            request_context: None,
            body: None,
            is_base64_encoded: None,
            extra: Map::new(),
        }
    }
}

impl InboundRequest {
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            http_method: method.into(),
            ..Self::default()
        }
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `requestContext.identity.sourceIp`, or `"unknown"` when any level is missing
    pub fn source_ip(&self) -> &str {
        self.request_context
            .as_ref()
            .and_then(|rc| rc.identity.as_ref())
            .and_then(|id| id.source_ip.as_deref())
            .unwrap_or(UNKNOWN)
    }

    pub fn set_source_ip(&mut self, ip: impl Into<String>) {
        self.request_context
            .get_or_insert_with(RequestContext::default)
            .identity
            .get_or_insert_with(Identity::default)
            .source_ip = Some(ip.into());
    }

    pub fn user_agent(&self) -> &str {
        self.header("user-agent").unwrap_or(UNKNOWN)
    }

    pub fn host(&self) -> &str {
        self.header("host").unwrap_or(UNKNOWN)
    }
}
