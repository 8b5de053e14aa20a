//! Edge conversion module
//!
//! Turns router replies into hyper responses for the HTTP server surface.

use base64::Engine as _;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use serde_json::json;

use super::response::{OutboundResponse, Reply, CONTENT_TYPE_JSON};
use crate::logger;

/// Convert a router reply into an HTTP response.
///
/// Delegate payloads that do not have the response shape cannot be expressed
/// as HTTP and become a 502 carrying the raw payload.
pub fn into_http_response(reply: Reply, is_head: bool) -> Response<Full<Bytes>> {
    match reply {
        Reply::Built(resp) => build_http_response(resp, is_head),
        Reply::Passthrough(value) => match serde_json::from_value::<OutboundResponse>(value.clone()) {
            Ok(resp) => build_http_response(resp, is_head),
            Err(e) => {
                logger::log_warning(&format!("Delegate returned a malformed response: {e}"));
                let body = json!({
                    "error": "Malformed response from special Lambda",
                    "payload": value,
                });
                build_bad_gateway_response(&body.to_string())
            }
        },
    }
}

fn build_http_response(resp: OutboundResponse, is_head: bool) -> Response<Full<Bytes>> {
    let body = if resp.is_base64_encoded {
        match base64::engine::general_purpose::STANDARD.decode(resp.body.as_bytes()) {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                logger::log_warning(&format!("Invalid base64 response body: {e}"));
                return build_bad_gateway_response(
                    &json!({ "error": "Invalid base64 body from special Lambda" }).to_string(),
                );
            }
        }
    } else {
        Bytes::from(resp.body)
    };

    let mut builder = Response::builder().status(resp.status_code);
    for (name, value) in &resp.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let body = if is_head { Bytes::new() } else { body };
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(resp.status_code, &e);
        build_bad_gateway_response(&json!({ "error": "Invalid response from handler" }).to_string())
    })
}

/// Build 502 Bad Gateway response
fn build_bad_gateway_response(body: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(502)
        .header("Content-Type", CONTENT_TYPE_JSON)
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|e| {
            log_build_error(502, &e);
            Response::new(Full::new(Bytes::from("502 Bad Gateway")))
        })
}

/// Log response build error
fn log_build_error(status: u16, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
