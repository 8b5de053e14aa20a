// Request normalization module
// Converts a raw HTTP request into the load balancer event shape

use base64::Engine as _;
use hyper::http::request::Parts;
use std::collections::HashMap;
use std::net::IpAddr;

use super::InboundRequest;

/// Build an `InboundRequest` from HTTP request parts and the collected body.
///
/// Query values are kept exactly as received (no percent-decoding) and header
/// names are lowercased, as the load balancer delivers them. Repeated headers
/// keep their last value. The source IP is the first `X-Forwarded-For` hop,
/// falling back to the peer address.
pub fn from_http_parts(parts: &Parts, body: &[u8], peer_ip: Option<IpAddr>) -> InboundRequest {
    let mut request = InboundRequest::new(parts.uri.path(), parts.method.as_str());

    let query: HashMap<String, String> = parts
        .uri
        .query()
        .map(parse_raw_query)
        .unwrap_or_default();
    request.query_string_parameters = Some(query);

    let headers: HashMap<String, String> = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_ascii_lowercase(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    request.headers = Some(headers);

    let forwarded = request
        .header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string);
    if let Some(ip) = forwarded.or_else(|| peer_ip.map(|ip| ip.to_string())) {
        request.set_source_ip(ip);
    }

    match std::str::from_utf8(body) {
        Ok(text) => {
            request.body = Some(text.to_string());
            request.is_base64_encoded = Some(false);
        }
        Err(_) => {
            request.body = Some(base64::engine::general_purpose::STANDARD.encode(body));
            request.is_base64_encoded = Some(true);
        }
    }

    request
}

/// Split a raw query string into key/value pairs without decoding
fn parse_raw_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}
