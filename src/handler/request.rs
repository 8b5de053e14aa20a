//! HTTP entry point
//!
//! Normalizes each hyper request into a load balancer event, runs the router
//! and converts its reply back into an HTTP response.

use http_body_util::{BodyExt, Full};
use hyper::body::{Body as _, Bytes, Incoming};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::event::{self, InboundRequest, InvocationContext};
use crate::http::response::build_internal_error_response;
use crate::http::{into_http_response, Reply};
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body from {peer}: {e}"));
            Bytes::new()
        }
    };

    Ok(dispatch(&parts, &body, state, peer).await)
}

/// Route an already collected request
pub(crate) async fn dispatch(
    parts: &Parts,
    body: &[u8],
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Response<Full<Bytes>> {
    let started = Instant::now();
    let is_head = parts.method == Method::HEAD;

    let request = event::from_http_parts(parts, body, Some(peer.ip()));
    let context = InvocationContext::for_function(&state.settings.function);

    let mut entry = state.settings.logging.access_log.then(|| {
        access_entry(parts, &request, &context)
    });

    let reply = route_isolated(Arc::clone(&state), request, context).await;
    let response = into_http_response(reply, is_head);

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.settings.logging.access_log_format);
    }

    response
}

/// Run the router on its own task so a panic becomes a 500 instead of
/// tearing down the connection
async fn route_isolated(
    state: Arc<AppState>,
    request: InboundRequest,
    context: InvocationContext,
) -> Reply {
    let request_id = context.request_id.clone();
    let task = tokio::spawn(async move { state.router.route(&request, &context).await });

    match task.await {
        Ok(reply) => reply,
        Err(e) => {
            logger::log_error(&format!("Request {request_id} aborted: {e}"));
            build_internal_error_response(&e.to_string()).into()
        }
    }
}

fn access_entry(
    parts: &Parts,
    request: &InboundRequest,
    context: &InvocationContext,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        request.source_ip().to_string(),
        context.request_id.clone(),
        request.http_method.clone(),
        request.path.clone(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.referer = request.header("referer").map(ToString::to_string);
    entry.user_agent = request.header("user-agent").map(ToString::to_string);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::routing::testing::{vars, MemoryStore, RecordingInvoker};
    use crate::routing::Router;
    use serde_json::{json, Value};

    const PEER: &str = "10.0.0.9:41000";

    fn state(store: MemoryStore, invoker: RecordingInvoker, env: &[(&str, &str)]) -> Arc<AppState> {
        let mut settings = Settings::load_from("nonexistent-router-settings").unwrap();
        settings.logging.access_log = false;
        let router = Router::new(Arc::new(store), Arc::new(invoker)).with_environment(vars(env));
        Arc::new(AppState::new(settings, router))
    }

    fn parts(method: &str, uri: &str) -> Parts {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("host", "example.com")
            .header("user-agent", "curl/8.0")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_operational_request() {
        let state = state(
            MemoryStore::default(),
            RecordingInvoker::returning(json!({})),
            &[("MAINTENANCE_MODE", "false")],
        );
        let resp = dispatch(&parts("GET", "/status?x=1"), b"", state, PEER.parse().unwrap()).await;
        assert_eq!(resp.status(), 200);
        let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(body["path"], "/status");
    }

    #[tokio::test]
    async fn test_maintenance_page_uses_peer_as_source_ip() {
        let state = state(
            MemoryStore::with_object("maintenance-pages", "maintenance.html", "ip={{SOURCE_IP}} host={{HOST}}"),
            RecordingInvoker::returning(json!({})),
            &[],
        );
        let resp = dispatch(&parts("GET", "/"), b"", state, PEER.parse().unwrap()).await;
        assert_eq!(resp.status(), 503);
        assert_eq!(resp.headers()["retry-after"], "3600");
        assert_eq!(&body_bytes(resp).await[..], b"ip=10.0.0.9 host=example.com");
    }

    #[tokio::test]
    async fn test_delegate_receives_normalized_event() {
        let invoker = Arc::new(RecordingInvoker::returning(json!({
            "statusCode": 201,
            "headers": { "X-Delegate": "yes" },
            "body": "created"
        })));
        let mut settings = Settings::load_from("nonexistent-router-settings").unwrap();
        settings.logging.access_log = false;
        let router = Router::new(Arc::new(MemoryStore::default()), invoker.clone()).with_environment(vars(&[
            ("SPECIAL_URL_PATH", "/special"),
            ("SPECIAL_LAMBDA_ARN", "arn:aws:lambda:us-east-1:1:function:special"),
        ]));
        let state = Arc::new(AppState::new(settings, router));

        let resp = dispatch(&parts("POST", "/special/orders?id=7"), b"{\"a\":1}", state, PEER.parse().unwrap()).await;
        assert_eq!(resp.status(), 201);
        assert_eq!(resp.headers()["x-delegate"], "yes");
        assert_eq!(&body_bytes(resp).await[..], b"created");

        let calls = invoker.calls();
        assert_eq!(calls.len(), 1);
        let event = &calls[0].1["event"];
        assert_eq!(event["path"], "/special/orders");
        assert_eq!(event["httpMethod"], "POST");
        assert_eq!(event["queryStringParameters"]["id"], "7");
        assert_eq!(event["body"], "{\"a\":1}");
        assert_eq!(event["requestContext"]["identity"]["sourceIp"], "10.0.0.9");
    }

    #[tokio::test]
    async fn test_head_request_has_empty_body() {
        let state = state(
            MemoryStore::with_object("maintenance-pages", "maintenance.html", "<html>down</html>"),
            RecordingInvoker::returning(json!({})),
            &[],
        );
        let resp = dispatch(&parts("HEAD", "/"), b"", state, PEER.parse().unwrap()).await;
        assert_eq!(resp.status(), 503);
        assert!(body_bytes(resp).await.is_empty());
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_2), "2.0");
    }
}
