// Function invocation client module
// Synchronous request/response invocation of the delegate function

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use thiserror::Error;

use crate::logger;

/// Header set by the invoke API when the function itself raised
const FUNCTION_ERROR_HEADER: &str = "x-amz-function-error";

/// Invocation failures. None of them are retried.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("no invoke endpoint configured")]
    Unavailable,

    #[error("invoke API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("response payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Downstream invoke contract
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    /// Invoke `function_id` with `payload` and wait for its response payload
    async fn invoke(&self, function_id: &str, payload: &Value) -> Result<Value, InvokeError>;
}

/// Client for the function invoke API:
/// `POST {endpoint}/2015-03-31/functions/{function_id}/invocations`
pub struct HttpFunctionInvoker {
    client: Client<HttpConnector, Full<Bytes>>,
    endpoint: String,
}

impl HttpFunctionInvoker {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn invocation_uri(&self, function_id: &str) -> Result<Uri, InvokeError> {
        format!("{}/2015-03-31/functions/{function_id}/invocations", self.endpoint)
            .parse()
            .map_err(|e| InvokeError::Transport(format!("invalid function id '{function_id}': {e}")))
    }
}

#[async_trait]
impl FunctionInvoker for HttpFunctionInvoker {
    async fn invoke(&self, function_id: &str, payload: &Value) -> Result<Value, InvokeError> {
        let body = serde_json::to_vec(payload)?;
        let req = Request::builder()
            .method(Method::POST)
            .uri(self.invocation_uri(function_id)?)
            .header("Content-Type", "application/json")
            .header("X-Amz-Invocation-Type", "RequestResponse")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| InvokeError::Transport(e.to_string()))?;

        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| InvokeError::Transport(e.to_string()))?;

        let status = resp.status();
        let function_error = resp
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        let bytes = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| InvokeError::Transport(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            return Err(InvokeError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        // Function errors arrive as successful calls; the payload is still returned
        if let Some(kind) = function_error {
            logger::log_warning(&format!("Function {function_id} reported error: {kind}"));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Invoker used when no invoke endpoint is configured
pub struct DisabledInvoker;

#[async_trait]
impl FunctionInvoker for DisabledInvoker {
    async fn invoke(&self, _function_id: &str, _payload: &Value) -> Result<Value, InvokeError> {
        Err(InvokeError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::testing::CannedServer;
    use serde_json::json;

    const FUNCTION_ID: &str = "arn:aws:lambda:us-east-1:123456789012:function:special";

    #[test]
    fn test_invocation_uri() {
        let invoker = HttpFunctionInvoker::new("http://localhost:9001/");
        let uri = invoker
            .invocation_uri("arn:aws:lambda:us-east-1:123456789012:function:special")
            .unwrap();
        assert_eq!(
            uri.to_string(),
            "http://localhost:9001/2015-03-31/functions/arn:aws:lambda:us-east-1:123456789012:function:special/invocations"
        );
    }

    #[tokio::test]
    async fn test_disabled_invoker_always_fails() {
        let err = DisabledInvoker
            .invoke("special", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Unavailable));
        assert_eq!(err.to_string(), "no invoke endpoint configured");
    }

    #[tokio::test]
    async fn test_http_invoker_returns_payload() {
        let server = CannedServer::start(
            200,
            &[("Content-Type", "application/json")],
            r#"{"statusCode":200,"body":"ok"}"#,
        )
        .await;
        let invoker = HttpFunctionInvoker::new(&server.base_url());
        let payload = json!({ "event": { "path": "/special/x" }, "context": { "request_id": "abc" } });

        let response = invoker.invoke(FUNCTION_ID, &payload).await.unwrap();
        assert_eq!(response, json!({ "statusCode": 200, "body": "ok" }));

        let seen = server.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].path, format!("/2015-03-31/functions/{FUNCTION_ID}/invocations"));
        assert_eq!(seen[0].invocation_type.as_deref(), Some("RequestResponse"));
        let sent: Value = serde_json::from_slice(&seen[0].body).unwrap();
        assert_eq!(sent, payload);
    }

    #[tokio::test]
    async fn test_http_invoker_error_status() {
        let server = CannedServer::start(429, &[], "Rate exceeded").await;
        let invoker = HttpFunctionInvoker::new(&server.base_url());

        let err = invoker.invoke(FUNCTION_ID, &json!({})).await.unwrap_err();
        assert!(matches!(
            &err,
            InvokeError::Status { status: 429, body } if body == "Rate exceeded"
        ));
        assert_eq!(err.to_string(), "invoke API returned HTTP 429: Rate exceeded");
    }

    #[tokio::test]
    async fn test_http_invoker_non_json_payload() {
        let server = CannedServer::start(200, &[], "<html>not json</html>").await;
        let invoker = HttpFunctionInvoker::new(&server.base_url());

        let err = invoker.invoke(FUNCTION_ID, &json!({})).await.unwrap_err();
        assert!(matches!(err, InvokeError::Payload(_)));
    }

    #[tokio::test]
    async fn test_http_invoker_function_error_passes_payload() {
        let server = CannedServer::start(
            200,
            &[("X-Amz-Function-Error", "Unhandled")],
            r#"{"errorMessage":"boom","errorType":"RuntimeError"}"#,
        )
        .await;
        let invoker = HttpFunctionInvoker::new(&server.base_url());

        let response = invoker.invoke(FUNCTION_ID, &json!({})).await.unwrap();
        assert_eq!(response, json!({ "errorMessage": "boom", "errorType": "RuntimeError" }));
    }

    #[tokio::test]
    async fn test_http_invoker_unreachable_endpoint() {
        let addr = CannedServer::unused_addr().await;
        let invoker = HttpFunctionInvoker::new(&format!("http://{addr}"));

        let err = invoker.invoke(FUNCTION_ID, &json!({})).await.unwrap_err();
        assert!(matches!(err, InvokeError::Transport(_)));
    }
}
