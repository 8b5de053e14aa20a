//! Delegate invoker
//!
//! Hands requests under the special prefix to another function and returns
//! its response payload exactly as received. The payload is not validated: a
//! malformed response reaches the caller unchanged.

use serde::Serialize;

use crate::clients::FunctionInvoker;
use crate::config::RouterConfig;
use crate::event::{DelegateContext, InboundRequest, InvocationContext};
use crate::http::response::{build_delegate_error_response, build_delegate_unconfigured_response};
use crate::http::Reply;
use crate::logger;

/// Payload sent to the delegate function
#[derive(Debug, Serialize)]
pub struct DelegatePayload<'a> {
    pub event: &'a InboundRequest,
    pub context: DelegateContext<'a>,
}

/// Invoke the configured delegate for this request
pub async fn invoke(
    invoker: &dyn FunctionInvoker,
    request: &InboundRequest,
    context: &InvocationContext,
    config: &RouterConfig,
) -> Reply {
    if config.delegate_function_id.is_empty() {
        logger::log_warning(&format!(
            "Special path {} requested but no delegate function is configured",
            request.path
        ));
        return build_delegate_unconfigured_response().into();
    }

    let payload = DelegatePayload {
        event: request,
        context: context.for_delegate(),
    };
    let payload = match serde_json::to_value(&payload) {
        Ok(value) => value,
        Err(e) => return build_delegate_error_response(&e.to_string()).into(),
    };

    match invoker.invoke(&config.delegate_function_id, &payload).await {
        Ok(response) => {
            let reply = Reply::Passthrough(response);
            if reply.status_code().is_none() {
                logger::log_warning(&format!(
                    "Delegate {} returned a payload without statusCode",
                    config.delegate_function_id
                ));
            }
            reply
        }
        Err(e) => {
            logger::log_error(&format!(
                "Invoking {} failed: {e}",
                config.delegate_function_id
            ));
            build_delegate_error_response(&e.to_string()).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::InvokeError;
    use crate::routing::testing::{context, router_config, RecordingInvoker};
    use serde_json::{json, Value};

    fn delegate_config() -> RouterConfig {
        let mut cfg = router_config();
        cfg.delegate_function_id = "arn:aws:lambda:us-east-1:123456789012:function:special".to_string();
        cfg
    }

    fn body_json(reply: &Reply) -> Value {
        match reply {
            Reply::Built(resp) => serde_json::from_str(&resp.body).unwrap(),
            Reply::Passthrough(_) => panic!("expected a built response"),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_delegate_makes_no_call() {
        let invoker = RecordingInvoker::returning(json!({ "statusCode": 200 }));
        let reply = invoke(&invoker, &InboundRequest::new("/special", "GET"), &context("abc"), &router_config()).await;
        assert_eq!(reply.status_code(), Some(503));
        assert!(body_json(&reply)["error"].as_str().unwrap().contains("not configured"));
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_payload_carries_event_and_reduced_context() {
        let invoker = RecordingInvoker::returning(json!({ "statusCode": 200, "body": "success" }));
        let mut request = InboundRequest::new("/special/test", "POST");
        request.extra.insert("custom".to_string(), json!("kept"));

        let reply = invoke(&invoker, &request, &context("req-9"), &delegate_config()).await;
        assert_eq!(reply, Reply::Passthrough(json!({ "statusCode": 200, "body": "success" })));

        let calls = invoker.calls();
        assert_eq!(calls.len(), 1);
        let (function_id, payload) = &calls[0];
        assert_eq!(function_id, "arn:aws:lambda:us-east-1:123456789012:function:special");
        assert_eq!(payload["event"]["path"], "/special/test");
        assert_eq!(payload["event"]["httpMethod"], "POST");
        assert_eq!(payload["event"]["custom"], "kept");
        assert_eq!(
            payload["event"],
            json!({ "path": "/special/test", "httpMethod": "POST", "custom": "kept" })
        );
        assert_eq!(
            payload["context"],
            json!({
                "function_name": "test-func",
                "function_version": "$LATEST",
                "request_id": "req-9",
                "memory_limit_in_mb": 128
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_payload_passes_through_unchanged() {
        let invoker = RecordingInvoker::returning(json!({ "unexpected": ["shape"] }));
        let reply = invoke(&invoker, &InboundRequest::new("/special", "GET"), &context("abc"), &delegate_config()).await;
        assert_eq!(reply, Reply::Passthrough(json!({ "unexpected": ["shape"] })));
        assert_eq!(reply.status_code(), None);
    }

    #[tokio::test]
    async fn test_invocation_failure_is_500() {
        let invoker = RecordingInvoker::failing(InvokeError::Transport("Lambda error".to_string()));
        let reply = invoke(&invoker, &InboundRequest::new("/special", "GET"), &context("abc"), &delegate_config()).await;
        assert_eq!(reply.status_code(), Some(500));
        let body = body_json(&reply);
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Error invoking special Lambda: "));
        assert!(message.contains("Lambda error"));
        assert_eq!(invoker.call_count(), 1);
    }
}
