// One-shot event handling
// Routes a single load balancer event given as JSON text and returns the reply

use crate::config::FunctionConfig;
use crate::event::{InboundRequest, InvocationContext};
use crate::http::response::build_internal_error_response;
use crate::http::Reply;
use crate::logger;
use crate::routing::Router;

/// Route one raw event. An event that cannot be read as a request gets the
/// generic 500 reply, like any other routing failure.
pub async fn handle_event(router: &Router, function: &FunctionConfig, raw: &str) -> Reply {
    let context = InvocationContext::for_function(function);

    match serde_json::from_str::<InboundRequest>(raw) {
        Ok(request) => router.route(&request, &context).await,
        Err(e) => {
            logger::log_error(&format!(
                "Request {} has an unreadable event: {e}",
                context.request_id
            ));
            build_internal_error_response(&e.to_string()).into()
        }
    }
}
