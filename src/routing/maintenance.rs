//! Maintenance page responder
//!
//! Fetches the page template from object storage and renders it. Any failure
//! along the way degrades to the built-in fallback page; the caller always
//! gets a 503.

use chrono::Utc;
use thiserror::Error;

use super::template::{self, FALLBACK_HTML};
use crate::clients::{ObjectStore, StorageError};
use crate::config::RouterConfig;
use crate::event::{InboundRequest, InvocationContext};
use crate::http::response::{build_maintenance_response, OutboundResponse};
use crate::logger;

/// Reasons the stored template could not be used
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("template is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Build the maintenance response for this request
pub async fn respond(
    store: &dyn ObjectStore,
    request: &InboundRequest,
    context: &InvocationContext,
    config: &RouterConfig,
) -> OutboundResponse {
    match fetch_template(store, config).await {
        Ok(html) => build_maintenance_response(template::render(&html, request, context, Utc::now())),
        Err(e) => {
            logger::log_warning(&format!(
                "Maintenance template {}/{} unavailable, serving fallback: {e}",
                config.storage_bucket, config.storage_key
            ));
            fallback_response()
        }
    }
}

/// Built-in maintenance page with no external dependency
pub fn fallback_response() -> OutboundResponse {
    build_maintenance_response(FALLBACK_HTML.to_string())
}

async fn fetch_template(store: &dyn ObjectStore, config: &RouterConfig) -> Result<String, TemplateError> {
    let bytes = store.get(&config.storage_bucket, &config.storage_key).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}
