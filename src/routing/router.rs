//! Request routing dispatch module
//!
//! Entry point of the routing core. Branches are checked in a fixed order:
//!
//! 1. special path prefix → delegate (even during maintenance)
//! 2. maintenance mode → maintenance page
//! 3. otherwise → operational response
//!
//! Configuration is read from the environment on every call. Any failure is
//! converted into a generic 500 here and never reaches the caller as an error.

use std::sync::Arc;
use thiserror::Error;

use super::{delegate, maintenance};
use crate::clients::{FunctionInvoker, ObjectStore};
use crate::config::RouterConfig;
use crate::event::{InboundRequest, InvocationContext};
use crate::http::response::{build_internal_error_response, build_operational_response};
use crate::http::Reply;
use crate::logger;

/// Failures caught by the last-resort handler
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Routing core with its collaborator clients
pub struct Router {
    store: Arc<dyn ObjectStore>,
    invoker: Arc<dyn FunctionInvoker>,
    /// Variables to read instead of the process environment
    environment: Option<config::Map<String, String>>,
}

impl Router {
    pub fn new(store: Arc<dyn ObjectStore>, invoker: Arc<dyn FunctionInvoker>) -> Self {
        Self {
            store,
            invoker,
            environment: None,
        }
    }

    /// Read routing variables from `vars` instead of the process environment
    #[cfg(test)]
    #[must_use]
    pub fn with_environment(mut self, vars: config::Map<String, String>) -> Self {
        self.environment = Some(vars);
        self
    }

    /// Route one request. Always produces a reply.
    pub async fn route(&self, request: &InboundRequest, context: &InvocationContext) -> Reply {
        match self.try_route(request, context).await {
            Ok(reply) => reply,
            Err(e) => {
                logger::log_error(&format!(
                    "Request {} failed: {e}",
                    context.request_id
                ));
                build_internal_error_response(&e.to_string()).into()
            }
        }
    }

    async fn try_route(
        &self,
        request: &InboundRequest,
        context: &InvocationContext,
    ) -> Result<Reply, RouterError> {
        let config = RouterConfig::load_from(self.environment.clone())?;

        if is_special_path(&request.path, &config) {
            return Ok(delegate::invoke(self.invoker.as_ref(), request, context, &config).await);
        }

        if config.maintenance_mode {
            return Ok(maintenance::respond(self.store.as_ref(), request, context, &config)
                .await
                .into());
        }

        Ok(build_operational_response(&request.path).into())
    }
}

/// Exact, case-sensitive prefix match with no slash normalization
pub fn is_special_path(path: &str, config: &RouterConfig) -> bool {
    path.starts_with(&config.special_path_prefix)
}
