//! Collaborator clients
//!
//! Contracts for the two external services the router talks to, with their
//! concrete implementations. Clients are built once at startup and injected
//! into the router.

mod invoke;
mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use invoke::{DisabledInvoker, FunctionInvoker, HttpFunctionInvoker};
#[cfg(test)]
pub use invoke::InvokeError;
pub use storage::{FsObjectStore, HttpObjectStore, ObjectStore, StorageError};

use std::sync::Arc;

use crate::config::BackendsConfig;

/// Storage endpoint used when neither a directory nor an endpoint is configured
pub const DEFAULT_STORAGE_ENDPOINT: &str = "http://127.0.0.1:9000";

/// Build the storage client selected by the backend settings
pub fn object_store_from(backends: &BackendsConfig) -> Arc<dyn ObjectStore> {
    if let Some(dir) = &backends.storage_dir {
        return Arc::new(FsObjectStore::new(dir));
    }
    let endpoint = backends
        .storage_endpoint
        .as_deref()
        .unwrap_or(DEFAULT_STORAGE_ENDPOINT);
    Arc::new(HttpObjectStore::new(endpoint))
}

/// Build the invoke client selected by the backend settings
pub fn invoker_from(backends: &BackendsConfig) -> Arc<dyn FunctionInvoker> {
    match &backends.invoke_endpoint {
        Some(endpoint) => Arc::new(HttpFunctionInvoker::new(endpoint)),
        None => Arc::new(DisabledInvoker),
    }
}
