// Test doubles for the collaborator contracts

use async_trait::async_trait;
use hyper::body::Bytes;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::clients::{FunctionInvoker, InvokeError, ObjectStore, StorageError};
use crate::config::RouterConfig;
use crate::event::InvocationContext;

pub fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

pub fn router_config() -> RouterConfig {
    RouterConfig::load_from(Some(vars(&[]))).unwrap()
}

pub fn context(request_id: &str) -> InvocationContext {
    InvocationContext {
        request_id: request_id.to_string(),
        function_name: "test-func".to_string(),
        function_version: "$LATEST".to_string(),
        memory_limit_in_mb: 128,
    }
}

/// In-memory object store that records every lookup
#[derive(Default)]
pub struct MemoryStore {
    objects: HashMap<(String, String), Bytes>,
    failure: Mutex<Option<StorageError>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl MemoryStore {
    pub fn with_object(bucket: &str, key: &str, content: impl Into<Bytes>) -> Self {
        let mut store = Self::default();
        store
            .objects
            .insert((bucket.to_string(), key.to_string()), content.into());
        store
    }

    /// Store whose next lookup fails with `error`
    pub fn failing(error: StorageError) -> Self {
        let store = Self::default();
        *store.failure.lock().unwrap() = Some(error);
        store
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        self.requests
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));
        if let Some(error) = self.failure.lock().unwrap().take() {
            return Err(error);
        }
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}

/// Invoker returning a canned payload (or failure) and recording each call
pub struct RecordingInvoker {
    response: Mutex<Option<Result<Value, InvokeError>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl RecordingInvoker {
    pub fn returning(payload: Value) -> Self {
        Self {
            response: Mutex::new(Some(Ok(payload))),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: InvokeError) -> Self {
        Self {
            response: Mutex::new(Some(Err(error))),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FunctionInvoker for RecordingInvoker {
    async fn invoke(&self, function_id: &str, payload: &Value) -> Result<Value, InvokeError> {
        self.calls
            .lock()
            .unwrap()
            .push((function_id.to_string(), payload.clone()));
        self.response
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(InvokeError::Unavailable))
    }
}
