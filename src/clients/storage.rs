// Object storage client module
// Read-only get-by-key access to the bucket holding the maintenance template

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Characters left as-is in a URI path segment (RFC 3986 unreserved)
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Storage read failures. None of them are retried.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object {bucket}/{key} does not exist")]
    NotFound { bucket: String, key: String },

    #[error("storage returned HTTP {0}")]
    Status(u16),

    #[error("storage transport error: {0}")]
    Transport(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid object key: {0}")]
    InvalidKey(String),
}

/// Storage read contract
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full content of `key` in `bucket`
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError>;
}

/// Path-style object store reachable over plain HTTP: `GET {endpoint}/{bucket}/{key}`
pub struct HttpObjectStore {
    client: Client<HttpConnector, Full<Bytes>>,
    endpoint: String,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Each bucket and key segment is percent-encoded; `/` in the key is kept
    /// as the segment separator
    fn object_uri(&self, bucket: &str, key: &str) -> Result<Uri, StorageError> {
        let key_path = key
            .trim_start_matches('/')
            .split('/')
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");

        format!(
            "{}/{}/{key_path}",
            self.endpoint,
            utf8_percent_encode(bucket, PATH_SEGMENT)
        )
        .parse()
            .map_err(|e| StorageError::InvalidKey(format!("{bucket}/{key}: {e}")))
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let req = Request::get(self.object_uri(bucket, key)?)
            .body(Full::new(Bytes::new()))
            .map_err(|e| StorageError::InvalidKey(e.to_string()))?;

        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        if !status.is_success() {
            return Err(StorageError::Status(status.as_u16()));
        }

        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        Ok(body.to_bytes())
    }
}

/// Object store backed by a local directory laid out as `{root}/{bucket}/{key}`
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve an object path, refusing anything that could leave the root
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(bucket).join(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || bucket.is_empty() || key.is_empty() {
            return Err(StorageError::InvalidKey(format!("{bucket}/{key}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
