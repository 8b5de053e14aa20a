// Configuration types module
// Defines process settings and the per-invocation router snapshot

use serde::Deserialize;

/// Process settings, loaded once at startup
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub function: FunctionConfig,
    #[serde(default)]
    pub backends: BackendsConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Identity reported in the invocation context of every request
#[derive(Debug, Deserialize, Clone)]
pub struct FunctionConfig {
    pub name: String,
    pub version: String,
    pub memory_limit_mb: u32,
}

/// Collaborator endpoints
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BackendsConfig {
    /// Base URL of a path-style object store
    #[serde(default)]
    pub storage_endpoint: Option<String>,
    /// Local directory laid out as `{dir}/{bucket}/{key}`; wins over `storage_endpoint`
    #[serde(default)]
    pub storage_dir: Option<String>,
    /// Base URL of the function invoke API
    #[serde(default)]
    pub invoke_endpoint: Option<String>,
}

/// Routing configuration snapshot, rebuilt from the environment on every invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub maintenance_mode: bool,
    pub storage_bucket: String,
    pub storage_key: String,
    pub special_path_prefix: String,
    /// Empty means the delegate is disabled
    pub delegate_function_id: String,
}

/// Raw environment values before interpretation
#[derive(Debug, Deserialize)]
pub(super) struct RawRouterEnv {
    pub maintenance_mode: String,
    pub s3_bucket: String,
    pub s3_key: String,
    pub special_url_path: String,
    pub special_lambda_arn: String,
}

impl From<RawRouterEnv> for RouterConfig {
    fn from(raw: RawRouterEnv) -> Self {
        Self {
            maintenance_mode: raw.maintenance_mode.eq_ignore_ascii_case("true"),
            storage_bucket: raw.s3_bucket,
            storage_key: raw.s3_key,
            special_path_prefix: raw.special_url_path,
            delegate_function_id: raw.special_lambda_arn,
        }
    }
}
