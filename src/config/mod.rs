// Configuration module entry point
// Process settings, the per-invocation router snapshot, and shared state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{BackendsConfig, FunctionConfig, RouterConfig, Settings};

use types::RawRouterEnv;

/// Default settings file name (without extension)
pub const DEFAULT_SETTINGS_PATH: &str = "router";

impl Settings {
    /// Load settings from the given file path (without extension) plus
    /// `ROUTER__SECTION__KEY` environment overrides
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("ROUTER").separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("function.name", "maintenance-router")?
            .set_default("function.version", "$LATEST")?
            .set_default("function.memory_limit_mb", 128)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

impl RouterConfig {
    /// Read the routing snapshot from an explicit variable map, or from the
    /// process environment when `vars` is `None`
    pub fn load_from(vars: Option<config::Map<String, String>>) -> Result<Self, config::ConfigError> {
        let raw: RawRouterEnv = config::Config::builder()
            .add_source(config::Environment::default().source(vars))
            .set_default("maintenance_mode", "true")?
            .set_default("s3_bucket", "maintenance-pages")?
            .set_default("s3_key", "maintenance.html")?
            .set_default("special_url_path", "/special")?
            .set_default("special_lambda_arn", "")?
            .build()?
            .try_deserialize()?;

        Ok(raw.into())
    }
}
