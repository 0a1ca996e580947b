// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub cors: CorsConfig,
    pub api: ApiConfig,
    /// Where the mounted route gets its payload from
    #[serde(default)]
    pub stuff: StuffSource,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG` when set
    pub level: String,
    /// Output format for the diagnostic log
    #[serde(default)]
    pub format: LogFormat,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Log file path (optional, stdout if not set)
    #[serde(default)]
    pub log_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Connection handling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Seconds to wait for in-flight connections on shutdown
    pub shutdown_timeout: u64,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Largest JSON body the body parser accepts, in bytes
    pub max_body_size: u64,
}

/// Cross-origin configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// The single origin allowed to read responses
    pub allowed_origin: String,
    pub allow_credentials: bool,
    /// Preflight cache lifetime in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

/// Mounted route configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub mount_path: String,
}

/// Payload source for the mounted route
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StuffSource {
    /// Fixed JSON value
    Inline {
        #[serde(default = "default_inline_value")]
        value: serde_json::Value,
    },
    /// File re-read on every request
    File { path: String },
}

fn default_inline_value() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Default for StuffSource {
    fn default() -> Self {
        Self::Inline {
            value: default_inline_value(),
        }
    }
}
