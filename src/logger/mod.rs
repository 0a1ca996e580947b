//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};

use crate::config::{Config, LoggingConfig};
use crate::error::ServerError;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> Result<(), ServerError> {
    writer::init(config)
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Listening on port {}", addr.port());
    tracing::info!(
        address = %addr,
        mount = %config.api.mount_path,
        allowed_origin = %config.cors.allowed_origin,
        "Server ready"
    );
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.log_file {
        tracing::info!("Log file: {path}");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log parsed JSON body shape without its contents
pub fn log_parsed_body(value: &serde_json::Value) {
    let kind = if value.is_array() { "array" } else { "object" };
    tracing::debug!("[Body] Parsed JSON {kind}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &AccessLogFormat) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_shutdown_started() {
    tracing::info!("[Shutdown] Signal received, no longer accepting connections");
}

pub fn log_shutdown_complete(drained: bool) {
    if drained {
        tracing::info!("[Shutdown] All connections closed");
    } else {
        tracing::warn!("[Shutdown] Timed out waiting for connections to close");
    }
}
