//! stuff-server
//!
//! A small HTTP server that mounts one route under a path prefix and
//! answers every request there with whatever its data provider returns.
//! Requests go through a single-origin CORS stage and a JSON body parser
//! first; everything outside the mount gets a 404.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod middleware;
pub mod provider;
pub mod server;

use std::sync::Arc;

pub use error::{Result, ServerError};

/// Bind the configured address and serve until SIGINT/SIGTERM
pub async fn run(cfg: config::Config) -> Result<()> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)
        .map_err(|source| ServerError::Bind { addr, source })?;
    let bound = listener.local_addr()?;

    let state = Arc::new(config::AppState::from_config(cfg)?);
    logger::log_server_start(&bound, &state.config);

    server::serve(listener, state, server::shutdown_signal()).await;
    Ok(())
}
