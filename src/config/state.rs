// Application state module
// Immutable per-process state shared by every connection

use std::sync::Arc;

use super::types::Config;
use crate::error::ServerError;
use crate::handler::MountPrefix;
use crate::middleware::CorsPolicy;
use crate::provider::{self, StuffProvider};

/// Application state
pub struct AppState {
    pub config: Config,
    pub provider: Arc<dyn StuffProvider>,
    pub cors: CorsPolicy,
    pub mount: MountPrefix,
}

impl AppState {
    /// Create `AppState` with the provider named by `config.stuff`
    pub fn from_config(config: Config) -> Result<Self, ServerError> {
        let provider = provider::from_source(&config.stuff);
        Self::new(config, provider)
    }

    /// Create `AppState` around an explicit provider
    pub fn new(config: Config, provider: Arc<dyn StuffProvider>) -> Result<Self, ServerError> {
        let cors = CorsPolicy::new(&config.cors)?;
        let mount = MountPrefix::new(&config.api.mount_path)?;

        Ok(Self {
            config,
            provider,
            cors,
            mount,
        })
    }
}
