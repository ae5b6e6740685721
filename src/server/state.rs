//! Server shared state
//!
//! Holds configuration and the artifact store for the HTTP server.

use crate::config::Config;
use crate::error::Result;
use crate::format::plot::PlotOptions;
use crate::store::{ArtifactStore, FsArtifactStore};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Arc<RwLock<Config>>,

    /// Where generated artifacts are persisted
    pub store: Arc<dyn ArtifactStore>,

    started: Instant,
}

impl AppState {
    /// Create state backed by the configured artifact directory
    pub fn new(config: Config) -> Result<Self> {
        let store = FsArtifactStore::new(config.storage_dir()?)?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Create state with an explicit store
    pub fn with_store(config: Config, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            started: Instant::now(),
        }
    }

    /// Plot options from the current configuration
    pub async fn plot_options(&self) -> PlotOptions {
        let config = self.config.read().await;
        PlotOptions {
            size: config.plot.size,
            show_route: config.plot.show_route,
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
