pub mod agent_engine;
pub mod config;
pub mod errors;
pub mod executor;
pub mod llm;
pub mod perception;

pub use agent_engine::{ComputerStreamer, SseEvent};
pub use errors::{SurfError, SurfResult};
pub use executor::{Action, CoordinateScaler, Desktop, ResolutionScaler};

use std::sync::Arc;

use crate::llm::registry::ProviderRegistry;

/// Installs the fmt subscriber, filtered by `RUST_LOG` (default `info`).
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// Loads `.env` and `config.toml`, then builds a streamer bound to `desktop`.
///
/// A missing or invalid config falls back to the built-in defaults.
pub fn build_streamer(
    desktop: Arc<dyn Desktop>,
    scaler: Arc<dyn CoordinateScaler>,
) -> SurfResult<ComputerStreamer> {
    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let cfg = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load config; using built-in defaults");
            config::AppConfig::default()
        }
    };
    let registry = ProviderRegistry::from_config(&cfg);
    tracing::info!(providers = ?registry.list_names(), "LLM registry ready");
    ComputerStreamer::from_config(&cfg, &registry, desktop, scaler)
}
