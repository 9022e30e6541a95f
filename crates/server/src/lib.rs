//! Server crate for the ReelRecs recommendation engine.
//!
//! Owns the shared state and exposes it through [`RecommendationEngine`],
//! the facade a transport layer calls into. [`Scheduler`] keeps the catalog
//! and the published recommendations fresh in the background.

pub mod config;
pub mod engine;
pub mod error;
pub mod scheduler;

pub use config::EngineConfig;
pub use engine::{EngineStats, RecommendationEngine, RefreshOutcome};
pub use error::{EngineError, EngineResult};
pub use scheduler::Scheduler;

use std::sync::Arc;

use anyhow::{Context, Result};
use catalog::{CatalogProvider, StaticCatalog, TmdbProvider};
use tracing::info;

/// Pick the catalog source the configuration asks for.
///
/// A local catalog file wins over TMDB.
pub fn provider_from_config(config: &EngineConfig) -> Result<Arc<dyn CatalogProvider>> {
    if let Some(path) = &config.catalog_file {
        let catalog = StaticCatalog::load_from_file(path)
            .with_context(|| format!("Failed to load catalog file {}", path.display()))?;
        info!(path = %path.display(), movies = catalog.len(), "Using static catalog");
        return Ok(Arc::new(catalog));
    }

    let api_key = config
        .tmdb_api_key
        .clone()
        .context("Set RECS_TMDB_API_KEY or RECS_CATALOG_FILE to choose a catalog source")?;
    let provider = TmdbProvider::new(config.tmdb_api_url.clone(), api_key)?;
    info!(url = %config.tmdb_api_url, "Using TMDB catalog");
    Ok(Arc::new(provider))
}
