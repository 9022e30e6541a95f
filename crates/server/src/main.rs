//! Recommendation engine service.
//!
//! Loads configuration from `RECS_*` environment variables, starts the
//! background refreshes and runs until Ctrl-C.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::{EngineConfig, RecommendationEngine, Scheduler, provider_from_config};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,catalog=debug")),
        )
        .init();

    info!("Starting ReelRecs recommendation engine");

    let config = EngineConfig::from_env()?;
    let provider = provider_from_config(&config)?;
    let engine = Arc::new(RecommendationEngine::from_config(&config, provider)?);

    let scheduler = Scheduler::start(
        Arc::clone(&engine),
        config.recommendation_interval(),
        config.catalog_interval(),
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    scheduler.shutdown().await;

    let stats = engine.stats();
    info!(
        generation = stats.catalog_generation,
        rated_cells = stats.rated_cells,
        recommendations = stats.recommendations,
        "Engine stopped"
    );
    Ok(())
}
