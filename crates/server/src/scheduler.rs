//! Periodic background refreshes.
//!
//! Two independent loops drive the engine:
//! - catalog refresh, first tick immediately at startup
//! - recommendation refresh, first tick one period after startup
//!
//! A tick that lands while the previous run of the same kind is still going
//! is skipped by the engine. Failures are logged and the loop keeps going.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::engine::{RecommendationEngine, RefreshOutcome};
use crate::error::EngineResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Catalog,
    Recommendations,
}

impl Job {
    fn name(self) -> &'static str {
        match self {
            Job::Catalog => "catalog",
            Job::Recommendations => "recommendations",
        }
    }

    async fn run(self, engine: &RecommendationEngine) -> EngineResult<RefreshOutcome> {
        match self {
            Job::Catalog => engine.refresh_catalog().await,
            Job::Recommendations => engine.refresh_recommendations().await,
        }
    }
}

/// Handle to the running refresh loops
pub struct Scheduler {
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn both loops on the current tokio runtime
    pub fn start(
        engine: Arc<RecommendationEngine>,
        recommendation_interval: Duration,
        catalog_interval: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let now = Instant::now();

        let catalog_ticker = ticker(now, catalog_interval);
        let recommendation_ticker = ticker(now + recommendation_interval, recommendation_interval);

        let tasks = vec![
            tokio::spawn(run_loop(
                Job::Catalog,
                Arc::clone(&engine),
                catalog_ticker,
                shutdown_rx.clone(),
            )),
            tokio::spawn(run_loop(
                Job::Recommendations,
                engine,
                recommendation_ticker,
                shutdown_rx,
            )),
        ];

        info!(
            recommendation_interval = ?recommendation_interval,
            catalog_interval = ?catalog_interval,
            "Scheduler started"
        );
        Self { shutdown_tx, tasks }
    }

    /// Stop both loops and wait for them to exit.
    ///
    /// A refresh in progress is dropped at its next await point. A catalog
    /// refresh dropped after its swap leaves the new generation with an
    /// empty recommendation table until the next refresh.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!(error = %e, "Scheduler task ended abnormally");
            }
        }
        info!("Scheduler stopped");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn ticker(start: Instant, period: Duration) -> Interval {
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

async fn run_loop(
    job: Job,
    engine: Arc<RecommendationEngine>,
    mut ticker: Interval,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        debug!(job = job.name(), "Refresh tick");
        tokio::select! {
            _ = shutdown.changed() => break,
            result = job.run(&engine) => match result {
                Ok(RefreshOutcome::Completed) => {}
                Ok(outcome) => debug!(job = job.name(), outcome = ?outcome, "Refresh did not publish"),
                Err(e) => warn!(job = job.name(), error = %e, "Refresh failed"),
            },
        }
    }
    debug!(job = job.name(), "Refresh loop exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use async_trait::async_trait;
    use catalog::{CatalogPage, CatalogProvider, StaticCatalog};

    /// Takes 200ms to answer each page
    struct SlowCatalog(StaticCatalog);

    #[async_trait]
    impl CatalogProvider for SlowCatalog {
        async fn fetch_page(&self, page: u32) -> catalog::Result<CatalogPage> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.0.fetch_page(page).await
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    fn engine_with(provider: Arc<dyn CatalogProvider>) -> Arc<RecommendationEngine> {
        let config = EngineConfig {
            num_users: 4,
            num_movies: 10,
            ..EngineConfig::default()
        };
        Arc::new(RecommendationEngine::from_config(&config, provider).unwrap())
    }

    fn build_engine() -> Arc<RecommendationEngine> {
        engine_with(Arc::new(StaticCatalog::from_ids(1..=10)))
    }

    #[tokio::test]
    async fn test_catalog_loads_at_startup() {
        let engine = build_engine();
        let scheduler = Scheduler::start(
            Arc::clone(&engine),
            Duration::from_secs(3600),
            Duration::from_secs(3600),
        );

        let deadline = Instant::now() + Duration::from_secs(5);
        while engine.catalog().generation() == 0 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        scheduler.shutdown().await;

        assert_eq!(engine.catalog().generation(), 1);
        assert_eq!(engine.catalog().len(), 10);
    }

    #[tokio::test]
    async fn test_recommendations_refresh_periodically() {
        let engine = build_engine();
        let scheduler = Scheduler::start(
            Arc::clone(&engine),
            Duration::from_millis(50),
            Duration::from_secs(3600),
        );

        tokio::time::sleep(Duration::from_millis(400)).await;
        scheduler.shutdown().await;

        // catalog load publishes once, every later tick publishes again
        let table = engine.recommendation_table();
        assert_eq!(table.catalog_generation, 1);
        assert!(table.sequence > 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_refreshes() {
        let engine = build_engine();
        let scheduler = Scheduler::start(
            Arc::clone(&engine),
            Duration::from_millis(20),
            Duration::from_secs(3600),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.shutdown().await;

        let sequence = engine.recommendation_table().sequence;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(engine.recommendation_table().sequence, sequence);
    }

    #[tokio::test]
    async fn test_shutdown_mid_catalog_load_leaves_state_untouched() {
        let engine = engine_with(Arc::new(SlowCatalog(StaticCatalog::from_ids(1..=10))));
        let scheduler = Scheduler::start(
            Arc::clone(&engine),
            Duration::from_secs(3600),
            Duration::from_secs(3600),
        );

        // Page 1 is still in flight
        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.shutdown().await;

        let stats = engine.stats();
        assert_eq!(stats.catalog_generation, 0);
        assert_eq!(stats.rated_cells, 0);
        assert_eq!(stats.recommendations, 0);

        // The cancelled refresh released its busy flag
        assert_eq!(
            engine.refresh_catalog().await.unwrap(),
            RefreshOutcome::Completed
        );
        assert_eq!(engine.catalog().generation(), 1);
    }
}
