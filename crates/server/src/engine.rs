//! # Recommendation Engine
//!
//! The service facade the transport layer calls into, and the owner of all
//! shared state:
//! - `RatingStore`: the rating matrix, serialized internally
//! - the current `CatalogMapping` generation
//! - the published `RecommendationTable` (neighbors and lists together)
//!
//! Catalog and table are swapped as whole `Arc`s under one short-lived lock.
//! Work that takes time (provider I/O, correlation) runs with no lock held.
//!
//! Lock order is always `state` → store, never the reverse.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use catalog::{CatalogMapper, CatalogMapping, CatalogProvider};
use pipeline::{Neighbor, RecommendationPipeline, RecommendationTable};
use ratings::{MAX_RATING, MovieId, RatingDistribution, RatingStore, RatingValue, UNRATED, UserId};
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// What happened to a refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The new generation was published
    Completed,
    /// A refresh of the same kind was already running
    Skipped,
    /// The result was computed against an outdated catalog and thrown away
    Discarded,
}

/// Point-in-time engine counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    pub users: usize,
    pub movies: usize,
    pub mapped_movies: usize,
    pub rated_cells: usize,
    pub recommendations: usize,
    pub catalog_generation: u64,
}

/// Generations currently visible to readers
struct PublishedState {
    catalog: Arc<CatalogMapping>,
    table: Arc<RecommendationTable>,
}

/// Holds a busy flag for the lifetime of one refresh
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Facade over the rating store, catalog and published recommendations
pub struct RecommendationEngine {
    store: RatingStore,
    mapper: CatalogMapper,
    pipeline: RecommendationPipeline,
    state: RwLock<PublishedState>,
    next_sequence: AtomicU64,
    catalog_busy: AtomicBool,
    recommendations_busy: AtomicBool,
}

impl RecommendationEngine {
    /// Create an engine with an empty catalog (generation 0).
    ///
    /// Nothing can be rated until the first catalog refresh succeeds.
    pub fn new(store: RatingStore, mapper: CatalogMapper, pipeline: RecommendationPipeline) -> Self {
        let table = RecommendationTable::empty(0, store.num_users());
        Self {
            store,
            mapper,
            pipeline,
            state: RwLock::new(PublishedState {
                catalog: Arc::new(CatalogMapping::empty()),
                table: Arc::new(table),
            }),
            next_sequence: AtomicU64::new(1),
            catalog_busy: AtomicBool::new(false),
            recommendations_busy: AtomicBool::new(false),
        }
    }

    /// Build every component from configuration
    pub fn from_config(
        config: &EngineConfig,
        provider: Arc<dyn CatalogProvider>,
    ) -> EngineResult<Self> {
        let distribution = RatingDistribution::new(config.unrated_weight)?;
        let store = RatingStore::new(config.num_users, config.num_movies, distribution);
        let mapper =
            CatalogMapper::new(provider, config.num_movies).with_max_pages(config.catalog_max_pages);
        let pipeline = RecommendationPipeline::new(config.correlation_mode());

        info!(
            users = config.num_users,
            movies = config.num_movies,
            provider = mapper.provider_name(),
            mode = ?pipeline.mode(),
            "Recommendation engine configured"
        );
        Ok(Self::new(store, mapper, pipeline))
    }

    // =========================================================================
    // Request-path operations
    // =========================================================================

    /// Record a 1-10 rating for a movie in the current catalog
    pub fn submit_rating(&self, user_id: UserId, movie_id: MovieId, rating: i64) -> EngineResult<()> {
        if !(1..=MAX_RATING as i64).contains(&rating) {
            return Err(EngineError::OutOfRange(format!(
                "rating {} (expected 1..={})",
                rating, MAX_RATING
            )));
        }
        self.write_cell(user_id, movie_id, rating as RatingValue)
    }

    /// Remove a user's rating for a movie
    pub fn clear_rating(&self, user_id: UserId, movie_id: MovieId) -> EngineResult<()> {
        self.write_cell(user_id, movie_id, UNRATED)
    }

    fn write_cell(&self, user_id: UserId, movie_id: MovieId, value: RatingValue) -> EngineResult<()> {
        self.check_user(user_id)?;

        // Hold the state lock so a catalog swap cannot slip between the
        // id lookup and the write
        let state = self.read_state();
        let movie_index = state.catalog.to_index(movie_id)?;
        self.store.set_rating(user_id, movie_index, value)?;
        Ok(())
    }

    /// The user's rated movies as `(movie id, rating)` in column order
    pub fn get_user_ratings(&self, user_id: UserId) -> EngineResult<Vec<(MovieId, RatingValue)>> {
        let state = self.read_state();
        let row = self.store.get_user_ratings(user_id)?;

        Ok(row
            .into_iter()
            .enumerate()
            .filter(|&(_, value)| value != UNRATED)
            .filter_map(|(index, value)| state.catalog.to_id(index).ok().map(|id| (id, value)))
            .collect())
    }

    /// Published recommendations for a user
    pub fn get_recommendations(&self, user_id: UserId) -> EngineResult<Vec<MovieId>> {
        self.check_user(user_id)?;
        let table = self.recommendation_table();
        Ok(table
            .recommendations(user_id)
            .map(<[MovieId]>::to_vec)
            .unwrap_or_default())
    }

    /// Published neighbor for a user; `None` when undefined or not yet computed
    pub fn get_neighbor(&self, user_id: UserId) -> EngineResult<Option<Neighbor>> {
        self.check_user(user_id)?;
        Ok(self.recommendation_table().neighbor(user_id))
    }

    /// Reload the catalog now and wait for the result
    pub async fn force_catalog_refresh(&self) -> EngineResult<RefreshOutcome> {
        info!("Forced catalog refresh requested");
        self.refresh_catalog().await
    }

    pub fn stats(&self) -> EngineStats {
        let (catalog, table) = {
            let state = self.read_state();
            (Arc::clone(&state.catalog), Arc::clone(&state.table))
        };

        EngineStats {
            users: self.store.num_users(),
            movies: self.store.num_movies(),
            mapped_movies: catalog.len(),
            rated_cells: self.store.snapshot().rated_count(),
            recommendations: table.total_recommendations(),
            catalog_generation: catalog.generation(),
        }
    }

    /// Current catalog generation
    pub fn catalog(&self) -> Arc<CatalogMapping> {
        Arc::clone(&self.read_state().catalog)
    }

    /// Current published recommendation table
    pub fn recommendation_table(&self) -> Arc<RecommendationTable> {
        Arc::clone(&self.read_state().table)
    }

    pub fn num_users(&self) -> usize {
        self.store.num_users()
    }

    fn check_user(&self, user_id: UserId) -> EngineResult<()> {
        if user_id >= self.store.num_users() {
            return Err(EngineError::OutOfRange(format!(
                "user_id {} (expected 0..{})",
                user_id,
                self.store.num_users()
            )));
        }
        Ok(())
    }

    // =========================================================================
    // Background refreshes
    // =========================================================================

    /// Recompute neighbors and recommendations from a fresh snapshot.
    ///
    /// Returns `Skipped` if another recommendation refresh is running.
    pub async fn refresh_recommendations(&self) -> EngineResult<RefreshOutcome> {
        let Some(_guard) = BusyGuard::try_acquire(&self.recommendations_busy) else {
            debug!("Recommendation refresh already running, skipping");
            return Ok(RefreshOutcome::Skipped);
        };
        self.compute_and_publish().await
    }

    /// Rebuild the catalog mapping, reset the matrix and recompute.
    ///
    /// Provider I/O happens with no lock held. On failure the previous
    /// catalog, matrix and recommendations stay exactly as they were.
    #[instrument(skip(self), fields(provider = self.mapper.provider_name()))]
    pub async fn refresh_catalog(&self) -> EngineResult<RefreshOutcome> {
        let Some(_guard) = BusyGuard::try_acquire(&self.catalog_busy) else {
            debug!("Catalog refresh already running, skipping");
            return Ok(RefreshOutcome::Skipped);
        };

        let next_generation = self.catalog().generation() + 1;
        let mapping = match self.mapper.fetch_mapping(next_generation).await {
            Ok(mapping) => mapping,
            Err(e) => {
                warn!(error = %e, "Catalog refresh failed, keeping previous generation");
                return Err(EngineError::CatalogUnavailable(e.to_string()));
            }
        };

        // Swap, reset and clear in one critical section with no await
        {
            let mut state = self.write_state();
            self.store.reset(mapping.len());
            state.table = Arc::new(RecommendationTable::empty(
                mapping.generation(),
                self.store.num_users(),
            ));
            info!(
                generation = mapping.generation(),
                movies = mapping.len(),
                "Installed new catalog generation"
            );
            state.catalog = Arc::new(mapping);
        }

        // Old neighbors and lists referred to other movies
        self.compute_and_publish().await?;
        Ok(RefreshOutcome::Completed)
    }

    async fn compute_and_publish(&self) -> EngineResult<RefreshOutcome> {
        let start = Instant::now();

        let (catalog, snapshot, sequence) = {
            let state = self.read_state();
            let catalog = Arc::clone(&state.catalog);
            let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
            (catalog, self.store.snapshot(), sequence)
        };

        let pipeline = self.pipeline;
        let table = tokio::task::spawn_blocking({
            let catalog = Arc::clone(&catalog);
            move || pipeline.run(&snapshot, &catalog, sequence)
        })
        .await
        .map_err(|e| EngineError::Internal(format!("recommendation task failed: {}", e)))?;

        let outcome = self.publish(table);
        info!(
            generation = catalog.generation(),
            sequence,
            outcome = ?outcome,
            elapsed = ?start.elapsed(),
            "Recommendation refresh finished"
        );
        Ok(outcome)
    }

    /// Install `table` if it belongs to the current catalog and is newer
    /// than what readers see now
    fn publish(&self, table: RecommendationTable) -> RefreshOutcome {
        let mut state = self.write_state();

        if table.catalog_generation != state.catalog.generation() {
            debug!(
                computed = table.catalog_generation,
                current = state.catalog.generation(),
                "Discarding recommendations for an outdated catalog"
            );
            return RefreshOutcome::Discarded;
        }
        if table.sequence <= state.table.sequence {
            debug!(
                computed = table.sequence,
                published = state.table.sequence,
                "Discarding recommendations older than the published table"
            );
            return RefreshOutcome::Discarded;
        }

        state.table = Arc::new(table);
        RefreshOutcome::Completed
    }

    // Critical sections never leave state half-written, so a poisoned lock
    // is still safe to use.
    fn read_state(&self) -> RwLockReadGuard<'_, PublishedState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, PublishedState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
