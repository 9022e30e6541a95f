//! User-based collaborative filtering over a ratings snapshot.
//!
//! This crate provides:
//! - Pearson correlation between rating vectors
//! - NeighborFinder: each user's single most-correlated other user
//! - RecommendationGenerator: movies the neighbor rated and the user did not
//!
//! ## Architecture
//! A refresh processes one snapshot in two stages:
//! 1. NeighborFinder assigns every user a neighbor (or none)
//! 2. RecommendationGenerator derives lists from those neighbors
//!
//! Everything here is pure computation: no locks, no I/O. The caller owns
//! snapshotting and publishing.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{CorrelationMode, RecommendationPipeline};
//!
//! let pipeline = RecommendationPipeline::new(CorrelationMode::IncludeUnrated);
//! let table = pipeline.run(&store.snapshot(), &mapping, sequence);
//! println!("{:?}", table.recommendations(0));
//! ```

pub mod generator;
pub mod neighbors;
pub mod pearson;

pub use generator::{RecommendationGenerator, RecommendationTable, UserRecommendations};
pub use neighbors::{Neighbor, NeighborAssignment, NeighborFinder, select_neighbor};
pub use pearson::{CorrelationMode, pearson};

use catalog::CatalogMapping;
use ratings::RatingMatrix;

/// NeighborFinder followed by RecommendationGenerator on the same snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationPipeline {
    finder: NeighborFinder,
    generator: RecommendationGenerator,
}

impl RecommendationPipeline {
    pub fn new(mode: CorrelationMode) -> Self {
        Self {
            finder: NeighborFinder::new(mode),
            generator: RecommendationGenerator,
        }
    }

    pub fn mode(&self) -> CorrelationMode {
        self.finder.mode()
    }

    /// Compute the full table for `snapshot`
    pub fn run(
        &self,
        snapshot: &RatingMatrix,
        mapping: &CatalogMapping,
        sequence: u64,
    ) -> RecommendationTable {
        let assignment = self.finder.find(snapshot);
        self.generator
            .generate(&assignment, snapshot, mapping, sequence)
    }
}
