//! Turns a neighbor assignment into per-user recommendation lists.
//!
//! A user is recommended every movie their neighbor rated and they did not,
//! in ascending column order. The whole result is one
//! [`RecommendationTable`], published as a unit.

use crate::neighbors::{Neighbor, NeighborAssignment};
use catalog::CatalogMapping;
use ratings::{MovieId, RatingMatrix, UNRATED, UserId};
use rayon::prelude::*;
use tracing::{debug, instrument};

/// One user's neighbor and the movies derived from it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRecommendations {
    pub neighbor: Option<Neighbor>,
    pub movies: Vec<MovieId>,
}

/// Recommendations for every user, computed from one snapshot
///
/// Neighbor and list for a user always come from the same run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationTable {
    /// Catalog generation the movie ids belong to
    pub catalog_generation: u64,
    /// Sequence number of the snapshot the table was computed from
    pub sequence: u64,
    entries: Vec<UserRecommendations>,
}

impl RecommendationTable {
    /// A table where nobody has a neighbor or recommendations yet
    pub fn empty(catalog_generation: u64, num_users: usize) -> Self {
        Self {
            catalog_generation,
            sequence: 0,
            entries: vec![UserRecommendations::default(); num_users],
        }
    }

    pub fn get(&self, user_id: UserId) -> Option<&UserRecommendations> {
        self.entries.get(user_id)
    }

    /// Recommended movie ids for a user, if the user exists
    pub fn recommendations(&self, user_id: UserId) -> Option<&[MovieId]> {
        self.entries.get(user_id).map(|e| e.movies.as_slice())
    }

    pub fn neighbor(&self, user_id: UserId) -> Option<Neighbor> {
        self.entries.get(user_id).and_then(|e| e.neighbor)
    }

    pub fn num_users(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all users' list lengths
    pub fn total_recommendations(&self) -> usize {
        self.entries.iter().map(|e| e.movies.len()).sum()
    }
}

/// Derives recommendation lists from neighbors
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationGenerator;

impl RecommendationGenerator {
    /// Build the table for every user.
    ///
    /// `snapshot` must be the snapshot `assignment` was computed from, and
    /// `mapping` the catalog generation that snapshot belongs to.
    #[instrument(skip_all, fields(generation = mapping.generation(), sequence = sequence))]
    pub fn generate(
        &self,
        assignment: &NeighborAssignment,
        snapshot: &RatingMatrix,
        mapping: &CatalogMapping,
        sequence: u64,
    ) -> RecommendationTable {
        let entries: Vec<UserRecommendations> = (0..snapshot.num_users())
            .into_par_iter()
            .map(|user_id| {
                let neighbor = assignment.get(user_id);
                let movies = neighbor
                    .map(|n| Self::movies_for(snapshot, mapping, user_id, n.user_id))
                    .unwrap_or_default();
                UserRecommendations { neighbor, movies }
            })
            .collect();

        let table = RecommendationTable {
            catalog_generation: mapping.generation(),
            sequence,
            entries,
        };
        debug!(
            total = table.total_recommendations(),
            "Generated recommendation table"
        );
        table
    }

    /// Movies `neighbor_id` rated that `user_id` did not, ascending by column
    pub fn movies_for(
        snapshot: &RatingMatrix,
        mapping: &CatalogMapping,
        user_id: UserId,
        neighbor_id: UserId,
    ) -> Vec<MovieId> {
        let own = snapshot.row(user_id);
        let theirs = snapshot.row(neighbor_id);

        own.iter()
            .zip(theirs)
            .enumerate()
            .filter(|&(_, (&mine, &other))| mine == UNRATED && other != UNRATED)
            // Columns past the catalog have no movie to recommend
            .filter_map(|(index, _)| mapping.to_id(index).ok())
            .collect()
    }
}
