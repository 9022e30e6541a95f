//! Nearest-neighbor search over a ratings snapshot.
//!
//! ## Algorithm
//! For every user `i`, scan every other user `j` left to right and compute
//! the Pearson coefficient of their rows. The neighbor is the first `j`
//! achieving the strict maximum; a later equal coefficient never replaces
//! it. Users whose every candidate is undefined get no neighbor.
//!
//! Each user's scan is independent, so rows are processed in parallel with
//! Rayon.

use crate::pearson::{CorrelationMode, pearson};
use ratings::{RatingMatrix, UserId};
use rayon::prelude::*;
use tracing::{debug, instrument};

/// The single most-correlated other user
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub user_id: UserId,
    pub coefficient: f64,
}

/// Per-user neighbor, indexed by `UserId`; `None` marks an undefined neighbor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborAssignment {
    neighbors: Vec<Option<Neighbor>>,
}

impl NeighborAssignment {
    pub fn new(neighbors: Vec<Option<Neighbor>>) -> Self {
        Self { neighbors }
    }

    pub fn get(&self, user_id: UserId) -> Option<Neighbor> {
        self.neighbors.get(user_id).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<Neighbor>> + '_ {
        self.neighbors.iter().copied()
    }

    /// Users with a defined neighbor
    pub fn assigned_count(&self) -> usize {
        self.neighbors.iter().filter(|n| n.is_some()).count()
    }
}

/// Pick the first strict maximum among defined coefficients.
///
/// Candidates are visited in the given order; `None` coefficients are
/// skipped.
pub fn select_neighbor<I>(candidates: I) -> Option<Neighbor>
where
    I: IntoIterator<Item = (UserId, Option<f64>)>,
{
    let mut best: Option<Neighbor> = None;

    for (user_id, coefficient) in candidates {
        let Some(coefficient) = coefficient else {
            continue;
        };
        let improves = match best {
            Some(current) => coefficient > current.coefficient,
            None => true,
        };
        if improves {
            best = Some(Neighbor {
                user_id,
                coefficient,
            });
        }
    }

    best
}

/// Computes a [`NeighborAssignment`] from a ratings snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NeighborFinder {
    mode: CorrelationMode,
}

impl NeighborFinder {
    pub fn new(mode: CorrelationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> CorrelationMode {
        self.mode
    }

    /// Find every user's neighbor
    #[instrument(skip_all, fields(users = snapshot.num_users(), mode = ?self.mode))]
    pub fn find(&self, snapshot: &RatingMatrix) -> NeighborAssignment {
        let neighbors: Vec<Option<Neighbor>> = (0..snapshot.num_users())
            .into_par_iter()
            .map(|user_id| self.find_for_user(snapshot, user_id))
            .collect();

        let assignment = NeighborAssignment::new(neighbors);
        debug!(
            assigned = assignment.assigned_count(),
            undefined = assignment.len() - assignment.assigned_count(),
            "Neighbor search complete"
        );
        assignment
    }

    /// Find one user's neighbor; the user itself is never a candidate
    pub fn find_for_user(&self, snapshot: &RatingMatrix, user_id: UserId) -> Option<Neighbor> {
        let row = snapshot.row(user_id);

        select_neighbor(
            (0..snapshot.num_users())
                .filter(|&other| other != user_id)
                .map(|other| (other, pearson(row, snapshot.row(other), self.mode))),
        )
    }
}
