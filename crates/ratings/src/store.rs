//! The shared rating store.
//!
//! All access to the matrix goes through [`RatingStore`]. Writes, snapshots
//! and resets are serialized by a single `RwLock`, so a snapshot never sees
//! a half-applied reset and a row is never read mid-write.

use crate::distribution::RatingDistribution;
use crate::error::{RatingError, Result};
use crate::types::{MAX_RATING, MovieIndex, RatingMatrix, RatingValue, UNRATED, UserId};
use rand::Rng;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Thread-safe owner of the `num_users × num_movies` rating matrix
#[derive(Debug)]
pub struct RatingStore {
    num_users: usize,
    num_movies: usize,
    distribution: RatingDistribution,
    matrix: RwLock<RatingMatrix>,
}

impl RatingStore {
    /// Create a store whose cells all start unrated
    pub fn new(num_users: usize, num_movies: usize, distribution: RatingDistribution) -> Self {
        Self {
            num_users,
            num_movies,
            distribution,
            matrix: RwLock::new(RatingMatrix::unrated(num_users, num_movies)),
        }
    }

    /// Wrap an existing matrix, e.g. a fixture or a restored snapshot
    pub fn from_matrix(matrix: RatingMatrix, distribution: RatingDistribution) -> Self {
        Self {
            num_users: matrix.num_users(),
            num_movies: matrix.num_movies(),
            distribution,
            matrix: RwLock::new(matrix),
        }
    }

    pub fn num_users(&self) -> usize {
        self.num_users
    }

    pub fn num_movies(&self) -> usize {
        self.num_movies
    }

    /// Overwrite one cell.
    ///
    /// `value` may be [`UNRATED`] to clear a rating. On error the matrix is
    /// left untouched.
    pub fn set_rating(
        &self,
        user_id: UserId,
        movie_index: MovieIndex,
        value: RatingValue,
    ) -> Result<()> {
        self.check_user(user_id)?;
        self.check_movie(movie_index)?;
        if value > MAX_RATING {
            return Err(RatingError::out_of_range(
                "rating",
                value as i64,
                UNRATED as i64,
                MAX_RATING as i64,
            ));
        }

        self.write().set(user_id, movie_index, value);
        Ok(())
    }

    /// Return a copy of the user's full rating vector
    pub fn get_user_ratings(&self, user_id: UserId) -> Result<Vec<RatingValue>> {
        self.check_user(user_id)?;
        Ok(self.read().row(user_id).to_vec())
    }

    /// Point-in-time, independent copy of the whole matrix
    pub fn snapshot(&self) -> RatingMatrix {
        self.read().clone()
    }

    /// Replace the whole matrix with freshly drawn ratings.
    ///
    /// Only the first `mapped_movies` columns are drawn; columns without a
    /// catalog entry are unrated.
    pub fn reset(&self, mapped_movies: usize) {
        self.reset_with_rng(mapped_movies, &mut rand::rng());
    }

    /// [`RatingStore::reset`] with a caller-supplied generator
    pub fn reset_with_rng<R: Rng + ?Sized>(&self, mapped_movies: usize, rng: &mut R) {
        let mapped = mapped_movies.min(self.num_movies);

        // Build outside the lock, swap inside it
        let mut fresh = RatingMatrix::unrated(self.num_users, self.num_movies);
        for user_id in 0..self.num_users {
            self.distribution
                .fill_row(fresh.row_mut(user_id), mapped, rng);
        }

        *self.write() = fresh;
        debug!(
            users = self.num_users,
            mapped_movies = mapped,
            "Rating matrix reset"
        );
    }

    fn check_user(&self, user_id: UserId) -> Result<()> {
        if user_id >= self.num_users {
            return Err(RatingError::out_of_range(
                "user_id",
                user_id as i64,
                0,
                self.num_users as i64 - 1,
            ));
        }
        Ok(())
    }

    fn check_movie(&self, movie_index: MovieIndex) -> Result<()> {
        if movie_index >= self.num_movies {
            return Err(RatingError::out_of_range(
                "movie_index",
                movie_index as i64,
                0,
                self.num_movies as i64 - 1,
            ));
        }
        Ok(())
    }

    // Every critical section leaves the matrix whole, so a poisoned lock
    // still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, RatingMatrix> {
        self.matrix.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RatingMatrix> {
        self.matrix.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::DEFAULT_UNRATED_WEIGHT;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;

    fn create_test_store(num_users: usize, num_movies: usize) -> RatingStore {
        RatingStore::new(
            num_users,
            num_movies,
            RatingDistribution::new(DEFAULT_UNRATED_WEIGHT).unwrap(),
        )
    }

    #[test]
    fn test_set_then_get_reflects_value() {
        let store = create_test_store(3, 4);

        for user_id in 0..3 {
            for movie_index in 0..4 {
                for value in 0..=MAX_RATING {
                    store.set_rating(user_id, movie_index, value).unwrap();
                    let row = store.get_user_ratings(user_id).unwrap();
                    assert_eq!(row[movie_index], value);
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_leaves_matrix_unchanged() {
        let store = create_test_store(2, 3);
        store.set_rating(1, 2, 7).unwrap();
        let before = store.snapshot();

        assert!(matches!(
            store.set_rating(2, 0, 5),
            Err(RatingError::OutOfRange { field: "user_id", .. })
        ));
        assert!(matches!(
            store.set_rating(0, 3, 5),
            Err(RatingError::OutOfRange { field: "movie_index", .. })
        ));
        assert!(matches!(
            store.set_rating(0, 0, 11),
            Err(RatingError::OutOfRange { field: "rating", .. })
        ));

        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_get_user_ratings_rejects_invalid_user() {
        let store = create_test_store(2, 3);
        assert!(store.get_user_ratings(2).is_err());
        assert_eq!(store.get_user_ratings(1).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let store = create_test_store(2, 2);
        store.set_rating(0, 0, 4).unwrap();

        let snapshot = store.snapshot();
        store.set_rating(0, 0, 9).unwrap();

        assert_eq!(snapshot.get(0, 0), 4);
        assert_eq!(store.snapshot().get(0, 0), 9);
    }

    #[test]
    fn test_reset_reinitializes_every_cell() {
        // No unrated mass, so every mapped cell is a fresh 1-10 draw
        let store = RatingStore::new(4, 5, RatingDistribution::new(0.0).unwrap());
        let mut rng = StdRng::seed_from_u64(11);

        store.reset_with_rng(3, &mut rng);
        let snapshot = store.snapshot();

        for row in snapshot.rows() {
            assert!(row[..3].iter().all(|&v| (1..=MAX_RATING).contains(&v)));
            assert_eq!(&row[3..], &[UNRATED, UNRATED]);
        }
    }

    #[test]
    fn test_reset_discards_previous_ratings() {
        let store = create_test_store(2, 2);
        store.set_rating(0, 0, 10).unwrap();
        store.set_rating(1, 1, 10).unwrap();

        store.reset(0);

        assert_eq!(store.snapshot().rated_count(), 0);
    }

    #[test]
    fn test_reset_caps_mapped_movies_at_width() {
        let store = RatingStore::new(1, 2, RatingDistribution::new(0.0).unwrap());
        store.reset(50);
        assert_eq!(store.snapshot().rated_count(), 2);
    }

    #[test]
    fn test_concurrent_writes_are_all_applied() {
        let store = Arc::new(create_test_store(8, 16));

        let handles: Vec<_> = (0..8)
            .map(|user_id| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for movie_index in 0..16 {
                        store.set_rating(user_id, movie_index, 5).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.snapshot().rated_count(), 8 * 16);
    }
}
