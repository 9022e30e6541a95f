//! Core domain types for the rating matrix.
//!
//! Users and movies are addressed by dense indices. The external, stable
//! movie identifier lives in the catalog crate's mapping; inside the matrix
//! a movie is only ever its column position.

// =============================================================================
// Type Aliases
// =============================================================================

/// Dense user index in `[0, num_users)`, fixed for the process lifetime
pub type UserId = usize;

/// Dense column index in `[0, num_movies)`
///
/// The movie behind an index changes whenever the catalog is rebuilt.
pub type MovieIndex = usize;

/// Stable identifier handed out by the external catalog provider
pub type MovieId = u64;

/// A single cell of the matrix
pub type RatingValue = u8;

/// Sentinel meaning "no opinion"
pub const UNRATED: RatingValue = 0;

/// Highest rating a user can give
pub const MAX_RATING: RatingValue = 10;

// =============================================================================
// RatingMatrix
// =============================================================================

/// Dense `num_users × num_movies` matrix stored row-major.
///
/// Every cell is initialized on construction; there is no "missing" state
/// other than the [`UNRATED`] sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingMatrix {
    num_users: usize,
    num_movies: usize,
    cells: Vec<RatingValue>,
}

impl RatingMatrix {
    /// Creates a matrix with every cell unrated
    pub fn unrated(num_users: usize, num_movies: usize) -> Self {
        Self {
            num_users,
            num_movies,
            cells: vec![UNRATED; num_users * num_movies],
        }
    }

    /// Builds a matrix from explicit rows.
    ///
    /// Returns `None` if the rows are ragged or hold a value above
    /// [`MAX_RATING`].
    pub fn from_rows(rows: Vec<Vec<RatingValue>>) -> Option<Self> {
        let num_users = rows.len();
        let num_movies = rows.first().map(|r| r.len()).unwrap_or(0);

        let mut cells = Vec::with_capacity(num_users * num_movies);
        for row in rows {
            if row.len() != num_movies || row.iter().any(|&v| v > MAX_RATING) {
                return None;
            }
            cells.extend(row);
        }

        Some(Self {
            num_users,
            num_movies,
            cells,
        })
    }

    pub fn num_users(&self) -> usize {
        self.num_users
    }

    pub fn num_movies(&self) -> usize {
        self.num_movies
    }

    /// Borrow a user's full rating vector
    ///
    /// Panics if `user_id` is out of bounds; callers validate first.
    pub fn row(&self, user_id: UserId) -> &[RatingValue] {
        let start = user_id * self.num_movies;
        &self.cells[start..start + self.num_movies]
    }

    pub(crate) fn row_mut(&mut self, user_id: UserId) -> &mut [RatingValue] {
        let start = user_id * self.num_movies;
        &mut self.cells[start..start + self.num_movies]
    }

    /// Read one cell
    pub fn get(&self, user_id: UserId, movie_index: MovieIndex) -> RatingValue {
        self.cells[user_id * self.num_movies + movie_index]
    }

    pub(crate) fn set(&mut self, user_id: UserId, movie_index: MovieIndex, value: RatingValue) {
        self.cells[user_id * self.num_movies + movie_index] = value;
    }

    /// Iterate over rows in user order
    pub fn rows(&self) -> impl Iterator<Item = &[RatingValue]> {
        (0..self.num_users).map(move |user_id| self.row(user_id))
    }

    /// Number of cells holding a real rating
    pub fn rated_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v != UNRATED).count()
    }
}
