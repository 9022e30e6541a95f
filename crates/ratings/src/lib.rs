//! # Ratings Crate
//!
//! Owns the user × movie rating matrix that the recommendation engine reads
//! from.
//!
//! ## Main Components
//!
//! - **types**: Index aliases (UserId, MovieIndex, MovieId) and `RatingMatrix`
//! - **store**: `RatingStore`, the only way to read or write the matrix
//! - **distribution**: Random ratings used to seed and reset the matrix
//! - **error**: Error types for store access
//!
//! ## Example Usage
//!
//! ```ignore
//! use ratings::{RatingDistribution, RatingStore};
//!
//! let store = RatingStore::new(42, 1000, RatingDistribution::new(0.3)?);
//! store.reset(1000);
//!
//! store.set_rating(0, 17, 8)?;
//! let snapshot = store.snapshot();
//! assert_eq!(snapshot.get(0, 17), 8);
//! ```

pub mod distribution;
pub mod error;
pub mod store;
pub mod types;

pub use distribution::{DEFAULT_UNRATED_WEIGHT, RatingDistribution};
pub use error::{RatingError, Result};
pub use store::RatingStore;
pub use types::{
    MAX_RATING, MovieId, MovieIndex, RatingMatrix, RatingValue, UNRATED, UserId,
};
