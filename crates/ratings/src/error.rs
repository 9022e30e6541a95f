//! Error types for the ratings crate.

use thiserror::Error;

/// Errors returned by the rating store
///
/// Every variant is a caller error: the store never fails on its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// A user id, movie index or rating value fell outside its bounds
    #[error("{field} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The rating distribution could not be built from the configured weight
    #[error("Invalid rating distribution: {0}")]
    InvalidDistribution(String),
}

impl RatingError {
    pub(crate) fn out_of_range(field: &'static str, value: i64, min: i64, max: i64) -> Self {
        RatingError::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RatingError>;
