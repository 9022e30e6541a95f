//! Errors surfaced by the engine facade.
//!
//! Three kinds reach callers: bad bounds, stale or unknown movie ids, and an
//! unreachable catalog provider. Background refreshes log their failures and
//! never hand them to request paths.

use catalog::CatalogError;
use ratings::RatingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// User id, movie index or rating outside its bounds
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Movie id not present in the current catalog generation
    #[error("Unknown movie: {0}")]
    UnknownMovie(String),

    /// Catalog provider could not be reached; the previous catalog stays
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A background computation panicked or was cancelled
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Stable failure code for the transport layer
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::OutOfRange(_) => "out_of_range",
            EngineError::UnknownMovie(_) => "unknown_movie",
            EngineError::CatalogUnavailable(_) => "catalog_unavailable",
            EngineError::Configuration(_) => "configuration",
            EngineError::Internal(_) => "internal",
        }
    }
}

impl From<RatingError> for EngineError {
    fn from(err: RatingError) -> Self {
        match err {
            RatingError::OutOfRange { .. } => EngineError::OutOfRange(err.to_string()),
            RatingError::InvalidDistribution(_) => EngineError::Configuration(err.to_string()),
        }
    }
}

impl From<CatalogError> for EngineError {
    fn from(err: CatalogError) -> Self {
        if err.is_unknown_movie() {
            EngineError::UnknownMovie(err.to_string())
        } else {
            EngineError::CatalogUnavailable(err.to_string())
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_errors_map_to_out_of_range() {
        let err: EngineError = RatingError::OutOfRange {
            field: "user_id",
            value: 50,
            min: 0,
            max: 41,
        }
        .into();
        assert_eq!(err.code(), "out_of_range");
    }

    #[test]
    fn test_catalog_errors_split_by_kind() {
        let unknown: EngineError = CatalogError::UnknownMovieId(7).into();
        let unavailable: EngineError = CatalogError::Unavailable("down".to_string()).into();

        assert!(matches!(unknown, EngineError::UnknownMovie(_)));
        assert!(matches!(unavailable, EngineError::CatalogUnavailable(_)));
    }
}
