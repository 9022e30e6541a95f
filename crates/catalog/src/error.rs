//! Error types for the catalog crate.

use ratings::{MovieId, MovieIndex};
use thiserror::Error;

/// Errors from catalog lookups and provider access
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The movie id has no column in the current catalog generation
    #[error("Unknown movie id {0} in the current catalog")]
    UnknownMovieId(MovieId),

    /// The column index has no movie in the current catalog generation
    #[error("No movie mapped at index {0} in the current catalog")]
    UnknownIndex(MovieIndex),

    /// The provider could not be reached or returned nothing usable
    #[error("Catalog provider unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog data: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    /// True for lookup misses as opposed to provider failures
    pub fn is_unknown_movie(&self) -> bool {
        matches!(
            self,
            CatalogError::UnknownMovieId(_) | CatalogError::UnknownIndex(_)
        )
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
