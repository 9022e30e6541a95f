//! External movie catalog abstraction.
//!
//! The engine only consumes a paginated listing: pages are requested in
//! order starting at 1, each returning movies in provider order. Each
//! implementation decides where the listing comes from (TMDB, a local file).

use crate::error::Result;
use async_trait::async_trait;
use ratings::MovieId;
use serde::{Deserialize, Serialize};

/// One movie record as listed by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMovie {
    pub id: MovieId,
    #[serde(default)]
    pub title: Option<String>,
}

impl CatalogMovie {
    pub fn new(id: MovieId) -> Self {
        Self { id, title: None }
    }

    pub fn titled(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
        }
    }
}

/// A single page of the listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub movies: Vec<CatalogMovie>,
    /// Total page count, when the provider reports one
    pub total_pages: Option<u32>,
}

impl CatalogPage {
    /// True when the provider has nothing at or past this page
    pub fn is_exhausted(&self, page: u32) -> bool {
        self.movies.is_empty() || self.total_pages.is_some_and(|total| page > total)
    }
}

/// Trait for paginated catalog providers
///
/// Pages are 1-based. A page past the end is either an empty page or one
/// whose number exceeds `total_pages`; both mean "no further results".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch one page of the listing
    async fn fetch_page(&self, page: u32) -> Result<CatalogPage>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
