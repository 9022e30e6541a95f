//! In-memory catalog served in fixed-size pages.
//!
//! Used for offline runs (a `movies_list.json` exported from the provider)
//! and as a deterministic provider in tests.

use crate::error::{CatalogError, Result};
use crate::provider::{CatalogMovie, CatalogPage, CatalogProvider};
use async_trait::async_trait;
use ratings::MovieId;
use std::path::Path;

/// Page size matching the TMDB listing
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// A fixed movie list exposed through the paginated provider contract
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    movies: Vec<CatalogMovie>,
    page_size: usize,
}

impl StaticCatalog {
    pub fn new(movies: Vec<CatalogMovie>) -> Self {
        Self {
            movies,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Convenience constructor from bare ids
    pub fn from_ids(ids: impl IntoIterator<Item = MovieId>) -> Self {
        Self::new(ids.into_iter().map(CatalogMovie::new).collect())
    }

    /// Load a JSON array of `{"id": .., "title": ..}` objects
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let movies: Vec<CatalogMovie> = serde_json::from_str(&raw)?;

        tracing::info!(
            path = %path.display(),
            movies = movies.len(),
            "Loaded static catalog"
        );
        Ok(Self::new(movies))
    }

    /// Configure the page size (default: 20)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    fn total_pages(&self) -> u32 {
        self.movies.len().div_ceil(self.page_size) as u32
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn fetch_page(&self, page: u32) -> Result<CatalogPage> {
        let start = (page.saturating_sub(1) as usize).saturating_mul(self.page_size);
        let movies = if page == 0 || start >= self.movies.len() {
            Vec::new()
        } else {
            let end = (start + self.page_size).min(self.movies.len());
            self.movies[start..end].to_vec()
        };

        Ok(CatalogPage {
            movies,
            total_pages: Some(self.total_pages()),
        })
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_are_one_based_and_ordered() {
        let catalog = StaticCatalog::from_ids(1..=45);

        let first = catalog.fetch_page(1).await.unwrap();
        let last = catalog.fetch_page(3).await.unwrap();

        assert_eq!(first.movies.len(), 20);
        assert_eq!(first.movies[0].id, 1);
        assert_eq!(first.total_pages, Some(3));
        assert_eq!(last.movies.len(), 5);
        assert_eq!(last.movies[4].id, 45);
    }

    #[tokio::test]
    async fn test_past_the_end_is_empty() {
        let catalog = StaticCatalog::from_ids(1..=5).with_page_size(5);

        assert!(catalog.fetch_page(2).await.unwrap().is_exhausted(2));
        assert!(catalog.fetch_page(0).await.unwrap().movies.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("static_catalog_load_test.json");
        std::fs::write(&path, r#"[{"id": 550, "title": "Fight Club"}, {"id": 13}]"#).unwrap();

        let catalog = StaticCatalog::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = StaticCatalog::load_from_file(Path::new("/nonexistent/movies_list.json"));
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
