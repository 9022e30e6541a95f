//! Builds new catalog generations from a provider.
//!
//! `CatalogMapper` does the network half of a catalog refresh: it pages
//! through the provider and returns a finished [`CatalogMapping`]. It holds
//! no shared state, so it runs without blocking readers; installing the
//! result is up to the caller.

use crate::error::{CatalogError, Result};
use crate::mapping::CatalogMapping;
use crate::provider::{CatalogMovie, CatalogProvider};
use ratings::MovieId;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Upper bound on pages requested in one refresh (TMDB's own limit)
pub const DEFAULT_MAX_PAGES: u32 = 500;

/// Collects up to `num_movies` distinct ids from a paginated provider
#[derive(Clone)]
pub struct CatalogMapper {
    provider: Arc<dyn CatalogProvider>,
    num_movies: usize,
    max_pages: u32,
}

impl CatalogMapper {
    pub fn new(provider: Arc<dyn CatalogProvider>, num_movies: usize) -> Self {
        Self {
            provider,
            num_movies,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Configure the page limit per refresh (default: 500)
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Page through the provider and build the mapping for `generation`.
    ///
    /// - Pages are requested from 1 until `num_movies` distinct ids are
    ///   collected, the provider is exhausted, or `max_pages` is reached.
    /// - A failure on the first page means the provider is unreachable.
    /// - A failure on a later page stops collection with what was gathered.
    /// - Collecting nothing at all is treated as unavailable.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn fetch_mapping(&self, generation: u64) -> Result<CatalogMapping> {
        let mut movies: Vec<CatalogMovie> = Vec::with_capacity(self.num_movies);
        let mut seen: HashSet<MovieId> = HashSet::with_capacity(self.num_movies);

        'pages: for page in 1..=self.max_pages {
            let listing = match self.provider.fetch_page(page).await {
                Ok(listing) => listing,
                Err(e) if page == 1 => {
                    return Err(CatalogError::Unavailable(e.to_string()));
                }
                Err(e) => {
                    warn!(page, error = %e, "Catalog page failed, keeping movies collected so far");
                    break;
                }
            };

            if listing.is_exhausted(page) {
                debug!(page, "Catalog provider exhausted");
                break;
            }

            for movie in listing.movies {
                if movies.len() == self.num_movies {
                    break 'pages;
                }
                if seen.insert(movie.id) {
                    movies.push(movie);
                }
            }

            debug!(page, collected = movies.len(), "Processed catalog page");
            if movies.len() == self.num_movies {
                break;
            }
        }

        if movies.is_empty() {
            return Err(CatalogError::Unavailable(format!(
                "{} returned no movies",
                self.provider.name()
            )));
        }

        if movies.len() < self.num_movies {
            warn!(
                collected = movies.len(),
                wanted = self.num_movies,
                "Catalog smaller than the rating matrix"
            );
        }

        info!(generation, movies = movies.len(), "Built catalog mapping");
        Ok(CatalogMapping::from_movies(generation, movies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{CatalogPage, MockCatalogProvider};
    use crate::static_catalog::StaticCatalog;

    fn page(ids: &[MovieId], total_pages: u32) -> CatalogPage {
        CatalogPage {
            movies: ids.iter().copied().map(CatalogMovie::new).collect(),
            total_pages: Some(total_pages),
        }
    }

    #[tokio::test]
    async fn test_stops_once_cap_is_reached() {
        let provider = Arc::new(StaticCatalog::from_ids(100..200).with_page_size(10));
        let mapper = CatalogMapper::new(provider, 25);

        let mapping = mapper.fetch_mapping(1).await.unwrap();

        assert_eq!(mapping.len(), 25);
        assert_eq!(mapping.to_id(0).unwrap(), 100);
        assert_eq!(mapping.to_id(24).unwrap(), 124);
    }

    #[tokio::test]
    async fn test_every_index_has_distinct_id() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_fetch_page().returning(|n| {
            Ok(match n {
                1 => page(&[1, 2, 3, 2], 3),
                2 => page(&[3, 4, 5], 3),
                _ => page(&[5, 6, 7], 3),
            })
        });

        let mapper = CatalogMapper::new(Arc::new(provider), 6);
        let mapping = mapper.fetch_mapping(2).await.unwrap();

        assert_eq!(mapping.ids(), &[1, 2, 3, 4, 5, 6]);
        let distinct: HashSet<_> = mapping.ids().iter().collect();
        assert_eq!(distinct.len(), mapping.len());
    }

    #[tokio::test]
    async fn test_exhausted_provider_yields_partial_catalog() {
        let provider = Arc::new(StaticCatalog::from_ids(1..=7).with_page_size(3));
        let mapper = CatalogMapper::new(provider, 20);

        let mapping = mapper.fetch_mapping(1).await.unwrap();

        assert_eq!(mapping.len(), 7);
    }

    #[tokio::test]
    async fn test_first_page_failure_is_unavailable() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_fetch_page()
            .returning(|_| Err(CatalogError::Unavailable("connection refused".to_string())));

        let mapper = CatalogMapper::new(Arc::new(provider), 10);
        let result = mapper.fetch_mapping(1).await;

        assert!(matches!(result, Err(CatalogError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_later_page_failure_keeps_collected_movies() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_fetch_page().returning(|n| match n {
            1 => Ok(page(&[10, 11, 12], 5)),
            _ => Err(CatalogError::Unavailable("timeout".to_string())),
        });

        let mapper = CatalogMapper::new(Arc::new(provider), 10);
        let mapping = mapper.fetch_mapping(1).await.unwrap();

        assert_eq!(mapping.ids(), &[10, 11, 12]);
    }

    #[tokio::test]
    async fn test_empty_provider_is_unavailable() {
        let mapper = CatalogMapper::new(Arc::new(StaticCatalog::from_ids(Vec::<MovieId>::new())), 10);
        assert!(matches!(
            mapper.fetch_mapping(1).await,
            Err(CatalogError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_titles_follow_their_movies() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_fetch_page().returning(|n| {
            let movies = match n {
                1 => vec![
                    CatalogMovie::titled(550, "Fight Club"),
                    CatalogMovie::new(13),
                ],
                _ => vec![
                    CatalogMovie::titled(550, "Fight Club (again)"),
                    CatalogMovie::titled(680, "Pulp Fiction"),
                ],
            };
            Ok(CatalogPage {
                movies,
                total_pages: Some(2),
            })
        });

        let mapper = CatalogMapper::new(Arc::new(provider), 10);
        let mapping = mapper.fetch_mapping(1).await.unwrap();

        assert_eq!(mapping.ids(), &[550, 13, 680]);
        assert_eq!(mapping.title(0), Some("Fight Club"));
        assert_eq!(mapping.title(1), None);
        assert_eq!(mapping.title_of(680), Some("Pulp Fiction"));
    }

    #[tokio::test]
    async fn test_max_pages_bounds_the_walk() {
        let provider = Arc::new(StaticCatalog::from_ids(1..=100).with_page_size(10));
        let mapper = CatalogMapper::new(provider, 100).with_max_pages(2);

        let mapping = mapper.fetch_mapping(1).await.unwrap();

        assert_eq!(mapping.len(), 20);
    }
}
