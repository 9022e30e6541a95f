//! TMDB catalog provider
//!
//! Lists popular movies through TMDB's discover endpoint:
//! `GET {api_url}/discover/movie?page=N&api_key=K`. TMDB serves 20 movies
//! per page and reports `total_pages` alongside the results.

use crate::{
    error::{CatalogError, Result},
    provider::{CatalogMovie, CatalogPage, CatalogProvider},
};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    results: Vec<CatalogMovie>,
    total_pages: Option<u32>,
}

impl TmdbProvider {
    /// Creates a provider against `api_url` (e.g. `https://api.themoviedb.org/3`)
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn discover_url(&self) -> String {
        format!("{}/discover/movie", self.api_url)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn fetch_page(&self, page: u32) -> Result<CatalogPage> {
        tracing::debug!(page, "Requesting TMDB discover page");

        let response = self
            .http_client
            .get(self.discover_url())
            .query(&[("page", page.to_string()), ("api_key", self.api_key.clone())])
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable(format!("TMDB request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Unavailable(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let discover: DiscoverResponse = response.json().await?;

        Ok(CatalogPage {
            movies: discover.results,
            total_pages: discover.total_pages,
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
