use pipeline::CorrelationMode;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Engine configuration loaded from `RECS_`-prefixed environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Number of users (rows in the rating matrix)
    #[serde(default = "default_num_users")]
    pub num_users: usize,

    /// Number of movies (columns in the rating matrix)
    #[serde(default = "default_num_movies")]
    pub num_movies: usize,

    /// Seconds between recommendation refreshes
    #[serde(default = "default_recommendation_interval_secs")]
    pub recommendation_interval_secs: u64,

    /// Seconds between catalog refreshes
    #[serde(default = "default_catalog_interval_secs")]
    pub catalog_interval_secs: u64,

    /// Probability that a generated cell is unrated
    #[serde(default = "default_unrated_weight")]
    pub unrated_weight: f64,

    /// Correlate only on movies both users rated
    #[serde(default)]
    pub zero_as_missing: bool,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDB API key
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// Static JSON catalog used instead of TMDB when set
    #[serde(default)]
    pub catalog_file: Option<PathBuf>,

    /// Page limit per catalog refresh
    #[serde(default = "default_catalog_max_pages")]
    pub catalog_max_pages: u32,
}

fn default_num_users() -> usize {
    42
}

fn default_num_movies() -> usize {
    1000
}

fn default_recommendation_interval_secs() -> u64 {
    86_400 // daily
}

fn default_catalog_interval_secs() -> u64 {
    604_800 // weekly
}

fn default_unrated_weight() -> f64 {
    ratings::DEFAULT_UNRATED_WEIGHT
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_catalog_max_pages() -> u32 {
    catalog::DEFAULT_MAX_PAGES
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_users: default_num_users(),
            num_movies: default_num_movies(),
            recommendation_interval_secs: default_recommendation_interval_secs(),
            catalog_interval_secs: default_catalog_interval_secs(),
            unrated_weight: default_unrated_weight(),
            zero_as_missing: false,
            tmdb_api_url: default_tmdb_api_url(),
            tmdb_api_key: None,
            catalog_file: None,
            catalog_max_pages: default_catalog_max_pages(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::prefixed("RECS_")
            .from_env::<EngineConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.num_users == 0 || self.num_movies == 0 {
            anyhow::bail!(
                "num_users and num_movies must be positive (got {} x {})",
                self.num_users,
                self.num_movies
            );
        }
        if self.recommendation_interval_secs == 0 || self.catalog_interval_secs == 0 {
            anyhow::bail!("refresh intervals must be at least one second");
        }
        if !(0.0..1.0).contains(&self.unrated_weight) {
            anyhow::bail!(
                "unrated_weight must be in [0, 1), got {}",
                self.unrated_weight
            );
        }
        Ok(())
    }

    pub fn recommendation_interval(&self) -> Duration {
        Duration::from_secs(self.recommendation_interval_secs)
    }

    pub fn catalog_interval(&self) -> Duration {
        Duration::from_secs(self.catalog_interval_secs)
    }

    pub fn correlation_mode(&self) -> CorrelationMode {
        if self.zero_as_missing {
            CorrelationMode::ZeroAsMissing
        } else {
            CorrelationMode::IncludeUnrated
        }
    }
}
