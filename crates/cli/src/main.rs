use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use catalog::CatalogMapping;
use ratings::{MovieId, UserId};
use server::{EngineConfig, RecommendationEngine, provider_from_config};
use std::path::PathBuf;
use std::time::Instant;

/// ReelRecs - nearest-neighbor movie recommendations
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Inspect recommendations computed over a freshly seeded rating matrix", long_about = None)]
struct Cli {
    /// JSON catalog file (array of {"id", "title"}) used instead of TMDB
    #[arg(long)]
    catalog_file: Option<PathBuf>,

    /// TMDB API key (falls back to RECS_TMDB_API_KEY)
    #[arg(long)]
    tmdb_api_key: Option<String>,

    /// Number of users in the rating matrix
    #[arg(long)]
    users: Option<usize>,

    /// Number of movies in the rating matrix
    #[arg(long)]
    movies: Option<usize>,

    /// Correlate only on movies both users rated
    #[arg(long)]
    zero_as_missing: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a user's neighbor and recommended movies
    Recommend {
        /// User to recommend for
        #[arg(long)]
        user_id: UserId,
    },

    /// Show the movies a user has rated
    Ratings {
        #[arg(long)]
        user_id: UserId,
    },

    /// Show the nearest neighbor of every user
    Neighbors,

    /// Show engine counters
    Stats,
}

impl Cli {
    /// Environment configuration with command-line overrides applied
    fn config(&self) -> Result<EngineConfig> {
        let mut config = EngineConfig::from_env()?;
        if let Some(path) = &self.catalog_file {
            config.catalog_file = Some(path.clone());
        }
        if let Some(key) = &self.tmdb_api_key {
            config.tmdb_api_key = Some(key.clone());
        }
        if let Some(users) = self.users {
            config.num_users = users;
        }
        if let Some(movies) = self.movies {
            config.num_movies = movies;
        }
        if self.zero_as_missing {
            config.zero_as_missing = true;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;

    // Load the catalog, seed the matrix and compute one generation
    let start = Instant::now();
    let provider = provider_from_config(&config)?;
    let engine = RecommendationEngine::from_config(&config, provider)?;
    engine
        .force_catalog_refresh()
        .await
        .context("Failed to load the movie catalog")?;
    println!(
        "{} Loaded {} movies for {} users in {:?}",
        "✓".green(),
        engine.catalog().len(),
        engine.num_users(),
        start.elapsed()
    );

    match cli.command {
        Commands::Recommend { user_id } => handle_recommend(&engine, user_id)?,
        Commands::Ratings { user_id } => handle_ratings(&engine, user_id)?,
        Commands::Neighbors => handle_neighbors(&engine),
        Commands::Stats => handle_stats(&engine),
    }

    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(engine: &RecommendationEngine, user_id: UserId) -> Result<()> {
    let neighbor = engine.get_neighbor(user_id)?;
    let recommendations = engine.get_recommendations(user_id)?;

    println!("{}", format!("Recommendations for user {}:", user_id).bold().blue());
    match neighbor {
        Some(n) => println!(
            "{}Neighbor: user {} (r = {:.3})",
            "• ".green(),
            n.user_id,
            n.coefficient
        ),
        None => println!("{}Neighbor: {}", "• ".green(), "none".yellow()),
    }

    if recommendations.is_empty() {
        println!("  (nothing to recommend)");
    }
    let catalog = engine.catalog();
    for (rank, &movie_id) in recommendations.iter().enumerate() {
        println!(
            "{}. {}",
            (rank + 1).to_string().green(),
            describe_movie(&catalog, movie_id)
        );
    }
    Ok(())
}

/// Handle the 'ratings' command
fn handle_ratings(engine: &RecommendationEngine, user_id: UserId) -> Result<()> {
    let ratings = engine.get_user_ratings(user_id)?;

    println!("{}", format!("Ratings for user {}:", user_id).bold().blue());
    let average = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().map(|&(_, r)| r as f32).sum::<f32>() / ratings.len() as f32
    };
    println!("{}Rated movies: {}", "• ".cyan(), ratings.len());
    println!("{}Average rating: {:.2}", "• ".cyan(), average);

    let catalog = engine.catalog();
    for (movie_id, rating) in ratings {
        println!("  - {}: {}", describe_movie(&catalog, movie_id), rating);
    }
    Ok(())
}

/// Title and id, or just the id when the provider listed no title
fn describe_movie(catalog: &CatalogMapping, movie_id: MovieId) -> String {
    match catalog.title_of(movie_id) {
        Some(title) => format!("{} ({})", title, movie_id),
        None => format!("movie {}", movie_id),
    }
}

/// Handle the 'neighbors' command
fn handle_neighbors(engine: &RecommendationEngine) {
    let table = engine.recommendation_table();

    println!("{}", "Nearest neighbors:".bold().blue());
    for user_id in 0..table.num_users() {
        let count = table.recommendations(user_id).map_or(0, <[_]>::len);
        match table.neighbor(user_id) {
            Some(n) => println!(
                "{:>4} -> {:<4} r = {:>6.3}  {} recommendations",
                user_id, n.user_id, n.coefficient, count
            ),
            None => println!("{:>4} -> {}", user_id, "undefined".yellow()),
        }
    }
}

/// Handle the 'stats' command
fn handle_stats(engine: &RecommendationEngine) {
    let stats = engine.stats();

    println!("{}", "Engine stats:".bold().blue());
    println!("{}Users: {}", "• ".cyan(), stats.users);
    println!("{}Matrix columns: {}", "• ".cyan(), stats.movies);
    println!("{}Catalog movies: {}", "• ".cyan(), stats.mapped_movies);
    println!("{}Rated cells: {}", "• ".cyan(), stats.rated_cells);
    println!("{}Recommendations: {}", "• ".cyan(), stats.recommendations);
    println!("{}Catalog generation: {}", "• ".cyan(), stats.catalog_generation);
}
