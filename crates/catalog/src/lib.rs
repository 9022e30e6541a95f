//! Catalog client and id ↔ index mapping for the rating matrix.
//!
//! This crate handles everything about the external movie catalog:
//! - The paginated `CatalogProvider` contract and its implementations
//!   (TMDB over HTTP, a static JSON list)
//! - `CatalogMapping`, one immutable generation of the id ↔ column mapping
//! - `CatalogMapper`, which pages through a provider to build the next
//!   generation
//!
//! Nothing outside this crate translates between movie ids and matrix
//! columns.

pub mod error;
pub mod mapper;
pub mod mapping;
pub mod provider;
pub mod static_catalog;
pub mod tmdb;

pub use error::{CatalogError, Result};
pub use mapper::{CatalogMapper, DEFAULT_MAX_PAGES};
pub use mapping::CatalogMapping;
pub use provider::{CatalogMovie, CatalogPage, CatalogProvider};
pub use static_catalog::StaticCatalog;
pub use tmdb::TmdbProvider;
