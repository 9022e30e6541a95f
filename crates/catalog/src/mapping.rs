//! One generation of the movie id ↔ matrix column mapping.
//!
//! A mapping is immutable once built. Refreshing the catalog produces a new
//! `CatalogMapping` with the next generation number; nothing patches an
//! existing one.

use crate::error::{CatalogError, Result};
use crate::provider::CatalogMovie;
use ratings::{MovieId, MovieIndex};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Bidirectional, mutually inverse mapping for a single catalog generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogMapping {
    generation: u64,
    /// `ids[k]` is the movie at column `k`
    ids: Vec<MovieId>,
    /// Provider title for the movie at column `k`, when one was listed
    titles: Vec<Option<String>>,
    indices: HashMap<MovieId, MovieIndex>,
}

impl CatalogMapping {
    /// The empty generation 0 used before the first successful refresh
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a mapping assigning sequential indices in the given order.
    ///
    /// Repeated ids keep their first position; later repeats are skipped.
    pub fn from_ids(generation: u64, ids: impl IntoIterator<Item = MovieId>) -> Self {
        Self::from_movies(generation, ids.into_iter().map(CatalogMovie::new))
    }

    /// Like [`CatalogMapping::from_ids`], keeping each movie's title
    pub fn from_movies(generation: u64, movies: impl IntoIterator<Item = CatalogMovie>) -> Self {
        let mut ids = Vec::new();
        let mut titles = Vec::new();
        let mut indices = HashMap::new();

        for movie in movies {
            if let Entry::Vacant(slot) = indices.entry(movie.id) {
                slot.insert(ids.len());
                ids.push(movie.id);
                titles.push(movie.title);
            }
        }

        Self {
            generation,
            ids,
            titles,
            indices,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of mapped movies
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Movie id at a matrix column
    pub fn to_id(&self, index: MovieIndex) -> Result<MovieId> {
        self.ids
            .get(index)
            .copied()
            .ok_or(CatalogError::UnknownIndex(index))
    }

    /// Matrix column of a movie id
    pub fn to_index(&self, id: MovieId) -> Result<MovieIndex> {
        self.indices
            .get(&id)
            .copied()
            .ok_or(CatalogError::UnknownMovieId(id))
    }

    /// Title of the movie at a matrix column, if the provider listed one
    pub fn title(&self, index: MovieIndex) -> Option<&str> {
        self.titles.get(index).and_then(|t| t.as_deref())
    }

    pub fn title_of(&self, id: MovieId) -> Option<&str> {
        self.to_index(id).ok().and_then(|index| self.title(index))
    }

    /// Mapped ids in column order
    pub fn ids(&self) -> &[MovieId] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_indices_in_provider_order() {
        let mapping = CatalogMapping::from_ids(1, [550, 13, 680]);

        assert_eq!(mapping.generation(), 1);
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.to_index(550).unwrap(), 0);
        assert_eq!(mapping.to_index(680).unwrap(), 2);
        assert_eq!(mapping.to_id(1).unwrap(), 13);
    }

    #[test]
    fn test_lookups_are_mutually_inverse() {
        let mapping = CatalogMapping::from_ids(3, [9, 8, 7, 6, 5]);

        for index in 0..mapping.len() {
            let id = mapping.to_id(index).unwrap();
            assert_eq!(mapping.to_index(id).unwrap(), index);
        }
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let mapping = CatalogMapping::from_ids(1, [4, 2, 4, 3]);

        assert_eq!(mapping.ids(), &[4, 2, 3]);
        assert_eq!(mapping.to_index(3).unwrap(), 2);
    }

    #[test]
    fn test_titles_stay_with_first_occurrence() {
        let mapping = CatalogMapping::from_movies(
            2,
            [
                CatalogMovie::titled(27205, "Inception"),
                CatalogMovie::new(155),
                CatalogMovie::titled(27205, "Inception (duplicate)"),
            ],
        );

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.title(0), Some("Inception"));
        assert_eq!(mapping.title(1), None);
        assert_eq!(mapping.title(2), None);
        assert_eq!(mapping.title_of(27205), Some("Inception"));
        assert_eq!(mapping.title_of(1), None);
    }

    #[test]
    fn test_unknown_lookups_fail() {
        let mapping = CatalogMapping::from_ids(1, [1, 2]);

        assert!(matches!(mapping.to_id(2), Err(CatalogError::UnknownIndex(2))));
        assert!(matches!(
            mapping.to_index(99),
            Err(CatalogError::UnknownMovieId(99))
        ));
    }

    #[test]
    fn test_empty_mapping() {
        let mapping = CatalogMapping::empty();
        assert_eq!(mapping.generation(), 0);
        assert!(mapping.is_empty());
        assert!(mapping.to_id(0).is_err());
    }
}
