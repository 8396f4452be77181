//! Search and genre filtering for the gallery.

use super::Movie;
use crate::types::Genre;

/// Title search plus optional genre restriction.
///
/// Filtering keeps the catalog order, so results stay newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Case-insensitive substring matched against the title.
    pub search: String,
    /// Only keep entries of this genre.
    pub genre: Option<Genre>,
}

impl CatalogFilter {
    pub fn new(search: impl Into<String>, genre: Option<Genre>) -> Self {
        Self {
            search: search.into(),
            genre,
        }
    }

    pub fn matches(&self, movie: &Movie) -> bool {
        let needle = self.search.trim().to_lowercase();
        let title_matches = needle.is_empty() || movie.title.to_lowercase().contains(&needle);
        let genre_matches = self.genre.is_none_or(|g| g == movie.genre);
        title_matches && genre_matches
    }

    pub fn apply<'a>(&self, movies: &'a [Movie]) -> Vec<&'a Movie> {
        movies.iter().filter(|m| self.matches(m)).collect()
    }
}
