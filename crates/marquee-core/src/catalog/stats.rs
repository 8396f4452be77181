//! Dashboard totals.

use super::Movie;

/// Aggregate figures shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_movies: usize,
    pub total_views: u64,
    pub total_downloads: u64,
}

impl CatalogStats {
    pub fn from_movies(movies: &[Movie]) -> Self {
        movies.iter().fold(
            Self {
                total_movies: movies.len(),
                ..Self::default()
            },
            |acc, m| Self {
                total_views: acc.total_views.saturating_add(m.views),
                total_downloads: acc.total_downloads.saturating_add(m.downloads),
                ..acc
            },
        )
    }
}
