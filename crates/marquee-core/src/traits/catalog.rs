//! Row store and counter RPC trait.

use async_trait::async_trait;

use crate::Result;
use crate::catalog::{Movie, MoviePatch, NewMovie};
use crate::types::MovieId;

/// Hosted catalog table plus the two counter procedures.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// All entries, newest first by creation time.
    async fn list_movies(&self) -> Result<Vec<Movie>>;

    /// Insert an entry and return it as stored.
    async fn insert_movie(&self, movie: &NewMovie) -> Result<Movie>;

    /// Update an entry and return it as stored.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) when no entry
    /// has the identifier.
    async fn update_movie(&self, id: &MovieId, patch: &MoviePatch) -> Result<Movie>;

    /// Delete an entry.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) when no entry
    /// has the identifier.
    async fn delete_movie(&self, id: &MovieId) -> Result<()>;

    /// Add one to the view counter.
    async fn increment_views(&self, id: &MovieId) -> Result<()>;

    /// Add one to the download counter.
    async fn increment_downloads(&self, id: &MovieId) -> Result<()>;
}
