//! Catalog store.
//!
//! Holds the client's copy of the catalog. Every successful mutation is
//! followed by a full re-read from the gateway, so the local copy is only
//! ever replaced wholesale with what the gateway returned.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::Result;
use crate::catalog::{CatalogFilter, CatalogStats, Movie, MoviePatch, NewMovie};
use crate::error::{Error, ErrorKind};
use crate::notice::{Notice, Notifier};
use crate::traits::CatalogGateway;
use crate::types::MovieId;

/// Published view of the catalog.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    /// Entries, newest first.
    pub movies: Arc<[Movie]>,
    /// True until the first refresh attempt finishes.
    pub loading: bool,
    /// When the entries were last read successfully.
    pub synced_at: Option<DateTime<Utc>>,
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self {
            movies: Arc::from(Vec::new()),
            loading: true,
            synced_at: None,
        }
    }
}

/// Client-side catalog backed by a gateway.
pub struct CatalogStore<G: ?Sized> {
    gateway: Arc<G>,
    notifier: Arc<dyn Notifier>,
    snapshot: watch::Sender<CatalogSnapshot>,
}

impl<G> CatalogStore<G>
where
    G: CatalogGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>, notifier: Arc<dyn Notifier>) -> Self {
        let (snapshot, _) = watch::channel(CatalogSnapshot::default());
        Self {
            gateway,
            notifier,
            snapshot,
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Current entries, newest first.
    pub fn movies(&self) -> Arc<[Movie]> {
        Arc::clone(&self.snapshot.borrow().movies)
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot.borrow().loading
    }

    /// Receiver that sees every published snapshot.
    pub fn watch(&self) -> watch::Receiver<CatalogSnapshot> {
        self.snapshot.subscribe()
    }

    /// Look up an entry in the current snapshot.
    pub fn find(&self, id: &MovieId) -> Result<Movie> {
        self.snapshot
            .borrow()
            .movies
            .iter()
            .find(|m| &m.id == id)
            .cloned()
            .ok_or_else(|| Error::not_found(id))
    }

    /// Entries matching a filter, in catalog order.
    pub fn filtered(&self, filter: &CatalogFilter) -> Vec<Movie> {
        let movies = self.movies();
        filter.apply(&movies).into_iter().cloned().collect()
    }

    /// Totals over the current entries.
    pub fn stats(&self) -> CatalogStats {
        CatalogStats::from_movies(&self.movies())
    }

    /// Re-read the whole catalog.
    ///
    /// On failure the previous entries stay in place and a warning notice is
    /// raised.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        match self.gateway.list_movies().await {
            Ok(movies) => {
                debug!(count = movies.len(), "Catalog refreshed");
                self.snapshot.send_replace(CatalogSnapshot {
                    movies: Arc::from(movies),
                    loading: false,
                    synced_at: Some(Utc::now()),
                });
            }
            Err(e) => {
                error!(error = %e, "Error refreshing movies");
                self.notify(Notice::warning(format!(
                    "Error refreshing movies: {}. The movie list might be out of date.",
                    e
                )));
                self.snapshot.send_if_modified(|snapshot| {
                    std::mem::replace(&mut snapshot.loading, false)
                });
            }
        }
    }

    /// Add an entry. Returns it as stored, or `None` after a failure notice.
    #[instrument(skip(self, movie), fields(title = %movie.fields.title))]
    pub async fn create(&self, movie: NewMovie) -> Option<Movie> {
        let movie = movie.with_default_counters();
        let result = match movie.validate() {
            Ok(()) => self.resync_after(self.gateway.insert_movie(&movie)).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(created) => {
                info!(id = %created.id, "Movie added");
                self.notify(Notice::success("Movie added successfully!"));
                Some(created)
            }
            Err(e) => {
                error!(error = %e, "Error adding movie");
                self.notify(Notice::error(format!("Failed to add movie: {}", e)));
                None
            }
        }
    }

    /// Change an entry's editable fields.
    #[instrument(skip(self, patch), fields(%id))]
    pub async fn update(&self, id: &MovieId, patch: MoviePatch) -> Option<Movie> {
        let result = match patch.validate() {
            Ok(()) => {
                self.resync_after(self.gateway.update_movie(id, &patch))
                    .await
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(updated) => {
                info!("Movie updated");
                self.notify(Notice::success("Movie updated successfully!"));
                Some(updated)
            }
            Err(e) => {
                error!(error = %e, "Error updating movie");
                let message = match e.kind() {
                    ErrorKind::NotFound | ErrorKind::AuthorizationDenied => format!(
                        "Failed to update movie: {}. This could be due to access policies.",
                        e
                    ),
                    _ => format!("Failed to update movie: {}", e),
                };
                self.notify(Notice::error(message));
                None
            }
        }
    }

    /// Remove an entry. Local state is untouched when the gateway refuses.
    #[instrument(skip(self), fields(%id))]
    pub async fn delete(&self, id: &MovieId) -> bool {
        match self.resync_after(self.gateway.delete_movie(id)).await {
            Ok(()) => {
                info!("Movie deleted");
                self.notify(Notice::success("Movie deleted successfully."));
                true
            }
            Err(e) => {
                error!(error = %e, "Error deleting movie");
                // A row hidden by an access policy also comes back as not found.
                self.notify(Notice::error(format!(
                    "Failed to delete movie: {}. This could be due to access policies or network issues.",
                    e
                )));
                false
            }
        }
    }

    /// Record a view. Failures are only logged.
    #[instrument(skip(self), fields(%id))]
    pub async fn increment_view_count(&self, id: &MovieId) {
        if let Err(e) = self.resync_after(self.gateway.increment_views(id)).await {
            warn!(error = %e, "Error incrementing views");
        }
    }

    /// Record a download. Failures are only logged.
    #[instrument(skip(self), fields(%id))]
    pub async fn increment_download_count(&self, id: &MovieId) {
        if let Err(e) = self.resync_after(self.gateway.increment_downloads(id)).await {
            warn!(error = %e, "Error incrementing downloads");
        }
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Run a gateway write and re-read the catalog if it succeeded.
    async fn resync_after<T, F>(&self, op: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let value = op.await?;
        self.refresh().await;
        Ok(value)
    }
}

impl<G: ?Sized> std::fmt::Debug for CatalogStore<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot.borrow();
        f.debug_struct("CatalogStore")
            .field("movies", &snapshot.movies.len())
            .field("loading", &snapshot.loading)
            .finish_non_exhaustive()
    }
}
