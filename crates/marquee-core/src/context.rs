//! Application context.

use std::sync::Arc;

use tracing::info;

use crate::notice::Notifier;
use crate::session_manager::SessionManager;
use crate::store::CatalogStore;
use crate::traits::Gateway;

/// Gateway, session manager and catalog store, shared by every screen.
pub struct CatalogContext<G: ?Sized> {
    gateway: Arc<G>,
    session: Arc<SessionManager<G>>,
    store: Arc<CatalogStore<G>>,
}

impl<G> CatalogContext<G>
where
    G: Gateway + ?Sized + 'static,
{
    pub fn new(gateway: Arc<G>, notifier: Arc<dyn Notifier>) -> Self {
        let session = Arc::new(SessionManager::new(
            Arc::clone(&gateway),
            Arc::clone(&notifier),
        ));
        let store = Arc::new(CatalogStore::new(Arc::clone(&gateway), notifier));
        Self {
            gateway,
            session,
            store,
        }
    }

    /// Resolve the session, then load the catalog.
    pub async fn bootstrap(&self) {
        let state = self.session.probe().await;
        self.store.refresh().await;
        info!(
            is_admin = state.is_admin(),
            movies = self.store.movies().len(),
            "Context ready"
        );
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn session(&self) -> &Arc<SessionManager<G>> {
        &self.session
    }

    pub fn store(&self) -> &Arc<CatalogStore<G>> {
        &self.store
    }
}

impl<G: ?Sized> Clone for CatalogContext<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            session: Arc::clone(&self.session),
            store: Arc::clone(&self.store),
        }
    }
}
