//! File-backed gateway implementation.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use url::Url;
use uuid::Uuid;

use marquee_core::error::{AuthError, Error, InvalidInputError};
use marquee_core::traits::{AuthGateway, CatalogGateway, StorageGateway};
use marquee_core::{
    AccessToken, AuthEvent, AuthEventHub, AuthEventStream, AuthSession, Credentials, GatewayUrl,
    Movie, MovieId, MoviePatch, NewMovie, Result, User,
};

use crate::store::{FileStore, LocalUser};

/// Gateway that keeps everything in a local directory.
///
/// Cloning is cheap; clones share the session and the event hub.
#[derive(Clone)]
pub struct FileGateway {
    inner: Arc<Inner>,
}

struct Inner {
    store: FileStore,
    url: GatewayUrl,
    session: RwLock<Option<AuthSession>>,
    events: AuthEventHub,
}

impl FileGateway {
    /// Create a gateway rooted at `root`.
    pub fn new(root: impl AsRef<Path>, url: GatewayUrl) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: FileStore::new(root),
                url,
                session: RwLock::new(None),
                events: AuthEventHub::new(),
            }),
        }
    }

    /// Create a gateway for a `file://` URL.
    pub fn from_url(url: GatewayUrl) -> Result<Self> {
        let root = url.to_file_path().ok_or_else(|| InvalidInputError::GatewayUrl {
            value: url.to_string(),
            reason: "not a file:// URL".to_string(),
        })?;
        Ok(Self::new(root, url))
    }

    pub fn url(&self) -> &GatewayUrl {
        &self.inner.url
    }

    pub fn root(&self) -> &Path {
        self.inner.store.root()
    }

    /// Register an account that can sign in.
    #[instrument(skip(self, password))]
    pub fn create_user(&self, email: &str, password: &str) -> Result<User> {
        if email.trim().is_empty() {
            return Err(InvalidInputError::MissingField { field: "email" }.into());
        }
        if password.is_empty() {
            return Err(InvalidInputError::MissingField { field: "password" }.into());
        }
        let password_hash = hash(password, DEFAULT_COST).map_err(|e| InvalidInputError::Other {
            message: e.to_string(),
        })?;
        let user = self.inner.store.create_user(email.trim(), &password_hash)?;
        info!(id = %user.id, "User created");
        Ok(to_user(&user))
    }

    /// Put a persisted session back in place without announcing it.
    pub async fn restore_session(&self, session: AuthSession) {
        *self.inner.session.write().await = Some(session);
    }

    /// The held session, as is.
    pub async fn session(&self) -> Option<AuthSession> {
        self.inner.session.read().await.clone()
    }

    /// The account behind a token, if the token is still good.
    fn validate_token(&self, token: &AccessToken) -> Result<Option<LocalUser>> {
        let store = &self.inner.store;
        match store.session_user(token.as_str())? {
            Some(user_id) => store.get_user(&user_id),
            None => Ok(None),
        }
    }

    /// The signed-in account, required for writes.
    async fn require_user(&self) -> Result<LocalUser> {
        let token = self
            .inner
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token().clone())
            .ok_or(AuthError::NotSignedIn)?;
        self.validate_token(&token)?
            .ok_or_else(|| AuthError::SessionExpired.into())
    }

    async fn clear_session(&self) {
        *self.inner.session.write().await = None;
        self.inner.events.emit(AuthEvent::signed_out());
    }

    fn update_counter(&self, id: &MovieId, bump: impl FnOnce(&mut Movie)) -> Result<()> {
        let _lock = self.inner.store.lock_catalog()?;
        let mut movie = self
            .inner
            .store
            .read_movie(id)?
            .ok_or_else(|| Error::not_found(id))?;
        bump(&mut movie);
        self.inner.store.write_movie(&movie)
    }
}

fn to_user(user: &LocalUser) -> User {
    User {
        id: user.id.clone(),
        email: Some(user.email.clone()),
    }
}

#[async_trait]
impl AuthGateway for FileGateway {
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    async fn sign_in(&self, credentials: Credentials) -> Result<AuthSession> {
        let invalid = || AuthError::InvalidCredentials("Invalid login credentials".to_string());

        let user = self
            .inner
            .store
            .find_user_by_email(credentials.email())?
            .ok_or_else(invalid)?;
        let ok = verify(credentials.password(), &user.password_hash).map_err(|e| {
            InvalidInputError::Other {
                message: e.to_string(),
            }
        })?;
        if !ok {
            return Err(invalid().into());
        }

        let token = AccessToken::new(self.inner.store.create_session(&user.id)?);
        let session = AuthSession::new(to_user(&user), token, None, None);
        *self.inner.session.write().await = Some(session.clone());
        info!(user = %user.id, "Signed in");
        self.inner.events.emit(AuthEvent::signed_in(session.clone()));
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.session().await {
            match self.inner.store.remove_session(session.access_token().as_str()) {
                Ok(_) => {}
                Err(Error::InvalidInput(_)) => debug!("Held token was malformed"),
                Err(e) => return Err(e),
            }
        }
        self.clear_session().await;
        info!("Signed out");
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>> {
        let Some(session) = self.session().await else {
            return Ok(None);
        };
        match self.validate_token(session.access_token()) {
            Ok(Some(_)) => Ok(Some(session)),
            Ok(None) | Err(Error::InvalidInput(_)) => {
                debug!("Held session no longer matches a user");
                self.clear_session().await;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn auth_events(&self) -> AuthEventStream {
        self.inner.events.subscribe()
    }
}

#[async_trait]
impl CatalogGateway for FileGateway {
    #[instrument(skip(self))]
    async fn list_movies(&self) -> Result<Vec<Movie>> {
        let movies = self.inner.store.list_movies()?;
        debug!(count = movies.len(), "Listed movies");
        Ok(movies)
    }

    #[instrument(skip(self, movie), fields(title = %movie.fields.title))]
    async fn insert_movie(&self, movie: &NewMovie) -> Result<Movie> {
        self.require_user().await?;
        let id = MovieId::new(Uuid::new_v4().to_string())?;
        let stored = Movie::from_fields(
            id,
            movie.fields.clone(),
            movie.views.unwrap_or(0),
            movie.downloads.unwrap_or(0),
            Utc::now(),
        );

        let _lock = self.inner.store.lock_catalog()?;
        self.inner.store.write_movie(&stored)?;
        debug!(id = %stored.id, "Inserted movie");
        Ok(stored)
    }

    #[instrument(skip(self, patch), fields(%id))]
    async fn update_movie(&self, id: &MovieId, patch: &MoviePatch) -> Result<Movie> {
        self.require_user().await?;
        let _lock = self.inner.store.lock_catalog()?;
        let mut movie = self
            .inner
            .store
            .read_movie(id)?
            .ok_or_else(|| Error::not_found(id))?;
        patch.apply_to(&mut movie);
        self.inner.store.write_movie(&movie)?;
        Ok(movie)
    }

    #[instrument(skip(self), fields(%id))]
    async fn delete_movie(&self, id: &MovieId) -> Result<()> {
        self.require_user().await?;
        let _lock = self.inner.store.lock_catalog()?;
        if !self.inner.store.remove_movie(id)? {
            return Err(Error::not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(%id))]
    async fn increment_views(&self, id: &MovieId) -> Result<()> {
        self.update_counter(id, |m| m.views = m.views.saturating_add(1))
    }

    #[instrument(skip(self), fields(%id))]
    async fn increment_downloads(&self, id: &MovieId) -> Result<()> {
        self.update_counter(id, |m| m.downloads = m.downloads.saturating_add(1))
    }
}

#[async_trait]
impl StorageGateway for FileGateway {
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        self.require_user().await?;
        self.inner.store.put_object(bucket, key, &bytes)?;
        debug!(%bucket, %key, %content_type, "Object stored");
        Ok(key.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> Result<Url> {
        let file = self.inner.store.object_path(bucket, path)?;
        Url::from_file_path(&file).map_err(|()| {
            InvalidInputError::Other {
                message: format!("cannot express '{}' as a URL", file.display()),
            }
            .into()
        })
    }
}

impl std::fmt::Debug for FileGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileGateway")
            .field("root", &self.root())
            .field("session", &"[REDACTED]")
            .finish()
    }
}
