//! Hosted backend gateway.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use url::Url;

use marquee_core::error::{AuthError, UploadError};
use marquee_core::traits::{AuthGateway, CatalogGateway, StorageGateway};
use marquee_core::{
    AccessToken, ApiKey, AuthEvent, AuthEventHub, AuthEventStream, AuthSession, Credentials,
    Error, GatewayUrl, Movie, MovieId, MoviePatch, NewMovie, RefreshToken, Result, User,
};

use crate::client::{RestClient, empty_reply, transport};
use crate::endpoints::*;

/// Gateway backed by a hosted project.
///
/// Cloning is cheap; clones share the session and the event hub.
#[derive(Clone)]
pub struct RestGateway {
    inner: Arc<Inner>,
}

struct Inner {
    client: RestClient,
    session: RwLock<Option<AuthSession>>,
    events: AuthEventHub,
}

impl RestGateway {
    pub fn new(base: GatewayUrl, api_key: ApiKey) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(Inner {
                client: RestClient::new(base, api_key)?,
                session: RwLock::new(None),
                events: AuthEventHub::new(),
            }),
        })
    }

    pub fn base(&self) -> &GatewayUrl {
        self.inner.client.base()
    }

    /// Put a persisted session back in place without announcing it.
    pub async fn restore_session(&self, session: AuthSession) {
        *self.inner.session.write().await = Some(session);
    }

    /// The held session, as is.
    pub async fn session(&self) -> Option<AuthSession> {
        self.inner.session.read().await.clone()
    }

    /// Exchange the refresh token for a new session.
    #[instrument(skip(self))]
    pub async fn refresh_session(&self) -> Result<AuthSession> {
        let refresh_token = self
            .session()
            .await
            .and_then(|s| s.refresh_token().cloned())
            .ok_or(AuthError::RefreshTokenInvalid)?;

        info!("Refreshing session");
        let request = self
            .inner
            .client
            .endpoint(Method::POST, TOKEN, None)
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshGrant {
                refresh_token: refresh_token.as_str(),
            });
        let response: TokenResponse = match self.inner.client.send_json(request).await {
            Ok(response) => response,
            Err(Error::Protocol(err)) if err.is_auth_error() || err.status == 400 => {
                return Err(AuthError::RefreshTokenInvalid.into());
            }
            Err(e) => return Err(e),
        };

        let session = session_from(response, Utc::now());
        *self.inner.session.write().await = Some(session.clone());
        self.inner
            .events
            .emit(AuthEvent::token_refreshed(session.clone()));
        debug!("Session refreshed");
        Ok(session)
    }

    async fn access_token(&self) -> Option<AccessToken> {
        self.inner
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token().clone())
    }

    async fn clear_session(&self) {
        *self.inner.session.write().await = None;
        self.inner.events.emit(AuthEvent::signed_out());
    }

    fn movie_filter(id: &MovieId) -> [(&'static str, String); 1] {
        [("id", format!("eq.{}", id))]
    }
}

fn session_from(response: TokenResponse, now: DateTime<Utc>) -> AuthSession {
    let expires_at = response
        .expires_at
        .and_then(|at| DateTime::from_timestamp(at, 0))
        .or_else(|| response.expires_in.map(|secs| now + Duration::seconds(secs)));
    AuthSession::new(
        User {
            id: response.user.id,
            email: response.user.email,
        },
        AccessToken::new(response.access_token),
        response.refresh_token.map(RefreshToken::new),
        expires_at,
    )
}

#[async_trait]
impl AuthGateway for RestGateway {
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    async fn sign_in(&self, credentials: Credentials) -> Result<AuthSession> {
        debug!("Signing in");
        let request = self
            .inner
            .client
            .endpoint(Method::POST, TOKEN, None)
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant {
                email: credentials.email(),
                password: credentials.password(),
            });

        let response: TokenResponse = match self.inner.client.send_json(request).await {
            Ok(response) => response,
            Err(Error::Protocol(err)) if matches!(err.status, 400 | 401) => {
                let message = err
                    .message
                    .clone()
                    .unwrap_or_else(|| "Invalid login credentials".to_string());
                return Err(AuthError::InvalidCredentials(message).into());
            }
            Err(e) => return Err(e),
        };

        let session = session_from(response, Utc::now());
        *self.inner.session.write().await = Some(session.clone());
        info!(user = %session.user().id, "Signed in");
        self.inner.events.emit(AuthEvent::signed_in(session.clone()));
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<()> {
        if let Some(token) = self.access_token().await {
            let request = self.inner.client.endpoint(Method::POST, LOGOUT, Some(&token));
            match self.inner.client.send_empty(request).await {
                Ok(()) => {}
                // The server no longer knows the session; it is gone either way.
                Err(Error::Protocol(err)) if matches!(err.status, 401 | 403 | 404) => {
                    debug!(status = err.status, "Session already ended on the server");
                }
                Err(e) => return Err(e),
            }
        }
        self.clear_session().await;
        info!("Signed out");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn current_session(&self) -> Result<Option<AuthSession>> {
        let Some(session) = self.session().await else {
            return Ok(None);
        };
        if !session.is_expired_at(Utc::now()) {
            return Ok(Some(session));
        }

        match self.refresh_session().await {
            Ok(session) => Ok(Some(session)),
            Err(Error::Auth(e)) => {
                warn!(error = %e, "Stored session could not be refreshed");
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
impl CatalogGateway for RestGateway {
    #[instrument(skip(self))]
    async fn list_movies(&self) -> Result<Vec<Movie>> {
        let token = self.access_token().await;
        let request = self
            .inner
            .client
            .endpoint(Method::GET, MOVIES, token.as_ref())
            .query(&LIST_QUERY);
        let movies: Vec<Movie> = self.inner.client.send_json(request).await?;
        debug!(count = movies.len(), "Listed movies");
        Ok(movies)
    }

    #[instrument(skip(self, movie), fields(title = %movie.fields.title))]
    async fn insert_movie(&self, movie: &NewMovie) -> Result<Movie> {
        let token = self.access_token().await;
        let request = self
            .inner
            .client
            .endpoint(Method::POST, MOVIES, token.as_ref())
            .header("Prefer", RETURN_REPRESENTATION)
            .json(movie);
        let rows: Vec<Movie> = self.inner.client.send_json(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| empty_reply(StatusCode::CREATED.as_u16(), "insert"))
    }

    #[instrument(skip(self, patch), fields(%id))]
    async fn update_movie(&self, id: &MovieId, patch: &MoviePatch) -> Result<Movie> {
        let token = self.access_token().await;
        let request = self
            .inner
            .client
            .endpoint(Method::PATCH, MOVIES, token.as_ref())
            .query(&Self::movie_filter(id))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(patch);
        let rows: Vec<Movie> = self.inner.client.send_json(request).await?;
        rows.into_iter().next().ok_or_else(|| Error::not_found(id))
    }

    #[instrument(skip(self), fields(%id))]
    async fn delete_movie(&self, id: &MovieId) -> Result<()> {
        let token = self.access_token().await;
        let request = self
            .inner
            .client
            .endpoint(Method::DELETE, MOVIES, token.as_ref())
            .query(&Self::movie_filter(id))
            .header("Prefer", RETURN_REPRESENTATION);
        let rows: Vec<serde_json::Value> = self.inner.client.send_json(request).await?;
        if rows.is_empty() {
            return Err(Error::not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(%id))]
    async fn increment_views(&self, id: &MovieId) -> Result<()> {
        self.increment(INCREMENT_VIEWS, id).await
    }

    #[instrument(skip(self), fields(%id))]
    async fn increment_downloads(&self, id: &MovieId) -> Result<()> {
        self.increment(INCREMENT_DOWNLOADS, id).await
    }
}

impl RestGateway {
    async fn increment(&self, procedure: &str, id: &MovieId) -> Result<()> {
        let token = self.access_token().await;
        let request = self
            .inner
            .client
            .endpoint(Method::POST, procedure, token.as_ref())
            .json(&IncrementRequest {
                movie_id_param: id.as_str(),
            });
        self.inner.client.send_empty(request).await
    }
}

#[async_trait]
impl StorageGateway for RestGateway {
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let url = self
            .base()
            .join_segments(["storage", "v1", "object", bucket].into_iter().chain(key.split('/')))?;
        let token = self.access_token().await;
        let request = self
            .inner
            .client
            .request(Method::POST, url, token.as_ref())
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, OBJECT_CACHE_CONTROL)
            .header("x-upsert", "false")
            .body(bytes);

        let response = match self.inner.client.send_raw(request).await? {
            Ok(response) => response,
            Err((status, body)) => {
                let status = body.effective_status(status);
                let err = body.into_protocol_error(status);
                let fallback = err.to_string();
                if status == StatusCode::CONFLICT.as_u16() {
                    return Err(UploadError::Conflict {
                        key: key.to_string(),
                    }
                    .into());
                }
                return Err(UploadError::Rejected {
                    status,
                    message: err.message.unwrap_or(fallback),
                }
                .into());
            }
        };

        let reply: UploadResponse = response.json().await.map_err(transport)?;
        let path = reply.object_path(bucket).ok_or(UploadError::MissingPath)?;
        info!(%bucket, %path, "Object stored");
        Ok(path)
    }

    fn public_url(&self, bucket: &str, path: &str) -> Result<Url> {
        self.base().join_segments(
            ["storage", "v1", "object", "public", bucket]
                .into_iter()
                .chain(path.split('/')),
        )
    }
}

impl std::fmt::Debug for RestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestGateway")
            .field("base", self.base())
            .field("session", &"[REDACTED]")
            .finish()
    }
}
