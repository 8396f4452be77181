//! Gateway selection for the CLI.

use async_trait::async_trait;
use url::Url;

use marquee_core::traits::{AuthGateway, CatalogGateway, StorageGateway};
use marquee_core::{
    ApiKey, AuthEventStream, AuthSession, Credentials, GatewayUrl, Movie, MovieId, MoviePatch,
    NewMovie, Result,
};
use marquee_file::FileGateway;
use marquee_rest::RestGateway;

/// The gateway a command runs against.
#[derive(Debug, Clone)]
pub enum CliGateway {
    File(FileGateway),
    Rest(RestGateway),
}

impl CliGateway {
    /// Pick the implementation from the URL scheme.
    pub fn connect(url: GatewayUrl, api_key: Option<ApiKey>) -> anyhow::Result<Self> {
        if url.is_local() {
            return Ok(CliGateway::File(FileGateway::from_url(url)?));
        }
        let api_key = api_key.ok_or_else(|| {
            anyhow::anyhow!("An API key is required for {}. Pass --api-key or set MARQUEE_API_KEY.", url)
        })?;
        Ok(CliGateway::Rest(RestGateway::new(url, api_key)?))
    }

    pub fn url(&self) -> &GatewayUrl {
        match self {
            CliGateway::File(gateway) => gateway.url(),
            CliGateway::Rest(gateway) => gateway.base(),
        }
    }

    pub fn as_file(&self) -> Option<&FileGateway> {
        match self {
            CliGateway::File(gateway) => Some(gateway),
            CliGateway::Rest(_) => None,
        }
    }

    pub async fn restore_session(&self, session: AuthSession) {
        match self {
            CliGateway::File(gateway) => gateway.restore_session(session).await,
            CliGateway::Rest(gateway) => gateway.restore_session(session).await,
        }
    }

    pub async fn session(&self) -> Option<AuthSession> {
        match self {
            CliGateway::File(gateway) => gateway.session().await,
            CliGateway::Rest(gateway) => gateway.session().await,
        }
    }
}

#[async_trait]
impl AuthGateway for CliGateway {
    async fn sign_in(&self, credentials: Credentials) -> Result<AuthSession> {
        match self {
            CliGateway::File(gateway) => gateway.sign_in(credentials).await,
            CliGateway::Rest(gateway) => gateway.sign_in(credentials).await,
        }
    }

    async fn sign_out(&self) -> Result<()> {
        match self {
            CliGateway::File(gateway) => gateway.sign_out().await,
            CliGateway::Rest(gateway) => gateway.sign_out().await,
        }
    }

    async fn current_session(&self) -> Result<Option<AuthSession>> {
        match self {
            CliGateway::File(gateway) => gateway.current_session().await,
            CliGateway::Rest(gateway) => gateway.current_session().await,
        }
    }

    fn auth_events(&self) -> AuthEventStream {
        match self {
            CliGateway::File(gateway) => gateway.auth_events(),
            CliGateway::Rest(gateway) => gateway.auth_events(),
        }
    }
}

#[async_trait]
impl CatalogGateway for CliGateway {
    async fn list_movies(&self) -> Result<Vec<Movie>> {
        match self {
            CliGateway::File(gateway) => gateway.list_movies().await,
            CliGateway::Rest(gateway) => gateway.list_movies().await,
        }
    }

    async fn insert_movie(&self, movie: &NewMovie) -> Result<Movie> {
        match self {
            CliGateway::File(gateway) => gateway.insert_movie(movie).await,
            CliGateway::Rest(gateway) => gateway.insert_movie(movie).await,
        }
    }

    async fn update_movie(&self, id: &MovieId, patch: &MoviePatch) -> Result<Movie> {
        match self {
            CliGateway::File(gateway) => gateway.update_movie(id, patch).await,
            CliGateway::Rest(gateway) => gateway.update_movie(id, patch).await,
        }
    }

    async fn delete_movie(&self, id: &MovieId) -> Result<()> {
        match self {
            CliGateway::File(gateway) => gateway.delete_movie(id).await,
            CliGateway::Rest(gateway) => gateway.delete_movie(id).await,
        }
    }

    async fn increment_views(&self, id: &MovieId) -> Result<()> {
        match self {
            CliGateway::File(gateway) => gateway.increment_views(id).await,
            CliGateway::Rest(gateway) => gateway.increment_views(id).await,
        }
    }

    async fn increment_downloads(&self, id: &MovieId) -> Result<()> {
        match self {
            CliGateway::File(gateway) => gateway.increment_downloads(id).await,
            CliGateway::Rest(gateway) => gateway.increment_downloads(id).await,
        }
    }
}

#[async_trait]
impl StorageGateway for CliGateway {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        match self {
            CliGateway::File(gateway) => gateway.upload(bucket, key, bytes, content_type).await,
            CliGateway::Rest(gateway) => gateway.upload(bucket, key, bytes, content_type).await,
        }
    }

    fn public_url(&self, bucket: &str, path: &str) -> Result<Url> {
        match self {
            CliGateway::File(gateway) => gateway.public_url(bucket, path),
            CliGateway::Rest(gateway) => gateway.public_url(bucket, path),
        }
    }
}
