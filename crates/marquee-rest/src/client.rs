//! HTTP client for the hosted backend.

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use marquee_core::error::{ProtocolError, TransportError};
use marquee_core::{AccessToken, ApiKey, Error, GatewayUrl, Result};

use crate::endpoints::ErrorBody;

/// Header carrying the project's public API key.
const API_KEY_HEADER: &str = "apikey";

/// HTTP client bound to one backend project.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base: GatewayUrl,
    api_key: ApiKey,
}

impl RestClient {
    pub fn new(base: GatewayUrl, api_key: ApiKey) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(transport)?;

        Ok(Self {
            http,
            base,
            api_key,
        })
    }

    pub fn base(&self) -> &GatewayUrl {
        &self.base
    }

    /// Start a request to `url`.
    ///
    /// Authorized as the signed-in user when `token` is given, otherwise as
    /// the anonymous role through the API key.
    pub fn request(
        &self,
        method: Method,
        url: impl reqwest::IntoUrl,
        token: Option<&AccessToken>,
    ) -> RequestBuilder {
        let bearer = token.map_or(self.api_key.as_str(), AccessToken::as_str);
        self.http
            .request(method, url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(AUTHORIZATION, format!("Bearer {}", bearer))
    }

    /// Start a request to an endpoint path below the base URL.
    pub fn endpoint(&self, method: Method, path: &str, token: Option<&AccessToken>) -> RequestBuilder {
        self.request(method, self.base.endpoint(path), token)
    }

    /// Send and decode a JSON reply.
    #[instrument(skip(self, request))]
    pub async fn send_json<R>(&self, request: RequestBuilder) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.send(request).await?;
        response.json::<R>().await.map_err(transport)
    }

    /// Send and ignore the reply body.
    #[instrument(skip(self, request))]
    pub async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        self.send(request).await.map(|_| ())
    }

    /// Send, turning non-success statuses into [`ProtocolError`]s.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        match self.send_raw(request).await? {
            Ok(response) => Ok(response),
            Err((status, body)) => Err(body.into_protocol_error(status).into()),
        }
    }

    /// Send, handing non-success replies back with their parsed body.
    pub async fn send_raw(
        &self,
        request: RequestBuilder,
    ) -> Result<std::result::Result<Response, (u16, ErrorBody)>> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        trace!(%status, url = %response.url(), "Response");

        if status.is_success() {
            return Ok(Ok(response));
        }

        let status = status.as_u16();
        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        debug!(status, ?body, "Request failed");
        Ok(Err((status, body)))
    }
}

/// Map a reqwest failure onto the transport error variants.
pub fn transport(err: reqwest::Error) -> Error {
    let err = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}

/// Error for a reply that succeeded but carried nothing usable.
pub fn empty_reply(status: u16, what: &str) -> Error {
    ProtocolError::new(status, None, Some(format!("{} returned no rows", what))).into()
}
