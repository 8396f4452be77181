//! Gateway URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL of the Remote Gateway.
///
/// Two kinds of gateway are supported:
///
/// - Network gateways (`https://`, or `http://` for localhost) point at a
///   hosted project.
/// - Local gateways (`file:///path/to/dir`) keep the catalog in a directory,
///   which is handy for development and tests.
///
/// # Example
///
/// ```
/// use marquee_core::GatewayUrl;
///
/// let gateway = GatewayUrl::new("https://demo.example.co").unwrap();
/// assert_eq!(gateway.endpoint("/rest/v1/movies"), "https://demo.example.co/rest/v1/movies");
///
/// let local = GatewayUrl::new("file:///tmp/catalog").unwrap();
/// assert!(local.is_local());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GatewayUrl(Url);

impl GatewayUrl {
    /// Create a new gateway URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or uses an unsupported scheme.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::GatewayUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the URL of an endpoint path below the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Returns the URL formed by appending percent-encoded path segments.
    pub fn join_segments<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, Error> {
        let mut url = self.0.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| InvalidInputError::GatewayUrl {
                    value: self.0.to_string(),
                    reason: "cannot be a base URL".to_string(),
                })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns true if this is a local directory gateway (file:// URL).
    pub fn is_local(&self) -> bool {
        self.0.scheme() == "file"
    }

    /// Returns true if this is a network gateway (http:// or https:// URL).
    pub fn is_network(&self) -> bool {
        matches!(self.0.scheme(), "http" | "https")
    }

    /// Returns the filesystem path for file:// URLs.
    ///
    /// Returns `None` for network URLs.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.is_local() {
            self.0.to_file_path().ok()
        } else {
            None
        }
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::GatewayUrl {
                value: original.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }

        match url.scheme() {
            "file" => {
                if url.path().is_empty() || url.path() == "/" {
                    return Err(invalid("file:// URL must name a directory"));
                }
                Ok(())
            }
            scheme => {
                let is_localhost = url
                    .host_str()
                    .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

                if scheme != "https" && !(scheme == "http" && is_localhost) {
                    return Err(invalid("must use HTTPS (HTTP allowed only for localhost)"));
                }
                if url.host_str().is_none() {
                    return Err(invalid("must have a host"));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for GatewayUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GatewayUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for GatewayUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for GatewayUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        GatewayUrl::new(&s).map_err(serde::de::Error::custom)
    }
}
