//! Movie identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Maximum identifier length accepted from the gateway.
const MAX_LEN: usize = 128;

/// An opaque movie identifier assigned by the gateway.
///
/// The client never generates identifiers; it only checks that a value is
/// plausible (non-empty, bounded, no whitespace or control characters)
/// before using it in a request.
///
/// # Example
///
/// ```
/// use marquee_core::MovieId;
///
/// let id = MovieId::new("5f0c6a52-1c1e-4f53-9d0e-8b8f0c3b1a77").unwrap();
/// assert_eq!(id.as_str(), "5f0c6a52-1c1e-4f53-9d0e-8b8f0c3b1a77");
/// assert!(MovieId::new("not an id").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MovieId(String);

impl MovieId {
    /// Create a movie identifier, validating the format.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        let reason = if s.is_empty() {
            Some("must not be empty")
        } else if s.len() > MAX_LEN {
            Some("too long")
        } else if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            Some("must not contain whitespace or control characters")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InvalidInputError::MovieId {
                value: s,
                reason: reason.to_string(),
            }
            .into()),
            None => Ok(Self(s)),
        }
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MovieId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for MovieId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for MovieId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MovieId::new(s).map_err(serde::de::Error::custom)
    }
}
