//! Error types for marquee.
//!
//! [`Error`] carries the detail a gateway implementation reports. Callers that
//! only need to decide how to react use [`Error::kind`], which folds every
//! failure into the small [`ErrorKind`] taxonomy.

use std::fmt;
use thiserror::Error;

/// The unified error type for marquee operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (bad credentials, expired session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Error responses reported by the gateway.
    #[error("gateway error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Object storage upload errors.
    #[error("upload failed: {0}")]
    Upload(#[from] UploadError),

    /// The referenced movie does not exist.
    #[error("movie {id} not found")]
    NotFound { id: String },
}

impl Error {
    /// Create a not-found error for the given identifier.
    pub fn not_found(id: impl fmt::Display) -> Self {
        Error::NotFound { id: id.to_string() }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) => ErrorKind::NetworkFailure,
            Error::Auth(AuthError::NotSignedIn) => ErrorKind::AuthorizationDenied,
            Error::Auth(_) => ErrorKind::AuthenticationFailure,
            Error::Protocol(err) => err.kind(),
            Error::InvalidInput(_) => ErrorKind::ValidationFailure,
            Error::Upload(_) => ErrorKind::UploadFailure,
            Error::NotFound { .. } => ErrorKind::NotFound,
        }
    }
}

/// Coarse classification of failures, used to pick the user-facing reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Credentials rejected or session no longer valid.
    AuthenticationFailure,
    /// The gateway's access policy refused the operation.
    AuthorizationDenied,
    /// Missing or malformed input.
    ValidationFailure,
    /// The gateway could not be reached or failed internally.
    NetworkFailure,
    /// Storing a media object failed.
    UploadFailure,
    /// The referenced entry does not exist.
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::AuthenticationFailure => "authentication failure",
            ErrorKind::AuthorizationDenied => "authorization denied",
            ErrorKind::ValidationFailure => "validation failure",
            ErrorKind::NetworkFailure => "network failure",
            ErrorKind::UploadFailure => "upload failure",
            ErrorKind::NotFound => "not found",
        };
        f.write_str(s)
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// Local filesystem error.
    #[error("IO error: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Session has expired.
    #[error("session expired")]
    SessionExpired,

    /// Refresh token is invalid or expired.
    #[error("refresh token invalid")]
    RefreshTokenInvalid,

    /// The operation needs a signed-in session.
    #[error("sign in required")]
    NotSignedIn,
}

/// Error response reported by the gateway.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (if present).
    pub code: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

/// Row-store code for an access policy violation.
const POLICY_VIOLATION: &str = "42501";

/// Row-store code for "no rows returned for a single-row request".
const NO_ROWS: &str = "PGRST116";

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, code: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            code,
            message,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
            || matches!(
                self.code.as_deref(),
                Some("invalid_grant" | "invalid_credentials" | "bad_jwt" | "PGRST301")
            )
    }

    /// Check if the gateway's access policy rejected the request.
    pub fn is_policy_violation(&self) -> bool {
        self.status == 403 || self.code.as_deref() == Some(POLICY_VIOLATION)
    }

    /// Check if the request was rejected as malformed or violating a constraint.
    pub fn is_validation_error(&self) -> bool {
        // Class 22 is data exceptions, class 23 integrity constraint violations.
        let constraint = self
            .code
            .as_deref()
            .is_some_and(|c| c.len() == 5 && (c.starts_with("22") || c.starts_with("23")));
        constraint || self.status == 400 || self.status == 422
    }

    /// Check if the requested entity does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status == 404 || self.code.as_deref() == Some(NO_ROWS)
    }

    /// Classify this response.
    pub fn kind(&self) -> ErrorKind {
        if self.is_policy_violation() || self.is_auth_error() {
            ErrorKind::AuthorizationDenied
        } else if self.is_not_found() {
            ErrorKind::NotFound
        } else if self.is_validation_error() {
            ErrorKind::ValidationFailure
        } else {
            ErrorKind::NetworkFailure
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid gateway URL.
    #[error("invalid gateway URL '{value}': {reason}")]
    GatewayUrl { value: String, reason: String },

    /// Invalid movie identifier.
    #[error("invalid movie id '{value}': {reason}")]
    MovieId { value: String, reason: String },

    /// Unknown genre name.
    #[error("unknown genre '{value}'")]
    Genre { value: String },

    /// Rating outside 0.0-10.0.
    #[error("invalid rating {value}: must be between 0.0 and 10.0")]
    Rating { value: f64 },

    /// Invalid release date.
    #[error("invalid release date '{value}': expected YYYY-MM-DD")]
    ReleaseDate { value: String },

    /// A required field is missing or blank.
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    /// Generic invalid input.
    #[error("{message}")]
    Other { message: String },
}

/// Object storage upload errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The storage service refused the object.
    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// An object already exists under the key and overwriting is disabled.
    #[error("object '{key}' already exists")]
    Conflict { key: String },

    /// The upload succeeded but no object path came back.
    #[error("upload succeeded but no path was returned")]
    MissingPath,

    /// Any other failure while transferring the object.
    #[error("{message}")]
    Failed { message: String },
}
