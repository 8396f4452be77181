//! Endpoint paths and wire types.

use serde::{Deserialize, Serialize};

use marquee_core::error::ProtocolError;

pub const TOKEN: &str = "auth/v1/token";
pub const LOGOUT: &str = "auth/v1/logout";
pub const MOVIES: &str = "rest/v1/movies";
pub const INCREMENT_VIEWS: &str = "rest/v1/rpc/increment_views";
pub const INCREMENT_DOWNLOADS: &str = "rest/v1/rpc/increment_downloads";

/// Columns and order for the catalog listing.
pub const LIST_QUERY: [(&str, &str); 2] = [("select", "*"), ("order", "created_at.desc")];

/// Ask the row store to echo the affected rows.
pub const RETURN_REPRESENTATION: &str = "return=representation";

/// Cache lifetime for uploaded objects.
pub const OBJECT_CACHE_CONTROL: &str = "max-age=3600";

#[derive(Debug, Serialize)]
pub struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IncrementRequest<'a> {
    pub movie_id_param: &'a str,
}

/// Storage reply; `Key` is `<bucket>/<path>`.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "Key", default)]
    pub key: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl UploadResponse {
    /// Object path inside `bucket`.
    pub fn object_path(self, bucket: &str) -> Option<String> {
        if let Some(path) = self.path.filter(|p| !p.is_empty()) {
            return Some(path);
        }
        let key = self.key?;
        let path = key
            .strip_prefix(bucket)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(&key);
        (!path.is_empty()).then(|| path.to_string())
    }
}

/// Error body of any of the three services.
///
/// Auth replies with `error`/`error_description` or `error_code`/`msg`, the
/// row store with `code`/`message`, storage with `statusCode`/`error`/`message`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "statusCode", default)]
    pub status_code: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Status the service meant, which storage sometimes only reports in the body.
    pub fn effective_status(&self, status: u16) -> u16 {
        self.status_code
            .as_ref()
            .and_then(|v| match v {
                serde_json::Value::String(s) => s.parse().ok(),
                serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
                _ => None,
            })
            .unwrap_or(status)
    }

    pub fn into_protocol_error(self, status: u16) -> ProtocolError {
        let code = self
            .error_code
            .or(match self.code {
                Some(serde_json::Value::String(s)) => Some(s),
                _ => None,
            })
            .or(self.error.clone());
        let message = self
            .message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error);
        ProtocolError::new(status, code, message)
    }
}
