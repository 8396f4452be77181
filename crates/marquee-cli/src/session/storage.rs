//! Session storage for persisting login state.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use marquee_core::{AccessToken, ApiKey, AuthSession, GatewayUrl, RefreshToken, User};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredSession {
    pub gateway: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredSession {
    pub fn new(gateway: &GatewayUrl, api_key: Option<&ApiKey>, session: &AuthSession) -> Self {
        Self {
            gateway: gateway.to_string(),
            api_key: api_key.map(|k| k.as_str().to_string()),
            user_id: session.user().id.clone(),
            email: session.user().email.clone(),
            access_token: session.access_token().as_str().to_string(),
            refresh_token: session.refresh_token().map(|t| t.as_str().to_string()),
            expires_at: session.expires_at(),
        }
    }

    pub fn gateway_url(&self) -> Result<GatewayUrl> {
        GatewayUrl::new(&self.gateway).context("Invalid gateway URL in session")
    }

    pub fn api_key(&self) -> Option<ApiKey> {
        self.api_key.clone().map(ApiKey::new)
    }

    pub fn to_session(&self) -> AuthSession {
        AuthSession::new(
            User {
                id: self.user_id.clone(),
                email: self.email.clone(),
            },
            AccessToken::new(self.access_token.clone()),
            self.refresh_token.clone().map(RefreshToken::new),
            self.expires_at,
        )
    }
}

/// Get the session file path.
fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "marquee").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Save a session to disk, readable by the owner only.
pub fn save(stored: &StoredSession) -> Result<()> {
    let path = session_path()?;
    let json = serde_json::to_string_pretty(stored)?;

    fs::write(&path, &json).context("Failed to write session file")?;

    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(())
}

/// Load the saved session, if any.
pub fn load() -> Result<Option<StoredSession>> {
    let path = session_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path).context("Failed to read session file")?;
    let stored = serde_json::from_str(&json).context("Invalid session file")?;
    Ok(Some(stored))
}

/// Clear the stored session.
pub fn clear() -> Result<()> {
    let path = session_path()?;

    if path.exists() {
        fs::remove_file(&path).context("Failed to remove session file")?;
    }

    Ok(())
}
