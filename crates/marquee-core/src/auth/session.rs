//! Session and route gating types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::tokens::{AccessToken, RefreshToken};

/// Path prefix of the admin area.
pub const ADMIN_PREFIX: &str = "/admin";

/// Admin landing page after sign-in.
pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";

/// Admin login screen.
pub const ADMIN_LOGIN: &str = "/admin";

/// Access tokens this close to expiry are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 10;

/// The identity behind an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Gateway-assigned user id.
    pub id: String,
    /// Email address, when the gateway reports one.
    pub email: Option<String>,
}

/// An authenticated session issued by the gateway.
#[derive(Debug, Clone)]
pub struct AuthSession {
    user: User,
    access_token: AccessToken,
    refresh_token: Option<RefreshToken>,
    expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    pub fn new(
        user: User,
        access_token: AccessToken,
        refresh_token: Option<RefreshToken>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user,
            access_token,
            refresh_token,
            expires_at,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns true if the access token has expired (or is about to) at `now`.
    ///
    /// Sessions without an expiry never expire on the client side.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|at| at <= now + Duration::seconds(EXPIRY_MARGIN_SECS))
    }
}

/// The client's view of the current authentication state.
///
/// Starts as `Unknown` until the first probe of the gateway resolves, so that
/// admin screens can wait instead of flashing a login form for a session that
/// is about to be restored.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Unknown,
    Anonymous,
    Authenticated(AuthSession),
}

impl SessionState {
    /// Build the state matching an optional session.
    pub fn from_session(session: Option<AuthSession>) -> Self {
        match session {
            Some(session) => SessionState::Authenticated(session),
            None => SessionState::Anonymous,
        }
    }

    /// True iff an identity is present.
    pub fn is_admin(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// True once the state is known to be anonymous or authenticated.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, SessionState::Unknown)
    }

    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(AuthSession::user)
    }

    /// Decide how a screen at `path` should be handled in this state.
    pub fn gate(&self, path: &str) -> RouteGate {
        if !is_admin_path(path) {
            return RouteGate::Render;
        }
        match self {
            SessionState::Unknown => RouteGate::Loading,
            SessionState::Anonymous => RouteGate::Login,
            SessionState::Authenticated(_) => RouteGate::Render,
        }
    }
}

/// Outcome of gating a route on the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGate {
    /// Show the requested screen.
    Render,
    /// Session not resolved yet; show a placeholder.
    Loading,
    /// Admin screen without a session; show the login form.
    Login,
}

/// Navigation requested by a session transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Go to the given path inside the admin area.
    AdminArea(String),
    /// Go to the admin login screen.
    Login,
}

impl Redirect {
    /// Redirect after a sign-in: stay on an admin path, otherwise go to the
    /// dashboard.
    pub fn after_sign_in(current_path: &str) -> Self {
        if is_admin_path(current_path) && current_path != ADMIN_LOGIN {
            Redirect::AdminArea(current_path.to_string())
        } else {
            Redirect::AdminArea(ADMIN_DASHBOARD.to_string())
        }
    }

    /// Target path of this redirect.
    pub fn path(&self) -> &str {
        match self {
            Redirect::AdminArea(path) => path,
            Redirect::Login => ADMIN_LOGIN,
        }
    }
}

fn is_admin_path(path: &str) -> bool {
    path.strip_prefix(ADMIN_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
