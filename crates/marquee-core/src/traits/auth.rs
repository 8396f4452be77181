//! Authentication gateway trait.

use async_trait::async_trait;

use crate::Result;
use crate::auth::{AuthEventStream, AuthSession, Credentials};

/// Hosted authentication.
///
/// Implementations hold the current session themselves and announce every
/// change to it on [`auth_events`](Self::auth_events), including changes
/// caused by [`sign_in`](Self::sign_in) and [`sign_out`](Self::sign_out).
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Authenticate and start a session.
    async fn sign_in(&self, credentials: Credentials) -> Result<AuthSession>;

    /// End the current session.
    async fn sign_out(&self) -> Result<()>;

    /// The current session, if any, refreshed first when it has expired.
    async fn current_session(&self) -> Result<Option<AuthSession>>;

    /// Subscribe to session changes from now on.
    fn auth_events(&self) -> AuthEventStream;
}
