//! Authentication types and session state.
//!
//! The gateway owns the authoritative session. Clients learn about changes to
//! it through [`AuthEvent`]s and mirror it as a [`SessionState`].

mod credentials;
mod events;
mod session;
mod tokens;

pub use credentials::Credentials;
pub use events::{AuthEvent, AuthEventHub, AuthEventKind, AuthEventStream};
pub use session::{
    ADMIN_DASHBOARD, ADMIN_LOGIN, ADMIN_PREFIX, AuthSession, Redirect, RouteGate, SessionState,
    User,
};
pub use tokens::{AccessToken, ApiKey, RefreshToken};
