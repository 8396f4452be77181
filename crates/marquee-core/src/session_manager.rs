//! Session manager.
//!
//! Tracks whether an administrator is signed in. The gateway's session-change
//! events are the only thing that moves the state; `login` and `logout` just
//! forward to the gateway and report failures.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::Result;
use crate::auth::{AuthEvent, AuthEventKind, Credentials, Redirect, SessionState};
use crate::error::InvalidInputError;
use crate::notice::{Notice, Notifier};
use crate::traits::AuthGateway;

/// Where the user currently is, and how to send them elsewhere.
pub trait Navigator: Send + Sync {
    /// Current location, e.g. `/admin/movies/new`.
    fn current_path(&self) -> String;

    /// Follow a redirect produced by a session change.
    fn navigate(&self, redirect: Redirect);
}

/// Owns the client-side [`SessionState`].
pub struct SessionManager<G: ?Sized> {
    gateway: Arc<G>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<SessionState>,
    subscribed: Arc<AtomicBool>,
}

impl<G> SessionManager<G>
where
    G: AuthGateway + ?Sized + 'static,
{
    pub fn new(gateway: Arc<G>, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            gateway,
            notifier,
            state,
            subscribed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every published state.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    /// Resolve the initial `Unknown` state from the gateway's current session.
    ///
    /// Errors count as anonymous. Once the state is resolved the probe result
    /// is discarded and the current state returned.
    #[instrument(skip(self))]
    pub async fn probe(&self) -> SessionState {
        let session = match self.gateway.current_session().await {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "Error fetching session");
                None
            }
        };
        let probed = SessionState::from_session(session);
        debug!(is_admin = probed.is_admin(), "Session probed");
        // A session event applied while the probe was in flight wins.
        self.state.send_if_modified(|state| {
            if state.is_resolved() {
                return false;
            }
            *state = probed;
            true
        });
        self.state()
    }

    /// Sign in. Returns whether the gateway accepted the credentials.
    ///
    /// The state only changes once the resulting sign-in event arrives.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: Credentials) -> bool {
        match self.gateway.sign_in(credentials).await {
            Ok(_) => {
                info!("Login accepted");
                true
            }
            Err(e) => {
                error!(error = %e, "Error logging in");
                self.notifier
                    .notify(Notice::error(format!("Login failed: {}", e)));
                false
            }
        }
    }

    /// Sign out. Failures are reported, never returned.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.gateway.sign_out().await {
            error!(error = %e, "Error logging out");
            self.notifier
                .notify(Notice::error(format!("Logout failed: {}", e)));
        }
    }

    /// Apply a session change and return the navigation it calls for.
    pub fn on_session_change(&self, event: AuthEvent, current_path: &str) -> Option<Redirect> {
        debug!(kind = ?event.kind, "Session change");
        match event.kind {
            AuthEventKind::SignedIn => {
                self.state
                    .send_replace(SessionState::from_session(event.session));
                Some(Redirect::after_sign_in(current_path))
            }
            AuthEventKind::SignedOut => {
                self.state.send_replace(SessionState::Anonymous);
                Some(Redirect::Login)
            }
            AuthEventKind::TokenRefreshed => {
                self.state
                    .send_replace(SessionState::from_session(event.session));
                None
            }
        }
    }

    /// Start applying the gateway's session events.
    ///
    /// Only one subscription may be live at a time. Dropping the returned
    /// handle stops it.
    pub fn subscribe(
        self: &Arc<Self>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<SessionSubscription> {
        if self
            .subscribed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(InvalidInputError::Other {
                message: "session events already subscribed".to_string(),
            }
            .into());
        }

        let mut events = self.gateway.auth_events();
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let path = navigator.current_path();
                if let Some(redirect) = manager.on_session_change(event, &path) {
                    navigator.navigate(redirect);
                }
            }
            warn!("Session event stream ended");
        });

        Ok(SessionSubscription {
            handle: Some(handle),
            slot: Arc::clone(&self.subscribed),
        })
    }
}

impl<G: ?Sized> std::fmt::Debug for SessionManager<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.state.borrow())
            .field("subscribed", &self.subscribed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Handle on the task applying session events.
#[derive(Debug)]
pub struct SessionSubscription {
    handle: Option<JoinHandle<()>>,
    slot: Arc<AtomicBool>,
}

impl SessionSubscription {
    /// Stop applying events.
    pub fn unsubscribe(mut self) {
        self.stop();
    }

    /// True while the event task is running.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            self.slot.store(false, Ordering::Release);
        }
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}
