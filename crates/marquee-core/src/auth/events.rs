//! Session-change notifications.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{trace, warn};

use super::session::AuthSession;

/// Buffered events per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 16;

/// Kind of session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// A session change pushed by the gateway.
#[derive(Debug, Clone)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    /// The session after the change; `None` after a sign-out.
    pub session: Option<AuthSession>,
}

impl AuthEvent {
    pub fn signed_in(session: AuthSession) -> Self {
        Self {
            kind: AuthEventKind::SignedIn,
            session: Some(session),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            kind: AuthEventKind::SignedOut,
            session: None,
        }
    }

    pub fn token_refreshed(session: AuthSession) -> Self {
        Self {
            kind: AuthEventKind::TokenRefreshed,
            session: Some(session),
        }
    }
}

/// Stream of session changes.
pub struct AuthEventStream {
    inner: Pin<Box<dyn Stream<Item = AuthEvent> + Send>>,
}

impl AuthEventStream {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = AuthEvent> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for AuthEventStream {
    type Item = AuthEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for AuthEventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEventStream").finish_non_exhaustive()
    }
}

/// Fan-out point for session changes inside a gateway implementation.
///
/// Every stream returned by [`subscribe`](Self::subscribe) sees the events
/// emitted after the call.
#[derive(Debug, Clone)]
pub struct AuthEventHub {
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthEventHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    pub fn emit(&self, event: AuthEvent) {
        let kind = event.kind;
        if self.tx.send(event).is_err() {
            trace!(?kind, "No auth event subscribers");
        }
    }

    /// Subscribe to events emitted from now on.
    pub fn subscribe(&self) -> AuthEventStream {
        // Register the receiver before returning so no event emitted after
        // this call is missed.
        let mut rx = self.tx.subscribe();

        let stream = async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        yield event;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Auth event subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        };

        AuthEventStream::new(stream)
    }
}

impl Default for AuthEventHub {
    fn default() -> Self {
        Self::new()
    }
}
