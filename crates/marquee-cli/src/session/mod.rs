//! Saved sign-in state and navigation for the CLI.

pub mod storage;

use tokio::sync::watch;
use tracing::debug;

use marquee_core::{Navigator, Redirect};

/// Tracks the "screen" a command is on, so session redirects have somewhere
/// to go.
#[derive(Debug)]
pub struct CliNavigator {
    path: watch::Sender<String>,
}

impl CliNavigator {
    pub fn at(path: &str) -> Self {
        let (path, _) = watch::channel(path.to_string());
        Self { path }
    }

    pub fn watch(&self) -> watch::Receiver<String> {
        self.path.subscribe()
    }
}

impl Navigator for CliNavigator {
    fn current_path(&self) -> String {
        self.path.borrow().clone()
    }

    fn navigate(&self, redirect: Redirect) {
        debug!(to = redirect.path(), "Redirect");
        self.path.send_replace(redirect.path().to_string());
    }
}
