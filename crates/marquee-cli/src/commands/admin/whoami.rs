//! Whoami command implementation.

use anyhow::{Context, Result};

use crate::commands::App;
use crate::output;

pub async fn run(app: &App) -> Result<()> {
    app.persist().await?;

    let state = app.session().state();
    let session = state
        .session()
        .context("No active session. Run 'marquee login' first.")?;

    output::field("User", &session.user().id);
    if let Some(email) = &session.user().email {
        output::field("Email", email);
    }
    output::field("Gateway", app.gateway().url().as_str());
    if let Some(expires_at) = session.expires_at() {
        output::field("Expires", &expires_at.to_rfc3339());
    }
    Ok(())
}
