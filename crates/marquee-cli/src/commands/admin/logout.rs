//! Logout command implementation.

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use marquee_core::auth::{ADMIN_DASHBOARD, ADMIN_LOGIN};

use super::SESSION_EVENT_TIMEOUT;
use crate::commands::App;
use crate::output;
use crate::session::CliNavigator;

pub async fn run(app: &App) -> Result<()> {
    if !app.session().is_admin() {
        app.persist().await?;
        output::warning("Not logged in");
        return Ok(());
    }

    let navigator = Arc::new(CliNavigator::at(ADMIN_DASHBOARD));
    let mut location = navigator.watch();
    let _subscription = app.session().subscribe(navigator.clone())?;

    app.session().logout().await;
    if app.gateway().session().await.is_some() {
        bail!("Logout failed");
    }

    tokio::time::timeout(
        SESSION_EVENT_TIMEOUT,
        location.wait_for(|path| path == ADMIN_LOGIN),
    )
    .await
    .context("Timed out waiting for the session to end")?
    .context("Session events stopped")?;

    app.persist().await?;
    output::success("Logged out");
    Ok(())
}
