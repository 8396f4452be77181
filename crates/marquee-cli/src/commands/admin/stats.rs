//! Stats command implementation.

use anyhow::Result;

use marquee_core::auth::ADMIN_DASHBOARD;

use crate::commands::App;
use crate::output;

pub fn run(app: &App) -> Result<()> {
    app.require_admin(ADMIN_DASHBOARD)?;
    output::stats(&app.store().stats());
    Ok(())
}
