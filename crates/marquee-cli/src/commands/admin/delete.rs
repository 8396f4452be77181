//! Delete command implementation.

use anyhow::{Result, bail};
use clap::Args;

use marquee_core::MovieId;
use marquee_core::auth::ADMIN_DASHBOARD;

use crate::commands::App;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Entry identifier
    pub id: MovieId,
}

pub async fn run(app: &App, args: DeleteArgs) -> Result<()> {
    app.require_admin(ADMIN_DASHBOARD)?;

    if !app.store().delete(&args.id).await {
        bail!("Failed to delete movie");
    }
    app.persist().await
}
