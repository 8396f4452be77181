//! Show command implementation.

use anyhow::{Context, Result};
use clap::Args;

use marquee_core::MovieId;

use crate::commands::App;
use crate::output;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Entry identifier
    pub id: MovieId,

    /// Print the entry as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: &App, args: ShowArgs) -> Result<()> {
    let store = app.store();
    let movie = store.find(&args.id).context("Movie not found")?;

    store.increment_view_count(&args.id).await;
    let movie = store.find(&args.id).unwrap_or(movie);

    if args.json {
        return output::json_pretty(&movie);
    }

    output::movie_details(&movie);
    Ok(())
}
