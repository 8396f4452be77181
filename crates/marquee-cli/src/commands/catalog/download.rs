//! Download command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use marquee_core::MovieId;
use marquee_core::catalog::download_file_name;

use crate::commands::App;
use crate::output;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Entry identifier
    pub id: MovieId,
}

pub async fn run(app: &App, args: DownloadArgs) -> Result<()> {
    let store = app.store();
    let movie = store.find(&args.id).context("Movie not found")?;

    if movie.video_url.trim().is_empty() {
        bail!("No video URL available for download.");
    }

    store.increment_download_count(&args.id).await;

    output::success(&format!("Downloading \"{}\"", movie.title));
    output::field("URL", &movie.video_url);
    output::field("Save as", &download_file_name(&movie.title));
    Ok(())
}
