//! Add command implementation.

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Args;

use marquee_core::catalog::DEFAULT_DURATION;
use marquee_core::{Genre, MovieFields, MovieForm, Rating};

use super::VideoArgs;
use crate::commands::App;
use crate::output;

/// Admin screen for new entries.
const NEW_MOVIE_PATH: &str = "/admin/movies/new";

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Title
    #[arg(long)]
    pub title: String,

    /// Genre
    #[arg(long, default_value_t = Genre::default())]
    pub genre: Genre,

    /// Release date (YYYY-MM-DD)
    #[arg(long)]
    pub release_date: NaiveDate,

    /// Rating between 0.0 and 10.0
    #[arg(long, default_value_t = Rating::default())]
    pub rating: Rating,

    /// Running time, e.g. "1h 45m"
    #[arg(long, default_value = DEFAULT_DURATION)]
    pub duration: String,

    /// Synopsis
    #[arg(long, default_value = "")]
    pub description: String,

    /// Thumbnail URL; a placeholder is used when omitted
    #[arg(long, default_value = "")]
    pub thumbnail_url: String,

    #[command(flatten)]
    pub video: VideoArgs,
}

pub async fn run(app: &App, args: AddArgs) -> Result<()> {
    app.require_admin(NEW_MOVIE_PATH)?;

    let fields = MovieFields::new(args.title, args.genre, args.release_date)
        .with_rating(args.rating)
        .with_duration(args.duration)
        .with_description(args.description)
        .with_thumbnail_url(args.thumbnail_url);
    let form = MovieForm::new_entry(fields, args.video.source()?);

    let Some(movie) = form.submit(app.store(), &args.video.bucket).await else {
        bail!("Failed to add movie");
    };
    app.persist().await?;

    println!();
    output::field("ID", movie.id.as_str());
    output::field("Video", &movie.video_url);
    Ok(())
}
