//! Edit command implementation.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Args;

use marquee_core::{Genre, MovieForm, MovieId, Rating};

use super::VideoArgs;
use crate::commands::App;
use crate::output;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Entry identifier
    pub id: MovieId,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub genre: Option<Genre>,

    /// Release date (YYYY-MM-DD)
    #[arg(long)]
    pub release_date: Option<NaiveDate>,

    #[arg(long)]
    pub rating: Option<Rating>,

    #[arg(long)]
    pub duration: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Thumbnail URL; an empty value switches to a placeholder
    #[arg(long)]
    pub thumbnail_url: Option<String>,

    #[command(flatten)]
    pub video: VideoArgs,
}

impl EditArgs {
    fn changes_anything(&self) -> bool {
        self.title.is_some()
            || self.genre.is_some()
            || self.release_date.is_some()
            || self.rating.is_some()
            || self.duration.is_some()
            || self.description.is_some()
            || self.thumbnail_url.is_some()
            || self.video.is_set()
    }
}

pub async fn run(app: &App, args: EditArgs) -> Result<()> {
    app.require_admin(&format!("/admin/movies/edit/{}", args.id))?;
    if !args.changes_anything() {
        bail!("Nothing to change");
    }

    let movie = app.store().find(&args.id).context("Movie not found")?;
    let mut form = MovieForm::edit(&movie);
    form.video = args.video.source()?;

    let fields = &mut form.fields;
    if let Some(title) = args.title {
        fields.title = title;
    }
    if let Some(genre) = args.genre {
        fields.genre = genre;
    }
    if let Some(date) = args.release_date {
        fields.release_date = date;
    }
    if let Some(rating) = args.rating {
        fields.rating = rating;
    }
    if let Some(duration) = args.duration {
        fields.duration = duration;
    }
    if let Some(description) = args.description {
        fields.description = description;
    }
    if let Some(url) = args.thumbnail_url {
        fields.thumbnail_url = url;
    }

    let Some(movie) = form.submit(app.store(), &args.video.bucket).await else {
        bail!("Failed to update movie");
    };
    app.persist().await?;

    println!();
    output::movie_details(&movie);
    Ok(())
}
