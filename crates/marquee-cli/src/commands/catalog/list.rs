//! List command implementation.

use anyhow::Result;
use clap::Args;

use marquee_core::{CatalogFilter, Genre};

use crate::commands::App;
use crate::output;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only titles containing this text (case-insensitive)
    #[arg(long, default_value = "")]
    pub search: String,

    /// Only this genre
    #[arg(long)]
    pub genre: Option<Genre>,

    /// Print entries as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(app: &App, args: ListArgs) -> Result<()> {
    let filter = CatalogFilter::new(args.search, args.genre);
    let movies = app.store().filtered(&filter);

    if args.json {
        return output::json_pretty(&movies);
    }

    if movies.is_empty() {
        println!("No movies found.");
        return Ok(());
    }

    for movie in &movies {
        output::movie_line(movie);
    }

    Ok(())
}
