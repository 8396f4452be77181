//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use marquee_core::{CatalogStats, Movie, Notice, NoticeLevel, Notifier};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// One line per entry.
pub fn movie_line(movie: &Movie) {
    println!(
        "{}  {} ({}) {}  {} {}  {} views  {} downloads",
        movie.id.as_str().dimmed(),
        movie.title.bold(),
        movie.release_year(),
        movie.genre.to_string().cyan(),
        "★".yellow(),
        movie.rating,
        movie.views,
        movie.downloads,
    );
}

/// All fields of one entry.
pub fn movie_details(movie: &Movie) {
    field("ID", movie.id.as_str());
    field("Title", &movie.title);
    field("Genre", movie.genre.as_str());
    field("Released", &movie.release_date.to_string());
    field("Rating", &movie.rating.to_string());
    field("Duration", &movie.duration);
    field("Views", &movie.views.to_string());
    field("Downloads", &movie.downloads.to_string());
    field("Video", &movie.video_url);
    field("Thumbnail", &movie.thumbnail_url);
    field("Added", &movie.created_at.to_rfc3339());
    if !movie.description.is_empty() {
        println!();
        println!("{}", movie.description);
    }
}

pub fn stats(stats: &CatalogStats) {
    field("Movies", &stats.total_movies.to_string());
    field("Views", &stats.total_views.to_string());
    field("Downloads", &stats.total_downloads.to_string());
}

/// Prints notices as they are raised.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => success(&notice.message),
            NoticeLevel::Info => eprintln!("{}", notice.message.dimmed()),
            NoticeLevel::Warning => warning(&notice.message),
            NoticeLevel::Error => error(&notice.message),
        }
    }
}
