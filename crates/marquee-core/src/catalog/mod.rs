//! Catalog entries and the read-side helpers views build on.

mod filter;
mod movie;
mod stats;

pub use filter::CatalogFilter;
pub use movie::{DEFAULT_DURATION, Movie, MovieFields, MoviePatch, NewMovie, download_file_name};
pub use stats::CatalogStats;
