//! Commands available without signing in.

pub mod download;
pub mod genres;
pub mod list;
pub mod show;
