//! Core catalog types.
//!
//! These types validate their input at construction time, so a value that
//! exists is always well formed.

mod gateway_url;
mod genre;
mod movie_id;
mod rating;

pub use gateway_url::GatewayUrl;
pub use genre::Genre;
pub use movie_id::MovieId;
pub use rating::Rating;
