//! marquee-core - Core catalog types, gateway traits and client state.
//!
//! The catalog is owned by a hosted backend (the Remote Gateway). This crate
//! keeps a client-side copy of it consistent through two pieces of state:
//!
//! - [`SessionManager`] tracks who is signed in and reacts to session-change
//!   events pushed by the gateway.
//! - [`CatalogStore`] holds the ordered collection of movies and resynchronizes
//!   it with a full read after every successful write.
//!
//! Gateway implementations live in `marquee-rest` (hosted backend over HTTPS)
//! and `marquee-file` (local directory).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use marquee_core::{CatalogContext, Gateway, TracingNotifier};
//!
//! # async fn example<G: Gateway + 'static>(gateway: G) {
//! let ctx = CatalogContext::new(Arc::new(gateway), Arc::new(TracingNotifier));
//! ctx.bootstrap().await;
//!
//! for movie in ctx.store().movies().iter() {
//!     println!("{} ({})", movie.title, movie.genre);
//! }
//! # }
//! ```

pub mod auth;
pub mod catalog;
pub mod context;
pub mod error;
pub mod form;
pub mod notice;
pub mod session_manager;
pub mod store;
pub mod traits;
pub mod types;

pub use auth::{
    AccessToken, ApiKey, AuthEvent, AuthEventHub, AuthEventKind, AuthEventStream, AuthSession,
    Credentials, Redirect, RefreshToken, RouteGate, SessionState, User,
};
pub use catalog::{CatalogFilter, CatalogStats, Movie, MovieFields, MoviePatch, NewMovie};
pub use context::CatalogContext;
pub use error::{Error, ErrorKind};
pub use form::{DEFAULT_VIDEO_BUCKET, MovieForm, VideoFile, VideoSource};
pub use notice::{Notice, NoticeLevel, Notifier, TracingNotifier};
pub use session_manager::{Navigator, SessionManager, SessionSubscription};
pub use store::{CatalogSnapshot, CatalogStore};
pub use traits::{AuthGateway, CatalogGateway, Gateway, StorageGateway};
pub use types::{GatewayUrl, Genre, MovieId, Rating};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
