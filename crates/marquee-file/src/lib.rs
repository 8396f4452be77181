//! marquee-file - Filesystem-backed gateway.
//!
//! Keeps users, catalog rows and uploaded objects below one directory:
//!
//! ```text
//! <root>/auth/users/<id>.json
//! <root>/catalog/movies/<id>.json
//! <root>/catalog.lock
//! <root>/storage/<bucket>/<key>
//! ```
//!
//! Several processes may share a root; catalog writes and counter updates
//! serialize on `catalog.lock`.

mod gateway;
mod store;

pub use gateway::FileGateway;
pub use store::LocalUser;
