//! marquee-rest - Gateway for a hosted backend over HTTPS.
//!
//! Talks to the backend's auth, row-store and object-storage services with a
//! public API key, plus the signed-in user's access token once there is one.
//!
//! ```no_run
//! use marquee_core::{ApiKey, GatewayUrl};
//! use marquee_rest::RestGateway;
//!
//! # fn example() -> marquee_core::Result<()> {
//! let base = GatewayUrl::new("https://demo.example.co")?;
//! let gateway = RestGateway::new(base, ApiKey::new("public-anon-key"))?;
//! # Ok(())
//! # }
//! ```

mod client;
mod endpoints;
mod gateway;

pub use gateway::RestGateway;
