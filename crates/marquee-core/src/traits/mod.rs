//! Gateway traits.
//!
//! The Remote Gateway is split along the services it offers. Session manager
//! and catalog store only depend on the parts they call.

mod auth;
mod catalog;
mod storage;

pub use auth::AuthGateway;
pub use catalog::CatalogGateway;
pub use storage::StorageGateway;

/// A complete gateway: authentication, row store and object storage.
pub trait Gateway: AuthGateway + CatalogGateway + StorageGateway {}

impl<T> Gateway for T where T: AuthGateway + CatalogGateway + StorageGateway {}
