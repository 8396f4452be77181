//! Object storage trait.

use async_trait::async_trait;
use url::Url;

use crate::Result;

/// Hosted object storage for media files.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Store `bytes` under `key` in `bucket` without overwriting.
    ///
    /// Returns the object path inside the bucket.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;

    /// Public URL of an object.
    fn public_url(&self, bucket: &str, path: &str) -> Result<Url>;
}
