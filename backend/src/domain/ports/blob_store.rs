//! Port for binary object storage.
//!
//! Proof images and gallery photos live in a hosted blob store organised
//! into named buckets. Uploads return the public URL the row will carry.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob store adapters.
    pub enum BlobStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "blob store connection failed: {message}",
        /// Upload or delete failed during execution.
        Operation { message: String } =>
            "blob store operation failed: {message}",
        /// The store rejected the object (size, type, or key).
        Rejected { message: String } =>
            "blob store rejected the object: {message}",
    }
}

/// Port for uploading and deleting binary objects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an object and return its public URL.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BlobStoreError>;

    /// Remove an object. Deleting an absent object is not an error.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), BlobStoreError>;
}

/// Fixture implementation that accepts every upload.
///
/// Returns a deterministic URL derived from the bucket and key so tests
/// can assert on row contents.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBlobStore;

#[async_trait]
impl BlobStore for FixtureBlobStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, BlobStoreError> {
        Ok(format!("https://blobs.test/{bucket}/{key}"))
    }

    async fn delete(&self, _bucket: &str, _key: &str) -> Result<(), BlobStoreError> {
        Ok(())
    }
}
