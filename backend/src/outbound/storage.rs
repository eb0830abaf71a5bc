//! Blob store adapter for the hosted object storage service.
//!
//! Objects are addressed as `storage/v1/object/{bucket}/{key}` and served
//! publicly from `storage/v1/object/public/{bucket}/{key}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::domain::ports::{BlobStore, BlobStoreError};

use super::rest::body_preview;

/// Blob store backed by the hosted storage HTTP API.
#[derive(Debug, Clone)]
pub struct RestBlobStore {
    client: Client,
    base: Url,
    service_key: String,
}

impl RestBlobStore {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base: Url,
        service_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            service_key,
        })
    }

    fn object_url(&self, bucket: &str, key: &str) -> Result<Url, BlobStoreError> {
        self.base
            .join(&format!("storage/v1/object/{bucket}/{key}"))
            .map_err(|error| {
                BlobStoreError::operation(format!("invalid object path: {error}"))
            })
    }

    fn public_url(&self, bucket: &str, key: &str) -> Result<String, BlobStoreError> {
        self.base
            .join(&format!("storage/v1/object/public/{bucket}/{key}"))
            .map(|url| url.to_string())
            .map_err(|error| {
                BlobStoreError::operation(format!("invalid public path: {error}"))
            })
    }
}

fn map_transport_error(error: reqwest::Error) -> BlobStoreError {
    BlobStoreError::connection(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> BlobStoreError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    if status.is_client_error() {
        BlobStoreError::rejected(message)
    } else {
        BlobStoreError::operation(message)
    }
}

#[async_trait]
impl BlobStore for RestBlobStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BlobStoreError> {
        let url = self.object_url(bucket, key)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(self.service_key.as_str())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.map_err(map_transport_error)?;
            return Err(map_status_error(status, body.as_ref()));
        }
        self.public_url(bucket, key)
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), BlobStoreError> {
        let url = self.object_url(bucket, key)?;
        let response = self
            .client
            .delete(url)
            .bearer_auth(self.service_key.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        // The port treats deleting an absent object as success.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}
