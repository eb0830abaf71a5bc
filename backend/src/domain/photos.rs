//! Gallery photos and the per-member quota gate.
//!
//! Each member may hold at most three photos in the gallery. The quota is
//! checked before any bytes move; uploads go blob-first so a row never
//! points at a missing object, and deletes go blob-first so a row is only
//! removed once its object is gone.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::member::MemberId;
use crate::domain::ports::{
    BlobStore, BlobStoreError, PhotoRepository, PhotoRepositoryError,
};
use crate::domain::Error;

/// Blob store bucket holding gallery photos.
pub const GALLERY_BUCKET: &str = "gallery";

/// Most photos one member may hold at once.
pub const PHOTO_QUOTA: u64 = 3;

/// Upper bound on photo payloads.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Stable photo identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PhotoId(pub Uuid);

impl PhotoId {
    /// Generate a new random [`PhotoId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A gallery photo record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: PhotoId,
    #[schema(value_type = String)]
    pub owner_id: MemberId,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Payload supplied when a member uploads a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub caption: Option<String>,
}

/// Gallery service enforcing the quota and blob/record ordering.
#[derive(Clone)]
pub struct PhotoService {
    photos: Arc<dyn PhotoRepository>,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
}

fn map_photo_error(error: PhotoRepositoryError) -> Error {
    match error {
        PhotoRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("photo store unavailable: {message}"))
        }
        PhotoRepositoryError::Query { message } => {
            Error::internal(format!("photo store error: {message}"))
        }
        PhotoRepositoryError::InvalidRow { message } => {
            Error::internal(format!("photo row failed validation: {message}"))
        }
    }
}

fn map_blob_error(error: BlobStoreError) -> Error {
    match error {
        BlobStoreError::Connection { message } => {
            Error::service_unavailable(format!("blob store unavailable: {message}"))
        }
        BlobStoreError::Operation { message } => {
            Error::service_unavailable(format!("blob store operation failed: {message}"))
        }
        BlobStoreError::Rejected { message } => Error::invalid_request(message),
    }
}

fn blob_key(owner: &MemberId, id: PhotoId) -> String {
    format!("{owner}/{id}")
}

impl PhotoService {
    /// Create the service over the photo and blob stores.
    pub fn new(
        photos: Arc<dyn PhotoRepository>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            photos,
            blobs,
            clock,
        }
    }

    /// The whole gallery, newest upload first.
    pub async fn list_gallery(&self) -> Result<Vec<Photo>, Error> {
        self.photos.list_newest_first().await.map_err(map_photo_error)
    }

    /// Upload a photo on behalf of a member.
    ///
    /// Quota and payload validation happen before any blob transfer. The
    /// blob is stored first; if the record insert then fails, the orphaned
    /// blob is removed on a best-effort basis before the error surfaces.
    pub async fn upload(
        &self,
        caller: &MemberId,
        upload: PhotoUpload,
    ) -> Result<Photo, Error> {
        let held = self
            .photos
            .count_for_member(caller)
            .await
            .map_err(map_photo_error)?;
        if held >= PHOTO_QUOTA {
            return Err(Error::invalid_request(format!(
                "photo quota reached: members may hold at most {PHOTO_QUOTA} photos"
            )));
        }
        if !upload.content_type.starts_with("image/") {
            return Err(Error::invalid_request("gallery uploads must be images"));
        }
        if upload.bytes.len() > MAX_PHOTO_BYTES {
            return Err(Error::invalid_request(
                "gallery uploads must be 5 MiB or smaller",
            ));
        }

        let id = PhotoId::random();
        let key = blob_key(caller, id);
        let url = self
            .blobs
            .upload(GALLERY_BUCKET, &key, &upload.content_type, upload.bytes)
            .await
            .map_err(map_blob_error)?;

        let photo = Photo {
            id,
            owner_id: caller.clone(),
            url,
            caption: upload
                .caption
                .map(|text| text.trim().to_owned())
                .filter(|text| !text.is_empty()),
            uploaded_at: self.clock.utc(),
        };
        if let Err(insert_error) = self.photos.insert(&photo).await {
            if let Err(cleanup_error) = self.blobs.delete(GALLERY_BUCKET, &key).await {
                tracing::warn!(
                    photo_id = %id,
                    error = %cleanup_error,
                    "failed to remove orphaned gallery blob"
                );
            }
            return Err(map_photo_error(insert_error));
        }
        tracing::info!(photo_id = %photo.id, "gallery photo uploaded");
        Ok(photo)
    }

    /// Delete a photo. Only the owner may remove it; the blob goes first
    /// and the record is only removed after the blob delete succeeds.
    pub async fn delete(&self, caller: &MemberId, id: PhotoId) -> Result<(), Error> {
        let photo = self
            .photos
            .find_by_id(id)
            .await
            .map_err(map_photo_error)?
            .ok_or_else(|| Error::not_found(format!("photo {id} not found")))?;
        if photo.owner_id != *caller {
            return Err(Error::forbidden("only the owner may delete a photo"));
        }

        let key = blob_key(&photo.owner_id, id);
        self.blobs
            .delete(GALLERY_BUCKET, &key)
            .await
            .map_err(map_blob_error)?;
        self.photos.delete(id).await.map_err(map_photo_error)?;
        tracing::info!(photo_id = %id, "gallery photo deleted");
        Ok(())
    }
}
