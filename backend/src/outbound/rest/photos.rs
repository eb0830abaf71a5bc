//! Record-store adapter for gallery photo records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{RecordApi, RecordApiError};
use crate::domain::member::MemberId;
use crate::domain::photos::{Photo, PhotoId};
use crate::domain::ports::{PhotoRepository, PhotoRepositoryError};

const TABLE: &str = "photos";

/// Row shape of the `photos` table.
#[derive(Debug, Serialize, Deserialize)]
struct PhotoRow {
    id: Uuid,
    owner_id: Uuid,
    url: String,
    #[serde(default)]
    caption: Option<String>,
    uploaded_at: DateTime<Utc>,
}

impl From<&Photo> for PhotoRow {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id.0,
            owner_id: *photo.owner_id.as_uuid(),
            url: photo.url.clone(),
            caption: photo.caption.clone(),
            uploaded_at: photo.uploaded_at,
        }
    }
}

impl TryFrom<PhotoRow> for Photo {
    type Error = PhotoRepositoryError;

    fn try_from(row: PhotoRow) -> Result<Self, Self::Error> {
        if row.url.trim().is_empty() {
            return Err(PhotoRepositoryError::invalid_row(
                "photo url must not be blank",
            ));
        }
        Ok(Self {
            id: PhotoId(row.id),
            owner_id: MemberId::from(row.owner_id),
            url: row.url,
            caption: row.caption,
            uploaded_at: row.uploaded_at,
        })
    }
}

/// Photo repository backed by the hosted record store.
#[derive(Debug, Clone)]
pub struct RestPhotoRepository {
    api: RecordApi,
}

impl RestPhotoRepository {
    pub fn new(api: RecordApi) -> Self {
        Self { api }
    }
}

fn map_api_error(error: RecordApiError) -> PhotoRepositoryError {
    match error {
        RecordApiError::Transport { message } => PhotoRepositoryError::connection(message),
        RecordApiError::Status { status, message } => {
            PhotoRepositoryError::query(format!("status {status}: {message}"))
        }
        RecordApiError::Duplicate => {
            PhotoRepositoryError::query("unexpected unique key conflict")
        }
        RecordApiError::Decode { message } => PhotoRepositoryError::query(message),
    }
}

#[async_trait]
impl PhotoRepository for RestPhotoRepository {
    async fn insert(&self, photo: &Photo) -> Result<(), PhotoRepositoryError> {
        self.api
            .insert(TABLE, &PhotoRow::from(photo))
            .await
            .map_err(map_api_error)
    }

    async fn find_by_id(&self, id: PhotoId) -> Result<Option<Photo>, PhotoRepositoryError> {
        let rows: Vec<PhotoRow> = self
            .api
            .select(TABLE, &[("id", format!("eq.{}", id.0))])
            .await
            .map_err(map_api_error)?;
        rows.into_iter().next().map(Photo::try_from).transpose()
    }

    async fn list_newest_first(&self) -> Result<Vec<Photo>, PhotoRepositoryError> {
        let rows: Vec<PhotoRow> = self
            .api
            .select(TABLE, &[("order", "uploaded_at.desc".to_owned())])
            .await
            .map_err(map_api_error)?;
        rows.into_iter().map(Photo::try_from).collect()
    }

    async fn count_for_member(
        &self,
        member: &MemberId,
    ) -> Result<u64, PhotoRepositoryError> {
        self.api
            .count(TABLE, &[("owner_id", format!("eq.{}", member.as_uuid()))])
            .await
            .map_err(map_api_error)
    }

    async fn delete(&self, id: PhotoId) -> Result<(), PhotoRepositoryError> {
        self.api
            .delete(TABLE, &[("id", format!("eq.{}", id.0))])
            .await
            .map_err(map_api_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_round_trip_through_the_domain() {
        let row = PhotoRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            url: "https://blobs.example.com/gallery/a.png".to_owned(),
            caption: Some("Reunion 2024".to_owned()),
            uploaded_at: Utc::now(),
        };
        let id = row.id;
        let photo = Photo::try_from(row).expect("row should convert");
        assert_eq!(photo.id.0, id);
        assert_eq!(photo.caption.as_deref(), Some("Reunion 2024"));

        let back = PhotoRow::from(&photo);
        assert_eq!(back.url, "https://blobs.example.com/gallery/a.png");
    }

    #[test]
    fn blank_urls_surface_as_invalid_rows() {
        let row = PhotoRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            url: " ".to_owned(),
            caption: None,
            uploaded_at: Utc::now(),
        };
        let error = Photo::try_from(row).expect_err("conversion should fail");
        assert!(matches!(error, PhotoRepositoryError::InvalidRow { .. }));
    }
}
