//! Port for gallery photo persistence.

use async_trait::async_trait;

use crate::domain::member::MemberId;
use crate::domain::photos::{Photo, PhotoId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by photo repository adapters.
    pub enum PhotoRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "photo repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "photo repository query failed: {message}",
        /// A stored row failed domain validation on the way out.
        InvalidRow { message: String } =>
            "photo row failed validation: {message}",
    }
}

/// Port for gallery photo storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Persist a photo record after its blob has been stored.
    async fn insert(&self, photo: &Photo) -> Result<(), PhotoRepositoryError>;

    /// Fetch one photo record. Returns `None` for unknown ids.
    async fn find_by_id(&self, id: PhotoId) -> Result<Option<Photo>, PhotoRepositoryError>;

    /// The whole gallery, newest upload first.
    async fn list_newest_first(&self) -> Result<Vec<Photo>, PhotoRepositoryError>;

    /// How many photos one member currently has in the gallery.
    async fn count_for_member(&self, member: &MemberId)
        -> Result<u64, PhotoRepositoryError>;

    /// Remove a photo record.
    async fn delete(&self, id: PhotoId) -> Result<(), PhotoRepositoryError>;
}

/// Fixture implementation holding no photos.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePhotoRepository;

#[async_trait]
impl PhotoRepository for FixturePhotoRepository {
    async fn insert(&self, _photo: &Photo) -> Result<(), PhotoRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: PhotoId,
    ) -> Result<Option<Photo>, PhotoRepositoryError> {
        Ok(None)
    }

    async fn list_newest_first(&self) -> Result<Vec<Photo>, PhotoRepositoryError> {
        Ok(Vec::new())
    }

    async fn count_for_member(
        &self,
        _member: &MemberId,
    ) -> Result<u64, PhotoRepositoryError> {
        Ok(0)
    }

    async fn delete(&self, _id: PhotoId) -> Result<(), PhotoRepositoryError> {
        Ok(())
    }
}
