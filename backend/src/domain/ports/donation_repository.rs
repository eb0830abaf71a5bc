//! Port for donation persistence.

use async_trait::async_trait;

use crate::domain::donations::{Donation, DonationId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by donation repository adapters.
    pub enum DonationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "donation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "donation repository query failed: {message}",
        /// No row exists for the given donation id.
        NotFound =>
            "donation not found",
        /// A stored row failed domain validation on the way out.
        InvalidRow { message: String } =>
            "donation row failed validation: {message}",
    }
}

/// Port for donation storage and retrieval.
///
/// Verification is a one-way flag flip. Rejection removes the row; there
/// is no rejected state to query later.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationRepository: Send + Sync {
    /// Persist a freshly submitted donation. The row starts unverified.
    async fn insert(&self, donation: &Donation) -> Result<(), DonationRepositoryError>;

    /// Fetch one donation. Returns `None` for unknown ids.
    async fn find_by_id(
        &self,
        id: DonationId,
    ) -> Result<Option<Donation>, DonationRepositoryError>;

    /// Donations awaiting admin review, newest first.
    async fn list_pending(&self) -> Result<Vec<Donation>, DonationRepositoryError>;

    /// Verified donations, newest first.
    async fn list_verified(&self) -> Result<Vec<Donation>, DonationRepositoryError>;

    /// Flip the verified flag on one donation.
    async fn mark_verified(&self, id: DonationId) -> Result<(), DonationRepositoryError>;

    /// Remove a donation row.
    async fn delete(&self, id: DonationId) -> Result<(), DonationRepositoryError>;
}

/// Fixture implementation holding no donations.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDonationRepository;

#[async_trait]
impl DonationRepository for FixtureDonationRepository {
    async fn insert(&self, _donation: &Donation) -> Result<(), DonationRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: DonationId,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        Ok(None)
    }

    async fn list_pending(&self) -> Result<Vec<Donation>, DonationRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_verified(&self) -> Result<Vec<Donation>, DonationRepositoryError> {
        Ok(Vec::new())
    }

    async fn mark_verified(&self, _id: DonationId) -> Result<(), DonationRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _id: DonationId) -> Result<(), DonationRepositoryError> {
        Ok(())
    }
}
