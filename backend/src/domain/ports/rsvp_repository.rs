//! Port for RSVP persistence.
//!
//! The underlying table carries a unique key on (event, member). Adapters
//! must surface a violation of that key as
//! [`RsvpRepositoryError::DuplicateKey`] so the service can treat a lost
//! toggle race as success.

use async_trait::async_trait;

use crate::domain::events::{EventId, Rsvp};
use crate::domain::member::MemberId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by RSVP repository adapters.
    pub enum RsvpRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "rsvp repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "rsvp repository query failed: {message}",
        /// The (event, member) pair already has a row.
        DuplicateKey =>
            "rsvp already exists for this event and member",
    }
}

/// Port for RSVP storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RsvpRepository: Send + Sync {
    /// Fetch the row for an (event, member) pair, if any.
    async fn find(
        &self,
        event: EventId,
        member: &MemberId,
    ) -> Result<Option<Rsvp>, RsvpRepositoryError>;

    /// Insert an attendance row.
    async fn insert(&self, rsvp: &Rsvp) -> Result<(), RsvpRepositoryError>;

    /// Delete the row for an (event, member) pair. Deleting an absent row
    /// is not an error.
    async fn delete(
        &self,
        event: EventId,
        member: &MemberId,
    ) -> Result<(), RsvpRepositoryError>;

    /// Every RSVP belonging to one member.
    async fn list_for_member(
        &self,
        member: &MemberId,
    ) -> Result<Vec<Rsvp>, RsvpRepositoryError>;
}

/// Fixture implementation holding no RSVPs.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRsvpRepository;

#[async_trait]
impl RsvpRepository for FixtureRsvpRepository {
    async fn find(
        &self,
        _event: EventId,
        _member: &MemberId,
    ) -> Result<Option<Rsvp>, RsvpRepositoryError> {
        Ok(None)
    }

    async fn insert(&self, _rsvp: &Rsvp) -> Result<(), RsvpRepositoryError> {
        Ok(())
    }

    async fn delete(
        &self,
        _event: EventId,
        _member: &MemberId,
    ) -> Result<(), RsvpRepositoryError> {
        Ok(())
    }

    async fn list_for_member(
        &self,
        _member: &MemberId,
    ) -> Result<Vec<Rsvp>, RsvpRepositoryError> {
        Ok(Vec::new())
    }
}
