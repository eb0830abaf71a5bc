//! Port for event persistence.

use async_trait::async_trait;

use crate::domain::events::{Event, EventId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by event repository adapters.
    pub enum EventRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "event repository query failed: {message}",
        /// A stored row failed domain validation on the way out.
        InvalidRow { message: String } =>
            "event row failed validation: {message}",
    }
}

/// Port for event storage and retrieval.
///
/// Events are append-only; no update or delete operation exists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persist a new event.
    async fn insert(&self, event: &Event) -> Result<(), EventRepositoryError>;

    /// Fetch one event. Returns `None` for unknown ids.
    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, EventRepositoryError>;

    /// Fetch every event ordered by start time ascending.
    async fn list_by_start_time(&self) -> Result<Vec<Event>, EventRepositoryError>;
}

/// Fixture implementation holding no events.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEventRepository;

#[async_trait]
impl EventRepository for FixtureEventRepository {
    async fn insert(&self, _event: &Event) -> Result<(), EventRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: EventId,
    ) -> Result<Option<Event>, EventRepositoryError> {
        Ok(None)
    }

    async fn list_by_start_time(&self) -> Result<Vec<Event>, EventRepositoryError> {
        Ok(Vec::new())
    }
}
