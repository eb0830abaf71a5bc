//! Events and the RSVP ledger.
//!
//! Events are created by admin-capable members and are immutable once
//! created. Attendance is a toggle: at most one RSVP row exists per
//! (event, member) pair, and the row's existence means "attending".

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::capabilities::CapabilityResolver;
use crate::domain::member::MemberId;
use crate::domain::ports::{
    EventRepository, EventRepositoryError, RsvpRepository, RsvpRepositoryError,
};
use crate::domain::Error;

/// Stable event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Generate a new random [`EventId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A gathering members can RSVP to.
///
/// ## Invariants
/// - `starts_at` partitions past from future; RSVPs are only offered for
///   future events.
/// - No edit path exists once a row is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[schema(value_type = String)]
    pub created_by: MemberId,
}

impl Event {
    /// Whether the event lies in the past relative to `now`.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.starts_at < now
    }
}

/// Fields supplied when an admin creates an event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Attendance status label stored on an RSVP row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Attending,
}

/// Attendance row keyed by (event, member).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rsvp {
    pub event_id: EventId,
    #[schema(value_type = String)]
    pub member_id: MemberId,
    pub status: RsvpStatus,
}

/// Result of an RSVP toggle, reported back to the member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RsvpOutcome {
    /// A row now exists for the pair.
    Confirmed,
    /// The existing row was removed.
    Cancelled,
}

/// Event listing and attendance service.
#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventRepository>,
    rsvps: Arc<dyn RsvpRepository>,
    capabilities: CapabilityResolver,
}

fn map_event_error(error: EventRepositoryError) -> Error {
    match error {
        EventRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("event store unavailable: {message}"))
        }
        EventRepositoryError::Query { message } => {
            Error::internal(format!("event store error: {message}"))
        }
        EventRepositoryError::InvalidRow { message } => {
            Error::internal(format!("event row failed validation: {message}"))
        }
    }
}

fn map_rsvp_error(error: RsvpRepositoryError) -> Error {
    match error {
        RsvpRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("rsvp store unavailable: {message}"))
        }
        RsvpRepositoryError::Query { message } => {
            Error::internal(format!("rsvp store error: {message}"))
        }
        RsvpRepositoryError::DuplicateKey => {
            Error::conflict("attendance already recorded for this event")
        }
    }
}

impl EventService {
    /// Create the service over the event and RSVP stores.
    pub fn new(
        events: Arc<dyn EventRepository>,
        rsvps: Arc<dyn RsvpRepository>,
        capabilities: CapabilityResolver,
    ) -> Self {
        Self {
            events,
            rsvps,
            capabilities,
        }
    }

    /// List all events ordered by start time ascending.
    pub async fn list_events(&self) -> Result<Vec<Event>, Error> {
        self.events.list_by_start_time().await.map_err(map_event_error)
    }

    /// List the caller's RSVPs so the UI can mark attended events.
    pub async fn list_rsvps(&self, member: &MemberId) -> Result<Vec<Rsvp>, Error> {
        self.rsvps
            .list_for_member(member)
            .await
            .map_err(map_rsvp_error)
    }

    /// Create an event. Admin-only; the caller's role is re-resolved from
    /// the role table, never trusted from a cached flag.
    pub async fn create_event(
        &self,
        caller: &MemberId,
        draft: EventDraft,
    ) -> Result<Event, Error> {
        let caps = self.capabilities.resolve(caller).await?;
        if !caps.is_admin {
            return Err(Error::forbidden("admin role required to create events"));
        }

        let title = draft.title.trim().to_owned();
        if title.is_empty() {
            return Err(Error::invalid_request("event title must not be empty"));
        }

        let event = Event {
            id: EventId::random(),
            title,
            starts_at: draft.starts_at,
            location: draft.location,
            description: draft.description,
            image_url: draft.image_url,
            created_by: caller.clone(),
        };
        self.events.insert(&event).await.map_err(map_event_error)?;
        tracing::info!(event_id = %event.id, "event created");
        Ok(event)
    }

    /// Toggle the caller's attendance for an event.
    ///
    /// Row present: delete it and report [`RsvpOutcome::Cancelled`]. Row
    /// absent: insert `attending` and report [`RsvpOutcome::Confirmed`].
    /// A duplicate-key failure on insert means a near-simultaneous toggle
    /// already created the row, so the pair is attending either way and
    /// the outcome is reported as confirmed rather than surfaced as an
    /// error.
    pub async fn toggle_rsvp(
        &self,
        caller: &MemberId,
        event_id: EventId,
    ) -> Result<RsvpOutcome, Error> {
        self.events
            .find_by_id(event_id)
            .await
            .map_err(map_event_error)?
            .ok_or_else(|| Error::not_found(format!("event {event_id} not found")))?;

        let existing = self
            .rsvps
            .find(event_id, caller)
            .await
            .map_err(map_rsvp_error)?;

        if existing.is_some() {
            self.rsvps
                .delete(event_id, caller)
                .await
                .map_err(map_rsvp_error)?;
            return Ok(RsvpOutcome::Cancelled);
        }

        let rsvp = Rsvp {
            event_id,
            member_id: caller.clone(),
            status: RsvpStatus::Attending,
        };
        match self.rsvps.insert(&rsvp).await {
            Ok(()) => Ok(RsvpOutcome::Confirmed),
            // The natural (event, member) key already exists: another toggle
            // won the race. The member is attending, which is what this
            // branch was trying to achieve.
            Err(RsvpRepositoryError::DuplicateKey) => Ok(RsvpOutcome::Confirmed),
            Err(err) => Err(map_rsvp_error(err)),
        }
    }
}
