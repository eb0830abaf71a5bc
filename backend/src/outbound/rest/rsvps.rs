//! Record-store adapter for RSVPs.
//!
//! The `rsvps` table carries a unique key on (event_id, member_id). A
//! conflicting insert surfaces as [`RsvpRepositoryError::DuplicateKey`] so
//! the toggle can treat a lost race as success.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{RecordApi, RecordApiError};
use crate::domain::events::{EventId, Rsvp, RsvpStatus};
use crate::domain::member::MemberId;
use crate::domain::ports::{RsvpRepository, RsvpRepositoryError};

const TABLE: &str = "rsvps";
const ATTENDING: &str = "attending";

/// Row shape of the `rsvps` table.
#[derive(Debug, Serialize, Deserialize)]
struct RsvpRow {
    event_id: Uuid,
    member_id: Uuid,
    status: String,
}

impl From<&Rsvp> for RsvpRow {
    fn from(rsvp: &Rsvp) -> Self {
        Self {
            event_id: rsvp.event_id.0,
            member_id: *rsvp.member_id.as_uuid(),
            status: match rsvp.status {
                RsvpStatus::Attending => ATTENDING.to_owned(),
            },
        }
    }
}

impl TryFrom<RsvpRow> for Rsvp {
    type Error = RsvpRepositoryError;

    fn try_from(row: RsvpRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            ATTENDING => RsvpStatus::Attending,
            other => {
                return Err(RsvpRepositoryError::query(format!(
                    "unknown rsvp status {other:?}"
                )));
            }
        };
        Ok(Self {
            event_id: EventId(row.event_id),
            member_id: MemberId::from(row.member_id),
            status,
        })
    }
}

/// RSVP repository backed by the hosted record store.
#[derive(Debug, Clone)]
pub struct RestRsvpRepository {
    api: RecordApi,
}

impl RestRsvpRepository {
    pub fn new(api: RecordApi) -> Self {
        Self { api }
    }
}

fn map_api_error(error: RecordApiError) -> RsvpRepositoryError {
    match error {
        RecordApiError::Transport { message } => RsvpRepositoryError::connection(message),
        RecordApiError::Duplicate => RsvpRepositoryError::DuplicateKey,
        RecordApiError::Status { status, message } => {
            RsvpRepositoryError::query(format!("status {status}: {message}"))
        }
        RecordApiError::Decode { message } => RsvpRepositoryError::query(message),
    }
}

fn pair_filters(event: EventId, member: &MemberId) -> [(&'static str, String); 2] {
    [
        ("event_id", format!("eq.{}", event.0)),
        ("member_id", format!("eq.{}", member.as_uuid())),
    ]
}

#[async_trait]
impl RsvpRepository for RestRsvpRepository {
    async fn find(
        &self,
        event: EventId,
        member: &MemberId,
    ) -> Result<Option<Rsvp>, RsvpRepositoryError> {
        let rows: Vec<RsvpRow> = self
            .api
            .select(TABLE, &pair_filters(event, member))
            .await
            .map_err(map_api_error)?;
        rows.into_iter().next().map(Rsvp::try_from).transpose()
    }

    async fn insert(&self, rsvp: &Rsvp) -> Result<(), RsvpRepositoryError> {
        self.api
            .insert(TABLE, &RsvpRow::from(rsvp))
            .await
            .map_err(map_api_error)
    }

    async fn delete(
        &self,
        event: EventId,
        member: &MemberId,
    ) -> Result<(), RsvpRepositoryError> {
        self.api
            .delete(TABLE, &pair_filters(event, member))
            .await
            .map_err(map_api_error)
    }

    async fn list_for_member(
        &self,
        member: &MemberId,
    ) -> Result<Vec<Rsvp>, RsvpRepositoryError> {
        let rows: Vec<RsvpRow> = self
            .api
            .select(TABLE, &[("member_id", format!("eq.{}", member.as_uuid()))])
            .await
            .map_err(map_api_error)?;
        rows.into_iter().map(Rsvp::try_from).collect()
    }
}
