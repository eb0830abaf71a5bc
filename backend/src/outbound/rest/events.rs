//! Record-store adapter for events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{RecordApi, RecordApiError};
use crate::domain::events::{Event, EventId};
use crate::domain::member::MemberId;
use crate::domain::ports::{EventRepository, EventRepositoryError};

const TABLE: &str = "events";

/// Row shape of the `events` table.
#[derive(Debug, Serialize, Deserialize)]
struct EventRow {
    id: Uuid,
    title: String,
    starts_at: DateTime<Utc>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    created_by: Uuid,
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.0,
            title: event.title.clone(),
            starts_at: event.starts_at,
            location: event.location.clone(),
            description: event.description.clone(),
            image_url: event.image_url.clone(),
            created_by: *event.created_by.as_uuid(),
        }
    }
}

impl TryFrom<EventRow> for Event {
    type Error = EventRepositoryError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        if row.title.trim().is_empty() {
            return Err(EventRepositoryError::invalid_row(
                "event title must not be blank",
            ));
        }
        Ok(Self {
            id: EventId(row.id),
            title: row.title,
            starts_at: row.starts_at,
            location: row.location,
            description: row.description,
            image_url: row.image_url,
            created_by: MemberId::from(row.created_by),
        })
    }
}

/// Event repository backed by the hosted record store.
#[derive(Debug, Clone)]
pub struct RestEventRepository {
    api: RecordApi,
}

impl RestEventRepository {
    pub fn new(api: RecordApi) -> Self {
        Self { api }
    }
}

fn map_api_error(error: RecordApiError) -> EventRepositoryError {
    match error {
        RecordApiError::Transport { message } => EventRepositoryError::connection(message),
        RecordApiError::Status { status, message } => {
            EventRepositoryError::query(format!("status {status}: {message}"))
        }
        RecordApiError::Duplicate => {
            EventRepositoryError::query("unexpected unique key conflict")
        }
        RecordApiError::Decode { message } => EventRepositoryError::query(message),
    }
}

#[async_trait]
impl EventRepository for RestEventRepository {
    async fn insert(&self, event: &Event) -> Result<(), EventRepositoryError> {
        self.api
            .insert(TABLE, &EventRow::from(event))
            .await
            .map_err(map_api_error)
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, EventRepositoryError> {
        let rows: Vec<EventRow> = self
            .api
            .select(TABLE, &[("id", format!("eq.{}", id.0))])
            .await
            .map_err(map_api_error)?;
        rows.into_iter().next().map(Event::try_from).transpose()
    }

    async fn list_by_start_time(&self) -> Result<Vec<Event>, EventRepositoryError> {
        let rows: Vec<EventRow> = self
            .api
            .select(TABLE, &[("order", "starts_at.asc".to_owned())])
            .await
            .map_err(map_api_error)?;
        rows.into_iter().map(Event::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> EventRow {
        EventRow {
            id: Uuid::new_v4(),
            title: "Annual Reunion".to_owned(),
            starts_at: Utc::now(),
            location: Some("School grounds".to_owned()),
            description: None,
            image_url: None,
            created_by: Uuid::new_v4(),
        }
    }

    #[test]
    fn rows_round_trip_through_the_domain() {
        let source = row();
        let id = source.id;
        let event = Event::try_from(source).expect("row should convert");
        assert_eq!(event.id.0, id);
        assert_eq!(event.title, "Annual Reunion");

        let back = EventRow::from(&event);
        assert_eq!(back.id, id);
        assert_eq!(back.location.as_deref(), Some("School grounds"));
    }

    #[test]
    fn blank_titles_surface_as_invalid_rows() {
        let mut source = row();
        source.title = "  ".to_owned();
        let error = Event::try_from(source).expect_err("conversion should fail");
        assert!(matches!(error, EventRepositoryError::InvalidRow { .. }));
    }
}
