//! Record-store adapter for member profiles.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{RecordApi, RecordApiError};
use crate::domain::member::{
    BatchYear, DateOfBirth, FullName, Member, MemberId, ProfileUpdate,
};
use crate::domain::ports::{MemberRepository, MemberRepositoryError};

const TABLE: &str = "members";

/// Row shape of the `members` table.
#[derive(Debug, Serialize, Deserialize)]
struct MemberRow {
    id: Uuid,
    full_name: String,
    batch_year: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    occupation: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    date_of_birth: NaiveDate,
}

impl From<&Member> for MemberRow {
    fn from(member: &Member) -> Self {
        Self {
            id: *member.id.as_uuid(),
            full_name: member.full_name.as_ref().to_owned(),
            batch_year: member.batch_year.as_ref().to_owned(),
            location: member.location.clone(),
            occupation: member.occupation.clone(),
            avatar_url: member.avatar_url.clone(),
            bio: member.bio.clone(),
            date_of_birth: member.date_of_birth.date(),
        }
    }
}

impl TryFrom<MemberRow> for Member {
    type Error = MemberRepositoryError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let full_name = FullName::new(row.full_name)
            .map_err(|error| MemberRepositoryError::invalid_row(error.to_string()))?;
        let batch_year = BatchYear::new(row.batch_year)
            .map_err(|error| MemberRepositoryError::invalid_row(error.to_string()))?;
        Ok(Self {
            id: MemberId::from(row.id),
            full_name,
            batch_year,
            location: row.location,
            occupation: row.occupation,
            avatar_url: row.avatar_url,
            bio: row.bio,
            date_of_birth: DateOfBirth::from_stored(row.date_of_birth),
        })
    }
}

/// Member repository backed by the hosted record store.
#[derive(Debug, Clone)]
pub struct RestMemberRepository {
    api: RecordApi,
}

impl RestMemberRepository {
    pub fn new(api: RecordApi) -> Self {
        Self { api }
    }
}

fn map_api_error(error: RecordApiError) -> MemberRepositoryError {
    match error {
        RecordApiError::Transport { message } => MemberRepositoryError::connection(message),
        RecordApiError::Duplicate => MemberRepositoryError::DuplicateId,
        RecordApiError::Status { status, message } => {
            MemberRepositoryError::query(format!("status {status}: {message}"))
        }
        RecordApiError::Decode { message } => MemberRepositoryError::query(message),
    }
}

fn id_filter(id: &MemberId) -> (&'static str, String) {
    ("id", format!("eq.{}", id.as_uuid()))
}

fn patch_from_update(update: &ProfileUpdate) -> serde_json::Map<String, serde_json::Value> {
    let mut patch = serde_json::Map::new();
    let fields: [(&str, &Option<String>); 4] = [
        ("location", &update.location),
        ("occupation", &update.occupation),
        ("avatar_url", &update.avatar_url),
        ("bio", &update.bio),
    ];
    for (column, value) in fields {
        if let Some(value) = value {
            patch.insert(column.to_owned(), serde_json::Value::String(value.clone()));
        }
    }
    patch
}

#[async_trait]
impl MemberRepository for RestMemberRepository {
    async fn insert(&self, member: &Member) -> Result<(), MemberRepositoryError> {
        self.api
            .insert(TABLE, &MemberRow::from(member))
            .await
            .map_err(map_api_error)
    }

    async fn find_by_id(
        &self,
        id: &MemberId,
    ) -> Result<Option<Member>, MemberRepositoryError> {
        let rows: Vec<MemberRow> = self
            .api
            .select(TABLE, &[id_filter(id)])
            .await
            .map_err(map_api_error)?;
        rows.into_iter().next().map(Member::try_from).transpose()
    }

    async fn list_ordered(&self) -> Result<Vec<Member>, MemberRepositoryError> {
        let rows: Vec<MemberRow> = self
            .api
            .select(
                TABLE,
                &[("order", "batch_year.desc,full_name.asc".to_owned())],
            )
            .await
            .map_err(map_api_error)?;
        rows.into_iter().map(Member::try_from).collect()
    }

    async fn update_profile(
        &self,
        id: &MemberId,
        update: &ProfileUpdate,
    ) -> Result<(), MemberRepositoryError> {
        let patch = patch_from_update(update);
        if patch.is_empty() {
            return Ok(());
        }
        self.api
            .update(TABLE, &[id_filter(id)], &serde_json::Value::Object(patch))
            .await
            .map(drop)
            .map_err(map_api_error)
    }

    async fn count(&self) -> Result<u64, MemberRepositoryError> {
        self.api.count(TABLE, &[]).await.map_err(map_api_error)
    }

    async fn list_with_birthday_on(
        &self,
        month: u32,
        day: u32,
    ) -> Result<Vec<Member>, MemberRepositoryError> {
        // The store has no month/day extraction in its filter grammar, so
        // fetch the roster and match client-side. Rosters here are small.
        let rows: Vec<MemberRow> = self
            .api
            .select(TABLE, &[])
            .await
            .map_err(map_api_error)?;
        rows.into_iter()
            .filter(|row| {
                row.date_of_birth.month() == month && row.date_of_birth.day() == day
            })
            .map(Member::try_from)
            .collect()
    }
}
