//! Record-store adapter for the birthday notification ledger.
//!
//! The `birthday_greetings` table carries a unique key on
//! (member_id, year); a conflicting insert surfaces as
//! [`BirthdayLedgerError::AlreadyRecorded`] so concurrent sweeps stay
//! idempotent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{RecordApi, RecordApiError};
use crate::domain::member::MemberId;
use crate::domain::ports::{BirthdayLedger, BirthdayLedgerError};

const TABLE: &str = "birthday_greetings";

/// Row shape of the `birthday_greetings` table.
#[derive(Debug, Serialize, Deserialize)]
struct GreetingRow {
    member_id: Uuid,
    year: i32,
}

/// Birthday ledger backed by the hosted record store.
#[derive(Debug, Clone)]
pub struct RestBirthdayLedger {
    api: RecordApi,
}

impl RestBirthdayLedger {
    pub fn new(api: RecordApi) -> Self {
        Self { api }
    }
}

fn map_api_error(error: RecordApiError) -> BirthdayLedgerError {
    match error {
        RecordApiError::Transport { message } => BirthdayLedgerError::connection(message),
        RecordApiError::Duplicate => BirthdayLedgerError::AlreadyRecorded,
        RecordApiError::Status { status, message } => {
            BirthdayLedgerError::query(format!("status {status}: {message}"))
        }
        RecordApiError::Decode { message } => BirthdayLedgerError::query(message),
    }
}

fn pair_filters(member: &MemberId, year: i32) -> [(&'static str, String); 2] {
    [
        ("member_id", format!("eq.{}", member.as_uuid())),
        ("year", format!("eq.{year}")),
    ]
}

#[async_trait]
impl BirthdayLedger for RestBirthdayLedger {
    async fn was_notified(
        &self,
        member: &MemberId,
        year: i32,
    ) -> Result<bool, BirthdayLedgerError> {
        let rows: Vec<GreetingRow> = self
            .api
            .select(TABLE, &pair_filters(member, year))
            .await
            .map_err(map_api_error)?;
        Ok(!rows.is_empty())
    }

    async fn record_notified(
        &self,
        member: &MemberId,
        year: i32,
    ) -> Result<(), BirthdayLedgerError> {
        let row = GreetingRow {
            member_id: *member.as_uuid(),
            year,
        };
        self.api.insert(TABLE, &row).await.map_err(map_api_error)
    }
}
