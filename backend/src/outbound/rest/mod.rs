//! Shared record-store REST client.
//!
//! Every persistence adapter talks to the hosted record store through the
//! same PostgREST-shaped surface: `rest/v1/{table}` with column filters as
//! query parameters and the service key in both the `apikey` and
//! `Authorization` headers. This module owns transport details only;
//! per-table row shapes and domain mapping live in the entity adapters.

mod birthday_ledger;
mod donations;
mod events;
mod members;
mod photos;
mod roles;
mod rsvps;

pub use birthday_ledger::RestBirthdayLedger;
pub use donations::RestDonationRepository;
pub use events::RestEventRepository;
pub use members::RestMemberRepository;
pub use photos::RestPhotoRepository;
pub use roles::RestRoleRepository;
pub use rsvps::RestRsvpRepository;

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors surfaced by the shared record-store client.
///
/// Adapters map these onto their port error enums; `Duplicate` carries the
/// unique-key semantics several ports rely on.
#[derive(Debug, Error)]
pub enum RecordApiError {
    /// The store could not be reached or the request timed out.
    #[error("record store unreachable: {message}")]
    Transport { message: String },
    /// The store answered with a non-success status.
    #[error("record store returned status {status}: {message}")]
    Status { status: u16, message: String },
    /// A unique key rejected the write.
    #[error("record store reported a unique key conflict")]
    Duplicate,
    /// The response body could not be decoded.
    #[error("record store response failed to decode: {message}")]
    Decode { message: String },
}

/// Minimal PostgREST client bound to one base URL and service key.
#[derive(Debug, Clone)]
pub struct RecordApi {
    client: Client,
    base: Url,
    service_key: String,
}

impl RecordApi {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base: Url,
        service_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            service_key,
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, RecordApiError> {
        join_url(&self.base, &format!("rest/v1/{table}"))
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", self.service_key.as_str())
            .bearer_auth(self.service_key.as_str())
    }

    /// Fetch rows matching the filters, decoded as `T`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, RecordApiError> {
        let url = self.table_url(table)?;
        let response = self
            .authed(self.client.get(url).query(query))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref()).map_err(|error| RecordApiError::Decode {
            message: error.to_string(),
        })
    }

    /// Insert one row. A unique-key conflict maps to
    /// [`RecordApiError::Duplicate`].
    pub async fn insert<T: Serialize + Sync>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<(), RecordApiError> {
        let url = self.table_url(table)?;
        let response = self
            .authed(self.client.post(url))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(map_transport_error)?;
        expect_success(response).await
    }

    /// Patch rows matching the filters and return how many were touched.
    pub async fn update(
        &self,
        table: &str,
        filters: &[(&str, String)],
        patch: &serde_json::Value,
    ) -> Result<u64, RecordApiError> {
        let url = self.table_url(table)?;
        let response = self
            .authed(self.client.patch(url).query(filters))
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(status_error(status, body.as_ref()));
        }
        let rows: Vec<serde_json::Value> = serde_json::from_slice(body.as_ref())
            .map_err(|error| RecordApiError::Decode {
                message: error.to_string(),
            })?;
        Ok(rows.len() as u64)
    }

    /// Delete rows matching the filters. Deleting nothing is not an error.
    pub async fn delete(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<(), RecordApiError> {
        let url = self.table_url(table)?;
        let response = self
            .authed(self.client.delete(url).query(filters))
            .send()
            .await
            .map_err(map_transport_error)?;
        expect_success(response).await
    }

    /// Count rows matching the filters.
    ///
    /// Fetches ids only and counts them client-side, which is adequate for
    /// the small tables this portal keeps.
    pub async fn count(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<u64, RecordApiError> {
        let mut query: Vec<(&str, String)> = vec![("select", "id".to_owned())];
        query.extend(filters.iter().map(|(k, v)| (*k, v.clone())));
        let rows: Vec<serde_json::Value> = self.select(table, &query).await?;
        Ok(rows.len() as u64)
    }
}

pub(crate) fn join_url(base: &Url, path: &str) -> Result<Url, RecordApiError> {
    base.join(path).map_err(|error| RecordApiError::Transport {
        message: format!("invalid endpoint path {path:?}: {error}"),
    })
}

pub(crate) fn map_transport_error(error: reqwest::Error) -> RecordApiError {
    RecordApiError::Transport {
        message: error.to_string(),
    }
}

pub(crate) fn status_error(status: StatusCode, body: &[u8]) -> RecordApiError {
    if status == StatusCode::CONFLICT {
        return RecordApiError::Duplicate;
    }
    RecordApiError::Status {
        status: status.as_u16(),
        message: body_preview(body),
    }
}

async fn expect_success(response: reqwest::Response) -> Result<(), RecordApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.bytes().await.map_err(map_transport_error)?;
    Err(status_error(status, body.as_ref()))
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
