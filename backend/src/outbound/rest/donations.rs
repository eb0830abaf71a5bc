//! Record-store adapter for donations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{RecordApi, RecordApiError};
use crate::domain::donations::{Amount, Donation, DonationId};
use crate::domain::member::MemberId;
use crate::domain::ports::{DonationRepository, DonationRepositoryError};

const TABLE: &str = "donations";

/// Row shape of the `donations` table. Amounts are stored in paise.
#[derive(Debug, Serialize, Deserialize)]
struct DonationRow {
    id: Uuid,
    member_id: Uuid,
    donor_name: String,
    anonymous: bool,
    amount_paise: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    transaction_reference: Option<String>,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default)]
    proof_url: Option<String>,
    verified: bool,
    created_at: DateTime<Utc>,
}

impl From<&Donation> for DonationRow {
    fn from(donation: &Donation) -> Self {
        Self {
            id: donation.id.0,
            member_id: *donation.member_id.as_uuid(),
            donor_name: donation.donor_name.clone(),
            anonymous: donation.anonymous,
            amount_paise: donation.amount.paise(),
            message: donation.message.clone(),
            transaction_reference: donation.transaction_reference.clone(),
            payment_method: donation.payment_method.clone(),
            proof_url: donation.proof_url.clone(),
            verified: donation.verified,
            created_at: donation.created_at,
        }
    }
}

impl TryFrom<DonationRow> for Donation {
    type Error = DonationRepositoryError;

    fn try_from(row: DonationRow) -> Result<Self, Self::Error> {
        let amount = Amount::from_paise(row.amount_paise)
            .map_err(|error| DonationRepositoryError::invalid_row(error.to_string()))?;
        Ok(Self {
            id: DonationId(row.id),
            member_id: MemberId::from(row.member_id),
            donor_name: row.donor_name,
            anonymous: row.anonymous,
            amount,
            message: row.message,
            transaction_reference: row.transaction_reference,
            payment_method: row.payment_method,
            proof_url: row.proof_url,
            verified: row.verified,
            created_at: row.created_at,
        })
    }
}

/// Donation repository backed by the hosted record store.
#[derive(Debug, Clone)]
pub struct RestDonationRepository {
    api: RecordApi,
}

impl RestDonationRepository {
    pub fn new(api: RecordApi) -> Self {
        Self { api }
    }
}

fn map_api_error(error: RecordApiError) -> DonationRepositoryError {
    match error {
        RecordApiError::Transport { message } => DonationRepositoryError::connection(message),
        RecordApiError::Status { status, message } => {
            DonationRepositoryError::query(format!("status {status}: {message}"))
        }
        RecordApiError::Duplicate => {
            DonationRepositoryError::query("unexpected unique key conflict")
        }
        RecordApiError::Decode { message } => DonationRepositoryError::query(message),
    }
}

fn id_filter(id: DonationId) -> (&'static str, String) {
    ("id", format!("eq.{}", id.0))
}

#[async_trait]
impl DonationRepository for RestDonationRepository {
    async fn insert(&self, donation: &Donation) -> Result<(), DonationRepositoryError> {
        self.api
            .insert(TABLE, &DonationRow::from(donation))
            .await
            .map_err(map_api_error)
    }

    async fn find_by_id(
        &self,
        id: DonationId,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        let rows: Vec<DonationRow> = self
            .api
            .select(TABLE, &[id_filter(id)])
            .await
            .map_err(map_api_error)?;
        rows.into_iter().next().map(Donation::try_from).transpose()
    }

    async fn list_pending(&self) -> Result<Vec<Donation>, DonationRepositoryError> {
        let rows: Vec<DonationRow> = self
            .api
            .select(
                TABLE,
                &[
                    ("verified", "eq.false".to_owned()),
                    ("order", "created_at.desc".to_owned()),
                ],
            )
            .await
            .map_err(map_api_error)?;
        rows.into_iter().map(Donation::try_from).collect()
    }

    async fn list_verified(&self) -> Result<Vec<Donation>, DonationRepositoryError> {
        let rows: Vec<DonationRow> = self
            .api
            .select(
                TABLE,
                &[
                    ("verified", "eq.true".to_owned()),
                    ("order", "created_at.desc".to_owned()),
                ],
            )
            .await
            .map_err(map_api_error)?;
        rows.into_iter().map(Donation::try_from).collect()
    }

    async fn mark_verified(&self, id: DonationId) -> Result<(), DonationRepositoryError> {
        let touched = self
            .api
            .update(
                TABLE,
                &[id_filter(id)],
                &serde_json::json!({ "verified": true }),
            )
            .await
            .map_err(map_api_error)?;
        if touched == 0 {
            return Err(DonationRepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: DonationId) -> Result<(), DonationRepositoryError> {
        self.api
            .delete(TABLE, &[id_filter(id)])
            .await
            .map_err(map_api_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> DonationRow {
        DonationRow {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            donor_name: "Ada Lovelace".to_owned(),
            anonymous: false,
            amount_paise: 500_000,
            message: Some("For the library".to_owned()),
            transaction_reference: None,
            payment_method: Some("upi".to_owned()),
            proof_url: None,
            verified: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rows_round_trip_through_the_domain() {
        let source = row();
        let id = source.id;
        let donation = Donation::try_from(source).expect("row should convert");
        assert_eq!(donation.id.0, id);
        assert_eq!(donation.amount.paise(), 500_000);
        assert!(!donation.verified);

        let back = DonationRow::from(&donation);
        assert_eq!(back.amount_paise, 500_000);
        assert_eq!(back.donor_name, "Ada Lovelace");
    }

    #[test]
    fn negative_amounts_surface_as_invalid_rows() {
        let mut source = row();
        source.amount_paise = -1;
        let error = Donation::try_from(source).expect_err("conversion should fail");
        assert!(matches!(error, DonationRepositoryError::InvalidRow { .. }));
    }
}
