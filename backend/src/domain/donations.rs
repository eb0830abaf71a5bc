//! Donations, verification, and the donor wall.
//!
//! Every donation starts unverified. Admins either verify it (flipping a
//! one-way flag) or reject it (removing the row). The donor wall and the
//! public total only ever see verified rows, and the total is recomputed
//! from those rows on every call rather than cached.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::capabilities::CapabilityResolver;
use crate::domain::member::MemberId;
use crate::domain::ports::{
    BlobStore, BlobStoreError, DonationRepository, DonationRepositoryError, MemberRepository,
    MemberRepositoryError,
};
use crate::domain::Error;

/// Blob store bucket holding payment proof screenshots.
pub const DONATION_PROOF_BUCKET: &str = "donation-proofs";

/// Upper bound on proof image payloads.
pub const MAX_PROOF_BYTES: usize = 5 * 1024 * 1024;

/// Donor name shown on the wall when the anonymity flag is set.
const ANONYMOUS_DONOR: &str = "Anonymous";

/// How many verified donations the wall shows.
const DONOR_WALL_LIMIT: usize = 10;

/// Stable donation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct DonationId(pub Uuid);

impl DonationId {
    /// Generate a new random [`DonationId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DonationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validation errors raised by donation value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DonationValidationError {
    NegativeAmount,
}

impl fmt::Display for DonationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeAmount => write!(f, "amounts must not be negative"),
        }
    }
}

impl std::error::Error for DonationValidationError {}

/// A rupee amount held in minor units (paise).
///
/// ## Invariants
/// - Never negative. Zero occurs only in totals; submissions require a
///   strictly positive amount.
/// - Arithmetic is integer only; there is no fractional representation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "i64", into = "i64")]
#[schema(value_type = i64, example = 150_000)]
pub struct Amount(i64);

impl Amount {
    /// Zero paise, the identity for totalling.
    pub const ZERO: Self = Self(0);

    /// Construct from paise, rejecting negative values.
    pub fn from_paise(paise: i64) -> Result<Self, DonationValidationError> {
        if paise < 0 {
            return Err(DonationValidationError::NegativeAmount);
        }
        Ok(Self(paise))
    }

    /// Whether the amount is exactly zero.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// The raw paise value.
    pub fn paise(self) -> i64 {
        self.0
    }

    /// Saturating-free checked addition for totalling.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl TryFrom<i64> for Amount {
    type Error = DonationValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_paise(value)
    }
}

impl From<Amount> for i64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

/// A donation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: DonationId,
    #[schema(value_type = String)]
    pub member_id: MemberId,
    /// The donor's display name captured at submission time.
    pub donor_name: String,
    pub anonymous: bool,
    pub amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_url: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Proof image attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Fields supplied when a member submits a donation.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationDraft {
    pub amount: Amount,
    pub anonymous: bool,
    pub message: Option<String>,
    pub transaction_reference: Option<String>,
    pub payment_method: Option<String>,
    pub proof: Option<ProofImage>,
}

/// One entry on the public donor wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonorWallEntry {
    pub donor_name: String,
    pub anonymous: bool,
    pub amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub donated_at: DateTime<Utc>,
}

/// Donation submission, review, and donor wall service.
#[derive(Clone)]
pub struct DonationService {
    donations: Arc<dyn DonationRepository>,
    members: Arc<dyn MemberRepository>,
    blobs: Arc<dyn BlobStore>,
    capabilities: CapabilityResolver,
    clock: Arc<dyn Clock>,
}

fn map_donation_error(error: DonationRepositoryError) -> Error {
    match error {
        DonationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("donation store unavailable: {message}"))
        }
        DonationRepositoryError::Query { message } => {
            Error::internal(format!("donation store error: {message}"))
        }
        DonationRepositoryError::NotFound => Error::not_found("donation not found"),
        DonationRepositoryError::InvalidRow { message } => {
            Error::internal(format!("donation row failed validation: {message}"))
        }
    }
}

fn map_member_error(error: MemberRepositoryError) -> Error {
    match error {
        MemberRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("member store unavailable: {message}"))
        }
        MemberRepositoryError::Query { message } => {
            Error::internal(format!("member store error: {message}"))
        }
        MemberRepositoryError::DuplicateId => {
            Error::conflict("member profile already exists")
        }
        MemberRepositoryError::InvalidRow { message } => {
            Error::internal(format!("member row failed validation: {message}"))
        }
    }
}

fn map_blob_error(error: BlobStoreError) -> Error {
    match error {
        BlobStoreError::Connection { message } => {
            Error::service_unavailable(format!("blob store unavailable: {message}"))
        }
        BlobStoreError::Operation { message } => {
            Error::service_unavailable(format!("blob store operation failed: {message}"))
        }
        BlobStoreError::Rejected { message } => Error::invalid_request(message),
    }
}

fn normalised(text: Option<String>) -> Option<String> {
    text.map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

impl DonationService {
    /// Create the service over its stores.
    pub fn new(
        donations: Arc<dyn DonationRepository>,
        members: Arc<dyn MemberRepository>,
        blobs: Arc<dyn BlobStore>,
        capabilities: CapabilityResolver,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            donations,
            members,
            blobs,
            capabilities,
            clock,
        }
    }

    /// Submit a donation for review.
    ///
    /// When a proof image is attached it is uploaded first; an upload
    /// failure means no donation row is ever created. The row always
    /// starts unverified.
    pub async fn submit(
        &self,
        caller: &MemberId,
        draft: DonationDraft,
    ) -> Result<Donation, Error> {
        let member = self
            .members
            .find_by_id(caller)
            .await
            .map_err(map_member_error)?
            .ok_or_else(|| Error::unauthorized("no profile for the signed-in member"))?;

        if draft.amount.is_zero() {
            return Err(Error::invalid_request("donation amount must be positive"));
        }

        let id = DonationId::random();
        let proof_url = match draft.proof {
            Some(proof) => Some(self.upload_proof(caller, id, proof).await?),
            None => None,
        };

        let donation = Donation {
            id,
            member_id: caller.clone(),
            donor_name: member.full_name.as_ref().to_owned(),
            anonymous: draft.anonymous,
            amount: draft.amount,
            message: normalised(draft.message),
            transaction_reference: normalised(draft.transaction_reference),
            payment_method: normalised(draft.payment_method),
            proof_url,
            verified: false,
            created_at: self.clock.utc(),
        };
        self.donations
            .insert(&donation)
            .await
            .map_err(map_donation_error)?;
        tracing::info!(donation_id = %donation.id, "donation submitted for review");
        Ok(donation)
    }

    async fn upload_proof(
        &self,
        caller: &MemberId,
        id: DonationId,
        proof: ProofImage,
    ) -> Result<String, Error> {
        if !proof.content_type.starts_with("image/") {
            return Err(Error::invalid_request(
                "proof attachments must be images",
            ));
        }
        if proof.bytes.len() > MAX_PROOF_BYTES {
            return Err(Error::invalid_request(
                "proof attachments must be 5 MiB or smaller",
            ));
        }
        let key = format!("{caller}/{id}");
        self.blobs
            .upload(DONATION_PROOF_BUCKET, &key, &proof.content_type, proof.bytes)
            .await
            .map_err(map_blob_error)
    }

    /// Mark a donation verified. Admin-only and terminal.
    pub async fn verify(&self, caller: &MemberId, id: DonationId) -> Result<(), Error> {
        self.capabilities.require_admin(caller).await?;
        self.donations
            .find_by_id(id)
            .await
            .map_err(map_donation_error)?
            .ok_or_else(|| Error::not_found(format!("donation {id} not found")))?;
        self.donations
            .mark_verified(id)
            .await
            .map_err(map_donation_error)?;
        tracing::info!(donation_id = %id, "donation verified");
        Ok(())
    }

    /// Remove a donation from review. Admin-only and terminal.
    pub async fn reject(&self, caller: &MemberId, id: DonationId) -> Result<(), Error> {
        self.capabilities.require_admin(caller).await?;
        self.donations
            .find_by_id(id)
            .await
            .map_err(map_donation_error)?
            .ok_or_else(|| Error::not_found(format!("donation {id} not found")))?;
        self.donations.delete(id).await.map_err(map_donation_error)?;
        tracing::info!(donation_id = %id, "donation rejected");
        Ok(())
    }

    /// Unverified donations awaiting review, for the admin panel.
    pub async fn list_pending(&self, caller: &MemberId) -> Result<Vec<Donation>, Error> {
        self.capabilities.require_admin(caller).await?;
        self.donations.list_pending().await.map_err(map_donation_error)
    }

    /// The donor wall: the ten newest verified donations, with anonymous
    /// donors masked.
    pub async fn donor_wall(&self) -> Result<Vec<DonorWallEntry>, Error> {
        let verified = self
            .donations
            .list_verified()
            .await
            .map_err(map_donation_error)?;
        Ok(verified
            .into_iter()
            .take(DONOR_WALL_LIMIT)
            .map(|donation| DonorWallEntry {
                donor_name: if donation.anonymous {
                    ANONYMOUS_DONOR.to_owned()
                } else {
                    donation.donor_name
                },
                anonymous: donation.anonymous,
                amount: donation.amount,
                message: donation.message,
                donated_at: donation.created_at,
            })
            .collect())
    }

    /// The publicly displayed total, recomputed from verified rows on
    /// every call.
    pub async fn public_total(&self) -> Result<Amount, Error> {
        let verified = self
            .donations
            .list_verified()
            .await
            .map_err(map_donation_error)?;
        total_of(&verified)
    }
}

/// Sum donation amounts, failing on overflow rather than wrapping.
pub(crate) fn total_of(donations: &[Donation]) -> Result<Amount, Error> {
    let mut total = Amount::ZERO;
    for donation in donations {
        total = total
            .checked_add(donation.amount)
            .ok_or_else(|| Error::internal("donation total overflowed"))?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::{
        BatchYear, DateOfBirth, FullName, Member,
    };
    use crate::domain::ports::{
        FixtureBlobStore, FixtureRoleRepository, MockBlobStore, MockDonationRepository,
        MockMemberRepository, MockRoleRepository,
    };
    use crate::domain::ErrorCode;
    use chrono::NaiveDate;
    use mockable::DefaultClock;
    use rstest::{fixture, rstest};

    #[fixture]
    fn donor() -> Member {
        Member {
            id: MemberId::random(),
            full_name: FullName::new("Asha Rao").expect("valid name"),
            batch_year: BatchYear::new("2008").expect("valid batch"),
            location: None,
            occupation: None,
            avatar_url: None,
            bio: None,
            date_of_birth: DateOfBirth::from_stored(
                NaiveDate::from_ymd_opt(1990, 3, 14).expect("valid date"),
            ),
        }
    }

    fn paise(value: i64) -> Amount {
        Amount::from_paise(value).expect("positive amount")
    }

    fn sample_donation(anonymous: bool, amount: i64, verified: bool) -> Donation {
        Donation {
            id: DonationId::random(),
            member_id: MemberId::random(),
            donor_name: "Asha Rao".to_owned(),
            anonymous,
            amount: paise(amount),
            message: None,
            transaction_reference: None,
            payment_method: None,
            proof_url: None,
            verified,
            created_at: Utc::now(),
        }
    }

    fn service(
        donations: MockDonationRepository,
        members: MockMemberRepository,
        blobs: Arc<dyn BlobStore>,
        roles: Arc<dyn crate::domain::ports::RoleRepository>,
    ) -> DonationService {
        DonationService::new(
            Arc::new(donations),
            Arc::new(members),
            blobs,
            CapabilityResolver::new(roles),
            Arc::new(DefaultClock),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn submission_starts_unverified(donor: Member) {
        let caller = donor.id.clone();
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(donor)));
        let mut donations = MockDonationRepository::new();
        donations
            .expect_insert()
            .times(1)
            .withf(|donation| !donation.verified)
            .returning(|_| Ok(()));

        let svc = service(
            donations,
            members,
            Arc::new(FixtureBlobStore),
            Arc::new(FixtureRoleRepository),
        );
        let draft = DonationDraft {
            amount: paise(150_000),
            anonymous: false,
            message: Some("  For the library fund  ".to_owned()),
            transaction_reference: None,
            payment_method: Some("UPI".to_owned()),
            proof: None,
        };
        let donation = svc.submit(&caller, draft).await.expect("submitted");
        assert!(!donation.verified);
        assert_eq!(donation.message.as_deref(), Some("For the library fund"));
        assert_eq!(donation.donor_name, "Asha Rao");
    }

    #[rstest]
    #[tokio::test]
    async fn failed_proof_upload_leaves_no_row(donor: Member) {
        let caller = donor.id.clone();
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(donor)));
        let mut donations = MockDonationRepository::new();
        donations.expect_insert().times(0);
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_upload()
            .times(1)
            .returning(|_, _, _, _| Err(BlobStoreError::operation("disk full")));

        let svc = service(donations, members, Arc::new(blobs), Arc::new(FixtureRoleRepository));
        let draft = DonationDraft {
            amount: paise(50_000),
            anonymous: false,
            message: None,
            transaction_reference: None,
            payment_method: None,
            proof: Some(ProofImage {
                content_type: "image/png".to_owned(),
                bytes: vec![0_u8; 16],
            }),
        };
        let error = svc.submit(&caller, draft).await.expect_err("upload failed");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn non_image_proof_is_rejected_before_upload(donor: Member) {
        let caller = donor.id.clone();
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(donor)));
        let mut donations = MockDonationRepository::new();
        donations.expect_insert().times(0);
        let mut blobs = MockBlobStore::new();
        blobs.expect_upload().times(0);

        let svc = service(donations, members, Arc::new(blobs), Arc::new(FixtureRoleRepository));
        let draft = DonationDraft {
            amount: paise(50_000),
            anonymous: false,
            message: None,
            transaction_reference: None,
            payment_method: None,
            proof: Some(ProofImage {
                content_type: "application/pdf".to_owned(),
                bytes: vec![0_u8; 16],
            }),
        };
        let error = svc.submit(&caller, draft).await.expect_err("bad proof");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn verification_requires_the_admin_role() {
        let mut donations = MockDonationRepository::new();
        donations.expect_mark_verified().times(0);

        let svc = service(
            donations,
            MockMemberRepository::new(),
            Arc::new(FixtureBlobStore),
            Arc::new(FixtureRoleRepository),
        );
        let error = svc
            .verify(&MemberId::random(), DonationId::random())
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn rejecting_a_vanished_donation_is_not_found() {
        let mut roles = MockRoleRepository::new();
        roles.expect_is_admin().returning(|_| Ok(true));
        let mut donations = MockDonationRepository::new();
        donations.expect_find_by_id().returning(|_| Ok(None));
        donations.expect_delete().times(0);

        let svc = service(
            donations,
            MockMemberRepository::new(),
            Arc::new(FixtureBlobStore),
            Arc::new(roles),
        );
        let error = svc
            .reject(&MemberId::random(), DonationId::random())
            .await
            .expect_err("double reject");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn donor_wall_masks_anonymous_donors_and_caps_at_ten() {
        let mut rows: Vec<Donation> = (0..12)
            .map(|index| sample_donation(false, 1_000 + i64::from(index), true))
            .collect();
        rows[0].anonymous = true;
        let mut donations = MockDonationRepository::new();
        donations
            .expect_list_verified()
            .return_once(move || Ok(rows));

        let svc = service(
            donations,
            MockMemberRepository::new(),
            Arc::new(FixtureBlobStore),
            Arc::new(FixtureRoleRepository),
        );
        let wall = svc.donor_wall().await.expect("wall listed");
        assert_eq!(wall.len(), 10);
        assert_eq!(wall[0].donor_name, "Anonymous");
        assert_eq!(wall[1].donor_name, "Asha Rao");
    }

    #[rstest]
    #[tokio::test]
    async fn public_total_sums_verified_rows() {
        let rows = vec![
            sample_donation(false, 100_000, true),
            sample_donation(true, 25_000, true),
        ];
        let mut donations = MockDonationRepository::new();
        donations
            .expect_list_verified()
            .return_once(move || Ok(rows));

        let svc = service(
            donations,
            MockMemberRepository::new(),
            Arc::new(FixtureBlobStore),
            Arc::new(FixtureRoleRepository),
        );
        let total = svc.public_total().await.expect("total computed");
        assert_eq!(total.paise(), 125_000);
    }

    #[rstest]
    fn amounts_reject_negative_paise() {
        assert_eq!(
            Amount::from_paise(-5),
            Err(DonationValidationError::NegativeAmount)
        );
        assert!(Amount::from_paise(0).expect("zero is valid").is_zero());
    }

    #[rstest]
    #[tokio::test]
    async fn zero_amount_submissions_are_rejected(donor: Member) {
        let caller = donor.id.clone();
        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(donor)));
        let mut donations = MockDonationRepository::new();
        donations.expect_insert().times(0);

        let svc = service(
            donations,
            members,
            Arc::new(FixtureBlobStore),
            Arc::new(FixtureRoleRepository),
        );
        let draft = DonationDraft {
            amount: Amount::ZERO,
            anonymous: false,
            message: None,
            transaction_reference: None,
            payment_method: None,
            proof: None,
        };
        let error = svc.submit(&caller, draft).await.expect_err("zero amount");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn empty_wall_totals_zero() {
        let total = total_of(&[]).expect("empty total");
        assert_eq!(total.paise(), 0);
    }
}
