//! Daily birthday greeting sweep.
//!
//! The sweep is idempotent per (member, year): a ledger row records each
//! greeting that went out, and the row is only written after a successful
//! send. A send failure leaves the pair eligible so the next run retries
//! it; the ledger's unique key absorbs overlapping manual runs.

use std::sync::Arc;

use chrono::Datelike;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::member::{Member, MemberId};
use crate::domain::ports::{
    BirthdayLedger, BirthdayLedgerError, IdentityProvider, MemberRepository,
    MemberRepositoryError, NotificationSender,
};
use crate::domain::Error;

/// What happened to one member during a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "outcome")]
pub enum SweepOutcome {
    /// Greeting delivered and recorded.
    Sent,
    /// A ledger row already covered this year.
    Skipped,
    /// Delivery failed; the pair stays eligible for the next run.
    Failed { reason: String },
}

/// Per-member line in the sweep report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepDetail {
    #[schema(value_type = String)]
    pub member_id: MemberId,
    pub full_name: String,
    #[serde(flatten)]
    pub outcome: SweepOutcome,
}

/// Report produced by one sweep run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    pub message: String,
    pub sent: u32,
    pub skipped: u32,
    pub failed: u32,
    pub details: Vec<SweepDetail>,
}

/// The sweep job itself.
#[derive(Clone)]
pub struct BirthdaySweep {
    members: Arc<dyn MemberRepository>,
    ledger: Arc<dyn BirthdayLedger>,
    identity: Arc<dyn IdentityProvider>,
    sender: Arc<dyn NotificationSender>,
    clock: Arc<dyn Clock>,
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

impl BirthdaySweep {
    /// Wire the sweep to its stores.
    pub fn new(
        members: Arc<dyn MemberRepository>,
        ledger: Arc<dyn BirthdayLedger>,
        identity: Arc<dyn IdentityProvider>,
        sender: Arc<dyn NotificationSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            members,
            ledger,
            identity,
            sender,
            clock,
        }
    }

    /// Run one sweep for today's date.
    ///
    /// Only a failure to list today's celebrants aborts the run;
    /// per-member failures are recorded in the summary and retried on the
    /// next run.
    pub async fn run(&self) -> Result<SweepSummary, Error> {
        let today = self.clock.utc().date_naive();
        let year = today.year();
        let celebrants = self
            .members
            .list_with_birthday_on(today.month(), today.day())
            .await
            .map_err(map_member_error)?;

        let mut details = Vec::with_capacity(celebrants.len());
        let (mut sent, mut skipped, mut failed) = (0_u32, 0_u32, 0_u32);
        for member in celebrants {
            // The repository matches month and day; re-check through the
            // domain rule so leap-day birthdays only fire on leap years.
            if !member.date_of_birth.falls_on(today) {
                continue;
            }
            let outcome = self.greet(&member, year).await;
            match &outcome {
                SweepOutcome::Sent => sent += 1,
                SweepOutcome::Skipped => skipped += 1,
                SweepOutcome::Failed { reason } => {
                    failed += 1;
                    tracing::warn!(
                        member_id = %member.id,
                        reason,
                        "birthday greeting failed; will retry next run"
                    );
                }
            }
            details.push(SweepDetail {
                member_id: member.id.clone(),
                full_name: member.full_name.to_string(),
                outcome,
            });
        }

        let summary = SweepSummary {
            message: format!(
                "Processed {} birthdays: {sent} sent, {skipped} skipped, {failed} failed",
                details.len()
            ),
            sent,
            skipped,
            failed,
            details,
        };
        tracing::info!(
            sent = summary.sent,
            skipped = summary.skipped,
            failed = summary.failed,
            "birthday sweep finished"
        );
        Ok(summary)
    }

    async fn greet(&self, member: &Member, year: i32) -> SweepOutcome {
        match self.ledger.was_notified(&member.id, year).await {
            Ok(true) => return SweepOutcome::Skipped,
            Ok(false) => {}
            Err(error) => {
                return SweepOutcome::Failed {
                    reason: error.to_string(),
                };
            }
        }

        let email = match self.identity.email_for(*member.id.as_uuid()).await {
            Ok(Some(email)) => email,
            Ok(None) => {
                return SweepOutcome::Failed {
                    reason: "no address on file".to_owned(),
                };
            }
            Err(error) => {
                return SweepOutcome::Failed {
                    reason: error.to_string(),
                };
            }
        };

        if let Err(error) = self.sender.send_birthday_greeting(&email, member).await {
            return SweepOutcome::Failed {
                reason: error.to_string(),
            };
        }

        // Recorded only after a successful send. A duplicate key means an
        // overlapping run already recorded this pair.
        match self.ledger.record_notified(&member.id, year).await {
            Ok(()) | Err(BirthdayLedgerError::AlreadyRecorded) => SweepOutcome::Sent,
            Err(error) => SweepOutcome::Failed {
                reason: error.to_string(),
            },
        }
    }
}
