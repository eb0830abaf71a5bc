//! Port for the birthday notification ledger.
//!
//! One row per (member, year) records that a greeting went out. The table
//! carries a unique key on that pair; adapters surface a violation as
//! [`BirthdayLedgerError::AlreadyRecorded`], which the sweep treats as
//! "another run got here first".

use async_trait::async_trait;

use crate::domain::member::MemberId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by birthday ledger adapters.
    pub enum BirthdayLedgerError {
        /// Ledger connection could not be established.
        Connection { message: String } =>
            "birthday ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "birthday ledger query failed: {message}",
        /// The (member, year) pair already has a row.
        AlreadyRecorded =>
            "greeting already recorded for this member and year",
    }
}

/// Port for recording which members were greeted in which year.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BirthdayLedger: Send + Sync {
    /// Whether a greeting is already recorded for the pair.
    async fn was_notified(
        &self,
        member: &MemberId,
        year: i32,
    ) -> Result<bool, BirthdayLedgerError>;

    /// Record that a greeting went out for the pair.
    async fn record_notified(
        &self,
        member: &MemberId,
        year: i32,
    ) -> Result<(), BirthdayLedgerError>;
}

/// Fixture implementation that remembers nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBirthdayLedger;

#[async_trait]
impl BirthdayLedger for FixtureBirthdayLedger {
    async fn was_notified(
        &self,
        _member: &MemberId,
        _year: i32,
    ) -> Result<bool, BirthdayLedgerError> {
        Ok(false)
    }

    async fn record_notified(
        &self,
        _member: &MemberId,
        _year: i32,
    ) -> Result<(), BirthdayLedgerError> {
        Ok(())
    }
}
