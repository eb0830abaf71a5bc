//! Port for member profile persistence.

use async_trait::async_trait;

use crate::domain::member::{Member, MemberId, ProfileUpdate};

use super::define_port_error;

define_port_error! {
    /// Errors raised by member repository adapters.
    pub enum MemberRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "member repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "member repository query failed: {message}",
        /// A profile row already exists for this member id.
        DuplicateId =>
            "member profile already exists",
        /// A stored row failed domain validation on the way out.
        InvalidRow { message: String } =>
            "member row failed validation: {message}",
    }
}

/// Port for member profile storage and retrieval.
///
/// The member id doubles as the identity-provider subject, so `insert`
/// never allocates an id of its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Persist a newly admitted member's profile.
    async fn insert(&self, member: &Member) -> Result<(), MemberRepositoryError>;

    /// Fetch one profile. Returns `None` for unknown ids.
    async fn find_by_id(&self, id: &MemberId)
        -> Result<Option<Member>, MemberRepositoryError>;

    /// Fetch every profile ordered by batch year descending, then by
    /// full name ascending.
    async fn list_ordered(&self) -> Result<Vec<Member>, MemberRepositoryError>;

    /// Apply a partial profile update. `None` fields stay untouched.
    async fn update_profile(
        &self,
        id: &MemberId,
        update: &ProfileUpdate,
    ) -> Result<(), MemberRepositoryError>;

    /// Total number of member profiles.
    async fn count(&self) -> Result<u64, MemberRepositoryError>;

    /// Members whose date of birth falls on the given calendar day.
    ///
    /// `month` is 1-based. Adapters match on month and day only; the
    /// stored year is ignored.
    async fn list_with_birthday_on(
        &self,
        month: u32,
        day: u32,
    ) -> Result<Vec<Member>, MemberRepositoryError>;
}

/// Fixture implementation holding no members.
///
/// Lookups return `None`, listings are empty, and writes are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMemberRepository;

#[async_trait]
impl MemberRepository for FixtureMemberRepository {
    async fn insert(&self, _member: &Member) -> Result<(), MemberRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &MemberId,
    ) -> Result<Option<Member>, MemberRepositoryError> {
        Ok(None)
    }

    async fn list_ordered(&self) -> Result<Vec<Member>, MemberRepositoryError> {
        Ok(Vec::new())
    }

    async fn update_profile(
        &self,
        _id: &MemberId,
        _update: &ProfileUpdate,
    ) -> Result<(), MemberRepositoryError> {
        Ok(())
    }

    async fn count(&self) -> Result<u64, MemberRepositoryError> {
        Ok(0)
    }

    async fn list_with_birthday_on(
        &self,
        _month: u32,
        _day: u32,
    ) -> Result<Vec<Member>, MemberRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_repository_lookup_returns_none() {
        let repo = FixtureMemberRepository;
        let found = repo
            .find_by_id(&MemberId::random())
            .await
            .expect("fixture lookup should succeed");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn fixture_repository_listing_is_empty() {
        let repo = FixtureMemberRepository;
        let members = repo
            .list_ordered()
            .await
            .expect("fixture listing should succeed");
        assert!(members.is_empty());
    }
}
