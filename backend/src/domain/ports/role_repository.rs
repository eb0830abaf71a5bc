//! Port for role lookups.
//!
//! Roles live in their own table rather than on the member row, so a
//! member's admin flag is re-resolved on every privileged action instead
//! of being trusted from session state.

use async_trait::async_trait;

use crate::domain::member::MemberId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by role repository adapters.
    pub enum RoleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "role repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "role repository query failed: {message}",
    }
}

/// Port for resolving and granting member roles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Whether the member holds the `admin` role right now.
    async fn is_admin(&self, member: &MemberId) -> Result<bool, RoleRepositoryError>;

    /// Grant the `member` role to a newly admitted member. Idempotent.
    async fn grant_member_role(&self, member: &MemberId) -> Result<(), RoleRepositoryError>;
}

/// Fixture implementation where nobody is an admin.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRoleRepository;

#[async_trait]
impl RoleRepository for FixtureRoleRepository {
    async fn is_admin(&self, _member: &MemberId) -> Result<bool, RoleRepositoryError> {
        Ok(false)
    }

    async fn grant_member_role(
        &self,
        _member: &MemberId,
    ) -> Result<(), RoleRepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_repository_denies_admin() {
        let repo = FixtureRoleRepository;
        let is_admin = repo
            .is_admin(&MemberId::random())
            .await
            .expect("fixture lookup should succeed");
        assert!(!is_admin);
    }
}
