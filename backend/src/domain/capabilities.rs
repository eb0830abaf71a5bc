//! Capability resolution for privileged actions.
//!
//! Admin status is stored in a dedicated role table and re-resolved from
//! it on every privileged call. Session state only identifies the caller;
//! it never carries authority.

use std::sync::Arc;

use crate::domain::member::MemberId;
use crate::domain::ports::{RoleRepository, RoleRepositoryError};
use crate::domain::Error;

/// What a caller is allowed to do right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub is_admin: bool,
}

/// Resolves a member's capabilities from the role table.
#[derive(Clone)]
pub struct CapabilityResolver {
    roles: Arc<dyn RoleRepository>,
}

fn map_role_error(error: RoleRepositoryError) -> Error {
    match error {
        RoleRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("role store unavailable: {message}"))
        }
        RoleRepositoryError::Query { message } => {
            Error::internal(format!("role store error: {message}"))
        }
    }
}

impl CapabilityResolver {
    /// Create a resolver over the role store.
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }

    /// Look up the member's current capabilities.
    pub async fn resolve(&self, member: &MemberId) -> Result<Capabilities, Error> {
        let is_admin = self.roles.is_admin(member).await.map_err(map_role_error)?;
        Ok(Capabilities { is_admin })
    }

    /// Resolve and fail with [`crate::domain::ErrorCode::Forbidden`] unless
    /// the member is an admin.
    pub async fn require_admin(&self, member: &MemberId) -> Result<(), Error> {
        let caps = self.resolve(member).await?;
        if caps.is_admin {
            Ok(())
        } else {
            Err(Error::forbidden("admin role required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureRoleRepository, MockRoleRepository};
    use crate::domain::ErrorCode;

    #[tokio::test]
    async fn fixture_roles_resolve_to_non_admin() {
        let resolver = CapabilityResolver::new(Arc::new(FixtureRoleRepository));
        let caps = resolver
            .resolve(&MemberId::random())
            .await
            .expect("resolution should succeed");
        assert!(!caps.is_admin);
    }

    #[tokio::test]
    async fn require_admin_rejects_plain_members() {
        let resolver = CapabilityResolver::new(Arc::new(FixtureRoleRepository));
        let error = resolver
            .require_admin(&MemberId::random())
            .await
            .expect_err("plain member should be rejected");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn role_store_outage_maps_to_service_unavailable() {
        let mut roles = MockRoleRepository::new();
        roles
            .expect_is_admin()
            .returning(|_| Err(RoleRepositoryError::connection("refused")));
        let resolver = CapabilityResolver::new(Arc::new(roles));
        let error = resolver
            .resolve(&MemberId::random())
            .await
            .expect_err("outage should surface");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
