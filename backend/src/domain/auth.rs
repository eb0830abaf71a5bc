//! Registration and sign-in against the hosted identity provider.
//!
//! The provider owns credentials; this service owns the profile row. The
//! subject id the provider allocates becomes the member id, so the two
//! stores stay joined without a mapping table.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::capabilities::CapabilityResolver;
use crate::domain::member::{Member, MemberDraft, MemberId};
use crate::domain::ports::{
    IdentityProvider, IdentityProviderError, MemberRepository, MemberRepositoryError,
    RoleRepository, RoleRepositoryError,
};
use crate::domain::Error;

/// Registration payload: credentials plus the profile attributes the
/// directory requires up front.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub profile: MemberDraft,
    pub location: Option<String>,
    pub occupation: Option<String>,
}

/// A signed-in member together with the capability flags the navbar
/// needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedMember {
    pub member: Member,
    pub is_admin: bool,
}

/// Sign-up and sign-in service.
#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    members: Arc<dyn MemberRepository>,
    roles: Arc<dyn RoleRepository>,
    capabilities: CapabilityResolver,
}

fn map_identity_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::Connection { message } => {
            Error::service_unavailable(format!("identity provider unavailable: {message}"))
        }
        IdentityProviderError::Protocol { message } => {
            Error::internal(format!("identity provider error: {message}"))
        }
        IdentityProviderError::InvalidCredentials => {
            Error::unauthorized("invalid email or password")
        }
        IdentityProviderError::EmailTaken => {
            Error::conflict("an account already exists for this email")
        }
        IdentityProviderError::WeakPassword { message } => Error::invalid_request(message),
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

fn normalised_email(email: &str) -> Result<String, Error> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::invalid_request("a valid email address is required"));
    }
    Ok(email)
}

impl AuthService {
    /// Create the service over the identity provider and member stores.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        members: Arc<dyn MemberRepository>,
        roles: Arc<dyn RoleRepository>,
        capabilities: CapabilityResolver,
    ) -> Self {
        Self {
            identity,
            members,
            roles,
            capabilities,
        }
    }

    /// Register an account and create the member's profile row.
    ///
    /// Profile attributes are validated by their value types before the
    /// provider is contacted, so a bad date of birth never creates an
    /// orphaned account.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<AuthenticatedMember, Error> {
        let email = normalised_email(&request.email)?;
        let subject = self
            .identity
            .register(&email, &request.password)
            .await
            .map_err(map_identity_error)?;
        let id = MemberId::from(subject);

        let member = Member {
            id: id.clone(),
            full_name: request.profile.full_name,
            batch_year: request.profile.batch_year,
            location: request.location,
            occupation: request.occupation,
            avatar_url: None,
            bio: None,
            date_of_birth: request.profile.date_of_birth,
        };
        self.members.insert(&member).await.map_err(map_member_error)?;
        self.roles
            .grant_member_role(&id)
            .await
            .map_err(map_role_error)?;
        tracing::info!(member_id = %id, "member registered");
        Ok(AuthenticatedMember {
            member,
            is_admin: false,
        })
    }

    /// Check credentials and load the member's profile.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedMember, Error> {
        let email = normalised_email(email)?;
        let subject = self
            .identity
            .authenticate(&email, password)
            .await
            .map_err(map_identity_error)?;
        let id = MemberId::from(subject);
        self.current(&id).await
    }

    /// Resolve the profile and capabilities for an established session.
    pub async fn current(&self, id: &MemberId) -> Result<AuthenticatedMember, Error> {
        let member = self
            .members
            .find_by_id(id)
            .await
            .map_err(map_member_error)?
            .ok_or_else(|| Error::unauthorized("no profile for this account"))?;
        let caps = self.capabilities.resolve(id).await?;
        Ok(AuthenticatedMember {
            member,
            is_admin: caps.is_admin,
        })
    }
}
