//! Port for the hosted identity provider.
//!
//! Account records (email and password credentials) live in the hosted
//! provider; the subject id it allocates doubles as the member id for the
//! profile row created at registration.

use async_trait::async_trait;
use uuid::Uuid;

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// Provider could not be reached.
        Connection { message: String } =>
            "identity provider connection failed: {message}",
        /// The provider returned an unexpected response.
        Protocol { message: String } =>
            "identity provider protocol error: {message}",
        /// Email or password did not match an account.
        InvalidCredentials =>
            "invalid email or password",
        /// An account already exists for this email address.
        EmailTaken =>
            "an account already exists for this email",
        /// The provider rejected the password as too weak.
        WeakPassword { message: String } =>
            "password rejected: {message}",
    }
}

/// Port for account registration and credential checks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and return the subject id the provider allocated.
    async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Uuid, IdentityProviderError>;

    /// Check credentials and return the account's subject id.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Uuid, IdentityProviderError>;

    /// Look up the email address on file for a subject, if the account
    /// still exists.
    async fn email_for(&self, subject: Uuid) -> Result<Option<String>, IdentityProviderError>;
}

/// Fixture implementation that accepts everyone.
///
/// Registration and authentication both return a fresh random subject, so
/// use it only where identity behaviour is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn register(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<Uuid, IdentityProviderError> {
        Ok(Uuid::new_v4())
    }

    async fn authenticate(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<Uuid, IdentityProviderError> {
        Ok(Uuid::new_v4())
    }

    async fn email_for(
        &self,
        _subject: Uuid,
    ) -> Result<Option<String>, IdentityProviderError> {
        Ok(None)
    }
}
