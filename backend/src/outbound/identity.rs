//! Identity provider adapter for the hosted auth service.
//!
//! Registration and credential checks go through `auth/v1/signup` and
//! `auth/v1/token`; email lookup for the birthday sweep uses the admin
//! user endpoint with the service key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{IdentityProvider, IdentityProviderError};

use super::rest::body_preview;

#[derive(Debug, Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AccountDto {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenDto {
    user: AccountDto,
}

/// Identity provider backed by the hosted auth HTTP API.
#[derive(Debug, Clone)]
pub struct RestIdentityProvider {
    client: Client,
    base: Url,
    service_key: String,
}

impl RestIdentityProvider {
    /// Build an adapter with an explicit request timeout.
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

    fn endpoint(&self, path: &str) -> Result<Url, IdentityProviderError> {
        self.base.join(path).map_err(|error| {
            IdentityProviderError::protocol(format!("invalid auth path {path:?}: {error}"))
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::connection(error.to_string())
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, IdentityProviderError> {
    serde_json::from_slice(body).map_err(|error| {
        IdentityProviderError::protocol(format!("auth response failed to decode: {error}"))
    })
}

fn map_signup_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let preview = body_preview(body);
    match status {
        StatusCode::CONFLICT => IdentityProviderError::EmailTaken,
        StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
            // The provider reports both weak passwords and duplicate
            // emails with 4xx statuses; tell them apart by the message.
            if preview.to_ascii_lowercase().contains("password") {
                IdentityProviderError::weak_password(preview)
            } else {
                IdentityProviderError::EmailTaken
            }
        }
        _ => IdentityProviderError::protocol(format!(
            "signup failed with status {}: {preview}",
            status.as_u16()
        )),
    }
}

fn map_token_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            IdentityProviderError::InvalidCredentials
        }
        _ => IdentityProviderError::protocol(format!(
            "token request failed with status {}: {}",
            status.as_u16(),
            body_preview(body)
        )),
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Uuid, IdentityProviderError> {
        let url = self.endpoint("auth/v1/signup")?;
        let response = self
            .client
            .post(url)
            .header("apikey", self.service_key.as_str())
            .json(&CredentialsBody { email, password })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_signup_error(status, body.as_ref()));
        }
        let account: AccountDto = decode(body.as_ref())?;
        Ok(account.id)
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Uuid, IdentityProviderError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let response = self
            .client
            .post(url)
            .header("apikey", self.service_key.as_str())
            .json(&CredentialsBody { email, password })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_token_error(status, body.as_ref()));
        }
        let token: TokenDto = decode(body.as_ref())?;
        Ok(token.user.id)
    }

    async fn email_for(
        &self,
        subject: Uuid,
    ) -> Result<Option<String>, IdentityProviderError> {
        let url = self.endpoint(&format!("auth/v1/admin/users/{subject}"))?;
        let response = self
            .client
            .get(url)
            .header("apikey", self.service_key.as_str())
            .bearer_auth(self.service_key.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(IdentityProviderError::protocol(format!(
                "user lookup failed with status {}: {}",
                status.as_u16(),
                body_preview(body.as_ref())
            )));
        }
        let account: AccountDto = decode(body.as_ref())?;
        Ok(account.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::conflict(StatusCode::CONFLICT, b"{\"msg\":\"already registered\"}".as_slice(), "EmailTaken")]
    #[case::weak(StatusCode::UNPROCESSABLE_ENTITY, b"{\"msg\":\"password too short\"}".as_slice(), "WeakPassword")]
    #[case::duplicate_422(StatusCode::UNPROCESSABLE_ENTITY, b"{\"msg\":\"email already registered\"}".as_slice(), "EmailTaken")]
    #[case::server(StatusCode::INTERNAL_SERVER_ERROR, b"".as_slice(), "Protocol")]
    fn signup_statuses_map_to_expected_errors(
        #[case] status: StatusCode,
        #[case] body: &[u8],
        #[case] expected: &str,
    ) {
        let error = map_signup_error(status, body);
        let matched = match expected {
            "EmailTaken" => matches!(error, IdentityProviderError::EmailTaken),
            "WeakPassword" => matches!(error, IdentityProviderError::WeakPassword { .. }),
            "Protocol" => matches!(error, IdentityProviderError::Protocol { .. }),
            other => panic!("unsupported expectation: {other}"),
        };
        assert!(matched, "unexpected mapping: {error}");
    }

    #[rstest]
    #[case::bad_request(StatusCode::BAD_REQUEST)]
    #[case::unauthorized(StatusCode::UNAUTHORIZED)]
    #[case::forbidden(StatusCode::FORBIDDEN)]
    fn credential_statuses_map_to_invalid_credentials(#[case] status: StatusCode) {
        let error = map_token_error(status, b"{}");
        assert!(matches!(error, IdentityProviderError::InvalidCredentials));
    }

    #[test]
    fn token_responses_decode_the_subject() {
        let body = br#"{ "access_token": "abc", "user": { "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6" } }"#;
        let token: TokenDto = decode(body.as_slice()).expect("token should decode");
        assert_eq!(
            token.user.id.to_string(),
            "3fa85f64-5717-4562-b3fc-2c963f66afa6"
        );
    }
}
