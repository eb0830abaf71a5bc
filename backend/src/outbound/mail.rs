//! Mail adapter for birthday greetings.
//!
//! Greetings go out through a hosted transactional mail HTTP API. The
//! adapter owns message composition as well as transport; the sweep only
//! supplies the recipient address and the member being greeted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::domain::member::Member;
use crate::domain::ports::{NotificationSender, NotificationSenderError};

use super::rest::body_preview;

#[derive(Debug, Serialize)]
struct MailMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: String,
    text: String,
}

/// Notification sender backed by a transactional mail HTTP API.
#[derive(Debug, Clone)]
pub struct HttpNotificationSender {
    client: Client,
    endpoint: Url,
    api_key: String,
    sender: String,
}

impl HttpNotificationSender {
    /// Build an adapter with an explicit request timeout.
    ///
    /// `sender` is the from-address greetings are sent as.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: String,
        sender: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            sender,
        })
    }
}

fn compose_greeting(member: &Member) -> (String, String) {
    let name = member.full_name.as_ref();
    let subject = format!("Happy birthday, {name}!");
    let text = format!(
        "Dear {name},\n\n\
         Wishing you a wonderful birthday from everyone in the alumni \
         association. The batch of {batch} is proud to celebrate with you.\n\n\
         Warm regards,\n\
         The Alumni Association",
        batch = member.batch_year.as_ref(),
    );
    (subject, text)
}

fn map_transport_error(error: reqwest::Error) -> NotificationSenderError {
    NotificationSenderError::connection(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> NotificationSenderError {
    NotificationSenderError::rejected(format!(
        "status {}: {}",
        status.as_u16(),
        body_preview(body)
    ))
}

#[async_trait]
impl NotificationSender for HttpNotificationSender {
    async fn send_birthday_greeting(
        &self,
        to: &str,
        member: &Member,
    ) -> Result<(), NotificationSenderError> {
        let (subject, text) = compose_greeting(member);
        let message = MailMessage {
            from: self.sender.as_str(),
            to,
            subject,
            text,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&message)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::{BatchYear, DateOfBirth, FullName, MemberId};
    use chrono::NaiveDate;

    fn member() -> Member {
        Member {
            id: MemberId::random(),
            full_name: FullName::new("Ada Lovelace").expect("valid name"),
            batch_year: BatchYear::new("2004").expect("valid batch"),
            location: None,
            occupation: None,
            avatar_url: None,
            bio: None,
            date_of_birth: DateOfBirth::from_stored(
                NaiveDate::from_ymd_opt(1995, 3, 14).expect("valid date"),
            ),
        }
    }

    #[test]
    fn greetings_are_personalised() {
        let (subject, text) = compose_greeting(&member());
        assert_eq!(subject, "Happy birthday, Ada Lovelace!");
        assert!(text.contains("Dear Ada Lovelace"));
        assert!(text.contains("batch of 2004"));
    }

    #[test]
    fn refused_messages_map_to_rejections() {
        let error = map_status_error(StatusCode::UNPROCESSABLE_ENTITY, b"bad address");
        assert!(matches!(error, NotificationSenderError::Rejected { .. }));
    }
}
