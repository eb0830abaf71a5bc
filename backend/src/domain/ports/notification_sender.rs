//! Port for outbound member notifications.

use async_trait::async_trait;

use crate::domain::member::Member;

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification adapters.
    pub enum NotificationSenderError {
        /// Mail service could not be reached.
        Connection { message: String } =>
            "notification service connection failed: {message}",
        /// The mail service refused the message.
        Rejected { message: String } =>
            "notification rejected: {message}",
    }
}

/// Port for sending greetings to members.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Send a birthday greeting to `to`, personalised for the member.
    async fn send_birthday_greeting(
        &self,
        to: &str,
        member: &Member,
    ) -> Result<(), NotificationSenderError>;
}

/// Fixture implementation that swallows every greeting.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationSender;

#[async_trait]
impl NotificationSender for FixtureNotificationSender {
    async fn send_birthday_greeting(
        &self,
        _to: &str,
        _member: &Member,
    ) -> Result<(), NotificationSenderError> {
        Ok(())
    }
}
