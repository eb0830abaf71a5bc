//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal
//! with domain-friendly operations such as persisting or retrieving the
//! signed-in member id.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, MemberId};

pub(crate) const MEMBER_ID_KEY: &str = "member_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the signed-in member's id in the session cookie.
    pub fn persist_member(&self, member_id: &MemberId) -> Result<(), Error> {
        self.0
            .insert(MEMBER_ID_KEY, member_id.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current member id from the session, if present.
    pub fn member_id(&self) -> Result<Option<MemberId>, Error> {
        let id = self
            .0
            .get::<String>(MEMBER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match MemberId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid member id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require a signed-in member id or return `401 Unauthorized`.
    pub fn require_member_id(&self) -> Result<MemberId, Error> {
        self.member_id()?
            .ok_or_else(|| Error::unauthorized("sign-in required"))
    }

    /// Drop the session entirely (sign-out).
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
