//! Alumni association portal backend.
//!
//! The crate is organised hexagonally: `domain` holds the services and the
//! ports they depend on, `inbound` exposes them over HTTP, and `outbound`
//! implements the ports against the hosted record, storage, auth, and mail
//! services.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
