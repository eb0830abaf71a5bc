//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O: every
//! service reaches its stores through `domain::ports` traits.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::{
    AuthService, DirectoryService, DonationService, EventService, PhotoService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthService,
    pub directory: DirectoryService,
    pub events: EventService,
    pub donations: DonationService,
    pub photos: PhotoService,
    /// Source of "now" for request handling (stats, registration age
    /// checks). Injected so handler tests can pin the date.
    pub clock: Arc<dyn Clock>,
}
