//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use mockable::DefaultClock;

use crate::domain::capabilities::CapabilityResolver;
use crate::domain::ports::{
    FixtureBlobStore, FixtureDonationRepository, FixtureEventRepository,
    FixtureIdentityProvider, FixtureMemberRepository, FixturePhotoRepository,
    FixtureRoleRepository, FixtureRsvpRepository,
};
use crate::domain::{
    AuthService, DirectoryService, DonationService, EventService, PhotoService,
};
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Build an [`HttpState`] backed entirely by fixture ports.
///
/// Handlers wired with this state accept every session but hold no data,
/// so use it where the handler's own plumbing is under test.
pub fn fixture_state() -> HttpState {
    let members = Arc::new(FixtureMemberRepository);
    let roles = Arc::new(FixtureRoleRepository);
    let capabilities = CapabilityResolver::new(roles.clone());
    let clock = Arc::new(DefaultClock);

    HttpState {
        auth: AuthService::new(
            Arc::new(FixtureIdentityProvider),
            members.clone(),
            roles,
            capabilities.clone(),
        ),
        directory: DirectoryService::new(members.clone()),
        events: EventService::new(
            Arc::new(FixtureEventRepository),
            Arc::new(FixtureRsvpRepository),
            capabilities.clone(),
        ),
        donations: DonationService::new(
            Arc::new(FixtureDonationRepository),
            members,
            Arc::new(FixtureBlobStore),
            capabilities,
            clock.clone(),
        ),
        photos: PhotoService::new(
            Arc::new(FixturePhotoRepository),
            Arc::new(FixtureBlobStore),
            clock.clone(),
        ),
        clock,
    }
}
