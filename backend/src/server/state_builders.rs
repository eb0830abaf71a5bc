//! Builders wiring outbound adapters into the HTTP state.

use std::sync::Arc;

use mockable::DefaultClock;

use crate::domain::capabilities::CapabilityResolver;
use crate::domain::ports::{
    BlobStore, DonationRepository, EventRepository, FixtureBlobStore,
    FixtureDonationRepository, FixtureEventRepository, FixtureIdentityProvider,
    FixtureMemberRepository, FixturePhotoRepository, FixtureRoleRepository,
    FixtureRsvpRepository, IdentityProvider, MemberRepository, PhotoRepository,
    RoleRepository, RsvpRepository,
};
use crate::domain::{
    AuthService, DirectoryService, DonationService, EventService, PhotoService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::{
    RecordApi, RestBlobStore, RestDonationRepository, RestEventRepository,
    RestIdentityProvider, RestMemberRepository, RestPhotoRepository, RestRoleRepository,
    RestRsvpRepository,
};

use super::config::ServerConfig;

struct Ports {
    members: Arc<dyn MemberRepository>,
    roles: Arc<dyn RoleRepository>,
    events: Arc<dyn EventRepository>,
    rsvps: Arc<dyn RsvpRepository>,
    donations: Arc<dyn DonationRepository>,
    photos: Arc<dyn PhotoRepository>,
    blobs: Arc<dyn BlobStore>,
    identity: Arc<dyn IdentityProvider>,
}

fn hosted_ports(config: &ServerConfig) -> std::io::Result<Option<Ports>> {
    let Some(endpoints) = &config.endpoints else {
        return Ok(None);
    };
    let api = RecordApi::new(
        endpoints.service_url.clone(),
        endpoints.service_key.clone(),
        config.request_timeout,
    )
    .map_err(|error| std::io::Error::other(format!("record api client: {error}")))?;
    let blobs = RestBlobStore::new(
        endpoints.service_url.clone(),
        endpoints.service_key.clone(),
        config.request_timeout,
    )
    .map_err(|error| std::io::Error::other(format!("blob store client: {error}")))?;
    let identity = RestIdentityProvider::new(
        endpoints.service_url.clone(),
        endpoints.service_key.clone(),
        config.request_timeout,
    )
    .map_err(|error| std::io::Error::other(format!("identity client: {error}")))?;

    Ok(Some(Ports {
        members: Arc::new(RestMemberRepository::new(api.clone())),
        roles: Arc::new(RestRoleRepository::new(api.clone())),
        events: Arc::new(RestEventRepository::new(api.clone())),
        rsvps: Arc::new(RestRsvpRepository::new(api.clone())),
        donations: Arc::new(RestDonationRepository::new(api.clone())),
        photos: Arc::new(RestPhotoRepository::new(api)),
        blobs: Arc::new(blobs),
        identity: Arc::new(identity),
    }))
}

fn fixture_ports() -> Ports {
    Ports {
        members: Arc::new(FixtureMemberRepository),
        roles: Arc::new(FixtureRoleRepository),
        events: Arc::new(FixtureEventRepository),
        rsvps: Arc::new(FixtureRsvpRepository),
        donations: Arc::new(FixtureDonationRepository),
        photos: Arc::new(FixturePhotoRepository),
        blobs: Arc::new(FixtureBlobStore),
        identity: Arc::new(FixtureIdentityProvider),
    }
}

/// Build the HTTP state from the server configuration.
///
/// Uses the hosted service adapters when endpoints are configured and
/// falls back to fixture ports otherwise, which keeps local development
/// possible without any external services.
///
/// # Errors
///
/// Returns [`std::io::Error`] when an outbound HTTP client cannot be
/// constructed.
pub fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let ports = match hosted_ports(config)? {
        Some(ports) => ports,
        None => {
            tracing::warn!("no hosted service endpoints configured; using fixture ports");
            fixture_ports()
        }
    };

    let capabilities = CapabilityResolver::new(ports.roles.clone());
    let clock = Arc::new(DefaultClock);

    Ok(HttpState {
        auth: AuthService::new(
            ports.identity,
            ports.members.clone(),
            ports.roles,
            capabilities.clone(),
        ),
        directory: DirectoryService::new(ports.members.clone()),
        events: EventService::new(ports.events, ports.rsvps, capabilities.clone()),
        donations: DonationService::new(
            ports.donations,
            ports.members,
            ports.blobs.clone(),
            capabilities,
            clock.clone(),
        ),
        photos: PhotoService::new(ports.photos, ports.blobs, clock.clone()),
        clock,
    })
}
