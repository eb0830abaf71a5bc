//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the specification for the REST API: every endpoint
//! from the inbound layer, the domain schemas they reference, and the
//! session cookie security scheme. Swagger UI serves the document in debug
//! builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Amount, AuthenticatedMember, Donation, DonorWallEntry, Error, ErrorCode, Event, Member,
    Photo, Rsvp, RsvpOutcome,
};
use crate::inbound::http::auth::{SignInBody, SignUpBody};
use crate::inbound::http::directory::ProfileUpdateBody;
use crate::inbound::http::donations::{DonationTotalResponse, ProofBody, SubmitDonationBody};
use crate::inbound::http::events::{CreateEventBody, RsvpToggleResponse};
use crate::inbound::http::photos::UploadPhotoBody;
use crate::inbound::http::stats::StatsResponse;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/sign-in.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Alumni portal backend API",
        description = "HTTP interface for the alumni directory, events, \
                       donations, gallery, and admin panel."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::sign_up,
        crate::inbound::http::auth::sign_in,
        crate::inbound::http::auth::sign_out,
        crate::inbound::http::auth::me,
        crate::inbound::http::directory::list_members,
        crate::inbound::http::directory::get_member,
        crate::inbound::http::directory::update_profile,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::list_my_rsvps,
        crate::inbound::http::events::toggle_rsvp,
        crate::inbound::http::donations::submit_donation,
        crate::inbound::http::donations::donor_wall,
        crate::inbound::http::donations::donation_total,
        crate::inbound::http::photos::list_photos,
        crate::inbound::http::photos::upload_photo,
        crate::inbound::http::photos::delete_photo,
        crate::inbound::http::admin::list_pending_donations,
        crate::inbound::http::admin::verify_donation,
        crate::inbound::http::admin::reject_donation,
        crate::inbound::http::stats::stats,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Member,
        Event,
        Rsvp,
        RsvpOutcome,
        Donation,
        DonorWallEntry,
        Amount,
        Photo,
        AuthenticatedMember,
        SignUpBody,
        SignInBody,
        ProfileUpdateBody,
        CreateEventBody,
        RsvpToggleResponse,
        SubmitDonationBody,
        ProofBody,
        DonationTotalResponse,
        UploadPhotoBody,
        StatsResponse,
    )),
    tags(
        (name = "auth", description = "Registration, sign-in, and session state"),
        (name = "directory", description = "The member directory and profiles"),
        (name = "events", description = "Events and RSVPs"),
        (name = "donations", description = "Donation submission and the donor wall"),
        (name = "photos", description = "The shared photo gallery"),
        (name = "admin", description = "Donation review for administrators"),
        (name = "stats", description = "Aggregate figures for the landing page")
    )
)]
pub struct ApiDoc;
