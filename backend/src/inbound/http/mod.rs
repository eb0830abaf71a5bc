//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod auth;
pub mod directory;
pub mod donations;
pub mod error;
pub mod events;
pub mod photos;
pub mod session;
pub mod state;
pub mod stats;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

use actix_web::web;

pub use error::ApiResult;

/// Register every API handler on a service config.
///
/// Callers mount this under their `/api/v1` scope together with the
/// session middleware and an `HttpState` app-data entry.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::sign_up)
        .service(auth::sign_in)
        .service(auth::sign_out)
        .service(auth::me)
        .service(directory::list_members)
        .service(directory::get_member)
        .service(directory::update_profile)
        .service(events::list_events)
        .service(events::create_event)
        .service(events::list_my_rsvps)
        .service(events::toggle_rsvp)
        .service(donations::submit_donation)
        .service(donations::donor_wall)
        .service(donations::donation_total)
        .service(photos::list_photos)
        .service(photos::upload_photo)
        .service(photos::delete_photo)
        .service(admin::list_pending_donations)
        .service(admin::verify_donation)
        .service(admin::reject_donation)
        .service(stats::stats);
}
