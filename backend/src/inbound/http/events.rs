//! Events and RSVP API handlers.
//!
//! ```text
//! GET  /api/v1/events
//! POST /api/v1/events
//! GET  /api/v1/events/rsvps
//! POST /api/v1/events/{id}/rsvp
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Event, EventDraft, EventId, Rsvp, RsvpOutcome};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Event creation body for `POST /api/v1/events`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventBody {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Toggle response for `POST /api/v1/events/{id}/rsvp`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RsvpToggleResponse {
    pub outcome: RsvpOutcome,
}

fn parse_event_id(raw: &str) -> Result<EventId, Error> {
    Uuid::parse_str(raw)
        .map(EventId)
        .map_err(|_| Error::invalid_request("event id must be a valid UUID"))
}

/// List all events, soonest first.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    responses((status = 200, description = "Events", body = [Event])),
    tags = ["events"],
    operation_id = "listEvents",
    security([])
)]
#[get("/events")]
pub async fn list_events(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Event>>> {
    let events = state.events.list_events().await?;
    Ok(web::Json(events))
}

/// Create an event. Admin role required.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = CreateEventBody,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateEventBody>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_member_id()?;
    let body = payload.into_inner();
    let event = state
        .events
        .create_event(
            &caller,
            EventDraft {
                title: body.title,
                starts_at: body.starts_at,
                location: body.location,
                description: body.description,
                image_url: body.image_url,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(event))
}

/// List the caller's RSVPs.
#[utoipa::path(
    get,
    path = "/api/v1/events/rsvps",
    responses(
        (status = 200, description = "Caller's RSVPs", body = [Rsvp]),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["events"],
    operation_id = "listMyRsvps"
)]
#[get("/events/rsvps")]
pub async fn list_my_rsvps(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Rsvp>>> {
    let caller = session.require_member_id()?;
    let rsvps = state.events.list_rsvps(&caller).await?;
    Ok(web::Json(rsvps))
}

/// Toggle the caller's attendance for an event.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/rsvp",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Toggle outcome", body = RsvpToggleResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["events"],
    operation_id = "toggleRsvp"
)]
#[post("/events/{id}/rsvp")]
pub async fn toggle_rsvp(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RsvpToggleResponse>> {
    let caller = session.require_member_id()?;
    let event_id = parse_event_id(&path.into_inner())?;
    let outcome = state.events.toggle_rsvp(&caller, event_id).await?;
    Ok(web::Json(RsvpToggleResponse { outcome }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MemberId;
    use crate::inbound::http::test_utils::{fixture_state, test_session_middleware};
    use actix_web::{App, http::StatusCode, test as actix_test};
    use rstest::rstest;

    fn test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(fixture_state()))
            .wrap(test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .route(
                        "/sign-in-test",
                        web::get().to(|session: SessionContext| async move {
                            session.persist_member(&MemberId::random())?;
                            Ok::<_, Error>(HttpResponse::Ok())
                        }),
                    )
                    .service(list_events)
                    .service(create_event)
                    .service(list_my_rsvps)
                    .service(toggle_rsvp),
            )
    }

    #[rstest]
    #[actix_web::test]
    async fn event_listing_is_public() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/events")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn rsvp_toggle_requires_a_session() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/events/{}/rsvp", Uuid::new_v4()))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn event_creation_without_the_admin_role_is_forbidden() {
        let app = actix_test::init_service(test_app()).await;
        let sign_in = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/sign-in-test")
                .to_request(),
        )
        .await;
        let cookie = sign_in
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned();

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/events")
                .cookie(cookie)
                .set_json(CreateEventBody {
                    title: "Reunion".to_owned(),
                    starts_at: Utc::now(),
                    location: None,
                    description: None,
                    image_url: None,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
