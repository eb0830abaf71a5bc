//! Admin panel API handlers.
//!
//! All routes re-resolve the caller's role from the role table inside the
//! domain service; a stale admin flag in the session never grants access.
//!
//! ```text
//! GET  /api/v1/admin/donations/pending
//! POST /api/v1/admin/donations/{id}/verify
//! POST /api/v1/admin/donations/{id}/reject
//! ```

use actix_web::{HttpResponse, get, post, web};
use uuid::Uuid;

use crate::domain::{Donation, DonationId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn parse_donation_id(raw: &str) -> Result<DonationId, Error> {
    Uuid::parse_str(raw)
        .map(DonationId)
        .map_err(|_| Error::invalid_request("donation id must be a valid UUID"))
}

/// Donations awaiting review, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/donations/pending",
    responses(
        (status = 200, description = "Unverified donations", body = [Donation]),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listPendingDonations"
)]
#[get("/admin/donations/pending")]
pub async fn list_pending_donations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Donation>>> {
    let caller = session.require_member_id()?;
    let pending = state.donations.list_pending(&caller).await?;
    Ok(web::Json(pending))
}

/// Mark a donation verified.
#[utoipa::path(
    post,
    path = "/api/v1/admin/donations/{id}/verify",
    params(("id" = String, Path, description = "Donation id")),
    responses(
        (status = 204, description = "Donation verified"),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Unknown donation", body = Error)
    ),
    tags = ["admin"],
    operation_id = "verifyDonation"
)]
#[post("/admin/donations/{id}/verify")]
pub async fn verify_donation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_member_id()?;
    let id = parse_donation_id(&path.into_inner())?;
    state.donations.verify(&caller, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Reject a donation, removing it from review.
#[utoipa::path(
    post,
    path = "/api/v1/admin/donations/{id}/reject",
    params(("id" = String, Path, description = "Donation id")),
    responses(
        (status = 204, description = "Donation rejected"),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Unknown donation", body = Error)
    ),
    tags = ["admin"],
    operation_id = "rejectDonation"
)]
#[post("/admin/donations/{id}/reject")]
pub async fn reject_donation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_member_id()?;
    let id = parse_donation_id(&path.into_inner())?;
    state.donations.reject(&caller, id).await?;
    Ok(HttpResponse::NoContent().finish())
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
                    .service(list_pending_donations)
                    .service(verify_donation)
                    .service(reject_donation),
            )
    }

    #[rstest]
    #[actix_web::test]
    async fn admin_routes_require_a_session() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/donations/pending")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn plain_members_are_forbidden() {
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
                .uri(&format!(
                    "/api/v1/admin/donations/{}/verify",
                    Uuid::new_v4()
                ))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
