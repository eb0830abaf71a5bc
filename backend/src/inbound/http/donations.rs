//! Donation API handlers.
//!
//! ```text
//! POST /api/v1/donations
//! GET  /api/v1/donations/wall
//! GET  /api/v1/donations/total
//! ```

use actix_web::{HttpResponse, get, post, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Amount, Donation, DonationDraft, DonorWallEntry, Error, ProofImage,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Base64-encoded proof image attached to a submission.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProofBody {
    #[schema(example = "image/png")]
    pub content_type: String,
    /// Standard base64 (RFC 4648) image bytes.
    pub data: String,
}

/// Submission body for `POST /api/v1/donations`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDonationBody {
    /// Donated amount in paise.
    pub amount_paise: i64,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub transaction_reference: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub proof: Option<ProofBody>,
}

/// Recomputed public donation total.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationTotalResponse {
    pub total: Amount,
}

fn decode_proof(proof: ProofBody) -> Result<ProofImage, Error> {
    let bytes = BASE64
        .decode(proof.data.as_bytes())
        .map_err(|_| Error::invalid_request("proof data must be valid base64"))?;
    Ok(ProofImage {
        content_type: proof.content_type,
        bytes,
    })
}

/// Submit a donation for admin review.
#[utoipa::path(
    post,
    path = "/api/v1/donations",
    request_body = SubmitDonationBody,
    responses(
        (status = 201, description = "Donation recorded, awaiting review", body = Donation),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 503, description = "Blob or record store unavailable", body = Error)
    ),
    tags = ["donations"],
    operation_id = "submitDonation"
)]
#[post("/donations")]
pub async fn submit_donation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SubmitDonationBody>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_member_id()?;
    let body = payload.into_inner();
    let amount = Amount::from_paise(body.amount_paise)
        .map_err(|error| Error::invalid_request(error.to_string()))?;
    let proof = body.proof.map(decode_proof).transpose()?;

    let donation = state
        .donations
        .submit(
            &caller,
            DonationDraft {
                amount,
                anonymous: body.anonymous,
                message: body.message,
                transaction_reference: body.transaction_reference,
                payment_method: body.payment_method,
                proof,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(donation))
}

/// The public donor wall.
#[utoipa::path(
    get,
    path = "/api/v1/donations/wall",
    responses((status = 200, description = "Verified donations, newest first", body = [DonorWallEntry])),
    tags = ["donations"],
    operation_id = "donorWall",
    security([])
)]
#[get("/donations/wall")]
pub async fn donor_wall(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<DonorWallEntry>>> {
    let wall = state.donations.donor_wall().await?;
    Ok(web::Json(wall))
}

/// The recomputed public donation total.
#[utoipa::path(
    get,
    path = "/api/v1/donations/total",
    responses((status = 200, description = "Verified donation total", body = DonationTotalResponse)),
    tags = ["donations"],
    operation_id = "donationTotal",
    security([])
)]
#[get("/donations/total")]
pub async fn donation_total(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<DonationTotalResponse>> {
    let total = state.donations.public_total().await?;
    Ok(web::Json(DonationTotalResponse { total }))
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
                    .service(submit_donation)
                    .service(donor_wall)
                    .service(donation_total),
            )
    }

    async fn signed_in_cookie(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    ) -> actix_web::cookie::Cookie<'static> {
        let response = actix_test::call_service(
            app,
            actix_test::TestRequest::get()
                .uri("/api/v1/sign-in-test")
                .to_request(),
        )
        .await;
        response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[rstest]
    #[actix_web::test]
    async fn wall_and_total_are_public() {
        let app = actix_test::init_service(test_app()).await;
        for uri in ["/api/v1/donations/wall", "/api/v1/donations/total"] {
            let response = actix_test::call_service(
                &app,
                actix_test::TestRequest::get().uri(uri).to_request(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn submission_requires_a_session() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/donations")
                .set_json(SubmitDonationBody {
                    amount_paise: 100_000,
                    anonymous: false,
                    message: None,
                    transaction_reference: None,
                    payment_method: None,
                    proof: None,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn negative_amounts_are_rejected() {
        let app = actix_test::init_service(test_app()).await;
        let cookie = signed_in_cookie(&app).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/donations")
                .cookie(cookie)
                .set_json(SubmitDonationBody {
                    amount_paise: -5,
                    anonymous: false,
                    message: None,
                    transaction_reference: None,
                    payment_method: None,
                    proof: None,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_base64_proof_is_rejected() {
        let app = actix_test::init_service(test_app()).await;
        let cookie = signed_in_cookie(&app).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/donations")
                .cookie(cookie)
                .set_json(SubmitDonationBody {
                    amount_paise: 100_000,
                    anonymous: false,
                    message: None,
                    transaction_reference: None,
                    payment_method: None,
                    proof: Some(ProofBody {
                        content_type: "image/png".to_owned(),
                        data: "%%not-base64%%".to_owned(),
                    }),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
