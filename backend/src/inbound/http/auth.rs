//! Authentication API handlers.
//!
//! ```text
//! POST /api/v1/auth/sign-up   {"email":"...","password":"...","fullName":"...",...}
//! POST /api/v1/auth/sign-in   {"email":"...","password":"..."}
//! POST /api/v1/auth/sign-out
//! GET  /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    AuthenticatedMember, BatchYear, DateOfBirth, Error, FullName, MemberDraft,
    MemberValidationError, SignUpRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration body for `POST /api/v1/auth/sign-up`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpBody {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub batch_year: String,
    #[schema(value_type = String, format = Date, example = "1995-03-14")]
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
}

/// Sign-in body for `POST /api/v1/auth/sign-in`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInBody {
    pub email: String,
    pub password: String,
}

fn field_for(error: &MemberValidationError) -> &'static str {
    match error {
        MemberValidationError::EmptyId | MemberValidationError::InvalidId => "id",
        MemberValidationError::EmptyFullName | MemberValidationError::FullNameTooLong { .. } => {
            "fullName"
        }
        MemberValidationError::EmptyBatchYear
        | MemberValidationError::BatchYearTooLong { .. } => "batchYear",
        MemberValidationError::ImplausibleDateOfBirth => "dateOfBirth",
    }
}

fn map_profile_validation_error(error: MemberValidationError) -> Error {
    Error::invalid_request(error.to_string())
        .with_details(json!({ "field": field_for(&error) }))
}

/// Register an account, create the profile row, and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-up",
    request_body = SignUpBody,
    responses(
        (status = 201, description = "Registered and signed in", body = AuthenticatedMember),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email or profile already exists", body = Error),
        (status = 503, description = "Identity provider unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signUp",
    security([])
)]
#[post("/auth/sign-up")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignUpBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let today = state.clock.utc().date_naive();
    let profile = MemberDraft {
        full_name: FullName::new(body.full_name).map_err(map_profile_validation_error)?,
        batch_year: BatchYear::new(body.batch_year).map_err(map_profile_validation_error)?,
        date_of_birth: DateOfBirth::new(body.date_of_birth, today)
            .map_err(map_profile_validation_error)?,
    };

    let signed_up = state
        .auth
        .sign_up(SignUpRequest {
            email: body.email,
            password: body.password,
            profile,
            location: body.location,
            occupation: body.occupation,
        })
        .await?;
    session.persist_member(&signed_up.member.id)?;
    Ok(HttpResponse::Created().json(signed_up))
}

/// Check credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in",
    request_body = SignInBody,
    responses(
        (status = 200, description = "Signed in", body = AuthenticatedMember,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Identity provider unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signIn",
    security([])
)]
#[post("/auth/sign-in")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignInBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let signed_in = state.auth.sign_in(&body.email, &body.password).await?;
    session.persist_member(&signed_in.member.id)?;
    Ok(HttpResponse::Ok().json(signed_in))
}

/// Drop the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-out",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "signOut",
    security([])
)]
#[post("/auth/sign-out")]
pub async fn sign_out(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Current session's profile and capability flags.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current member", body = AuthenticatedMember),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["auth"],
    operation_id = "me"
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AuthenticatedMember>> {
    let member_id = session.require_member_id()?;
    let current = state.auth.current(&member_id).await?;
    Ok(web::Json(current))
}
