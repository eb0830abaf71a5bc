//! Member directory API handlers.
//!
//! ```text
//! GET   /api/v1/members?batchYear=2008&search=pune
//! GET   /api/v1/members/{id}
//! PATCH /api/v1/members/{id}
//! ```

use actix_web::{get, patch, web};
use serde::{Deserialize, Serialize};

use crate::domain::{DirectoryFilter, Error, Member, MemberId, ProfileUpdate};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query parameters narrowing the directory listing.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryQuery {
    /// Exact batch year label to keep.
    pub batch_year: Option<String>,
    /// Case-insensitive term matched against name, location, occupation.
    pub search: Option<String>,
}

/// Owner-editable profile fields; omitted fields stay untouched.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateBody {
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

impl From<ProfileUpdateBody> for ProfileUpdate {
    fn from(value: ProfileUpdateBody) -> Self {
        Self {
            location: value.location,
            occupation: value.occupation,
            avatar_url: value.avatar_url,
            bio: value.bio,
        }
    }
}

fn parse_member_id(raw: &str) -> Result<MemberId, Error> {
    MemberId::new(raw).map_err(|error| Error::invalid_request(error.to_string()))
}

/// List the directory, ordered by batch year then name.
#[utoipa::path(
    get,
    path = "/api/v1/members",
    params(DirectoryQuery),
    responses(
        (status = 200, description = "Directory listing", body = [Member]),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["directory"],
    operation_id = "listMembers"
)]
#[get("/members")]
pub async fn list_members(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<DirectoryQuery>,
) -> ApiResult<web::Json<Vec<Member>>> {
    session.require_member_id()?;
    let query = query.into_inner();
    let filter = DirectoryFilter {
        batch_year: query.batch_year,
        search: query.search,
    };
    let members = state.directory.list(&filter).await?;
    Ok(web::Json(members))
}

/// Fetch one profile.
#[utoipa::path(
    get,
    path = "/api/v1/members/{id}",
    params(("id" = String, Path, description = "Member id")),
    responses(
        (status = 200, description = "Profile", body = Member),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Unknown member", body = Error)
    ),
    tags = ["directory"],
    operation_id = "getMember"
)]
#[get("/members/{id}")]
pub async fn get_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Member>> {
    session.require_member_id()?;
    let id = parse_member_id(&path.into_inner())?;
    let member = state.directory.get(&id).await?;
    Ok(web::Json(member))
}

/// Update the caller's own profile.
#[utoipa::path(
    patch,
    path = "/api/v1/members/{id}",
    params(("id" = String, Path, description = "Member id")),
    request_body = ProfileUpdateBody,
    responses(
        (status = 200, description = "Updated profile", body = Member),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the profile owner", body = Error),
        (status = 404, description = "Unknown member", body = Error)
    ),
    tags = ["directory"],
    operation_id = "updateProfile"
)]
#[patch("/members/{id}")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ProfileUpdateBody>,
) -> ApiResult<web::Json<Member>> {
    let caller = session.require_member_id()?;
    let target = parse_member_id(&path.into_inner())?;
    let updated = state
        .directory
        .update_profile(&caller, &target, payload.into_inner().into())
        .await?;
    Ok(web::Json(updated))
}
