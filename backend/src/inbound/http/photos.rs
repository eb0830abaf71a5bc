//! Gallery API handlers.
//!
//! ```text
//! GET    /api/v1/photos
//! POST   /api/v1/photos
//! DELETE /api/v1/photos/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Photo, PhotoId, PhotoUpload};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Upload body for `POST /api/v1/photos`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadPhotoBody {
    #[schema(example = "image/jpeg")]
    pub content_type: String,
    /// Standard base64 (RFC 4648) image bytes.
    pub data: String,
    #[serde(default)]
    pub caption: Option<String>,
}

fn parse_photo_id(raw: &str) -> Result<PhotoId, Error> {
    Uuid::parse_str(raw)
        .map(PhotoId)
        .map_err(|_| Error::invalid_request("photo id must be a valid UUID"))
}

/// The gallery, newest upload first.
#[utoipa::path(
    get,
    path = "/api/v1/photos",
    responses((status = 200, description = "Gallery photos", body = [Photo])),
    tags = ["photos"],
    operation_id = "listPhotos",
    security([])
)]
#[get("/photos")]
pub async fn list_photos(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Photo>>> {
    let photos = state.photos.list_gallery().await?;
    Ok(web::Json(photos))
}

/// Upload a photo to the gallery.
#[utoipa::path(
    post,
    path = "/api/v1/photos",
    request_body = UploadPhotoBody,
    responses(
        (status = 201, description = "Photo stored", body = Photo),
        (status = 400, description = "Quota reached or invalid payload", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 503, description = "Blob or record store unavailable", body = Error)
    ),
    tags = ["photos"],
    operation_id = "uploadPhoto"
)]
#[post("/photos")]
pub async fn upload_photo(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UploadPhotoBody>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_member_id()?;
    let body = payload.into_inner();
    let bytes = BASE64
        .decode(body.data.as_bytes())
        .map_err(|_| Error::invalid_request("photo data must be valid base64"))?;

    let photo = state
        .photos
        .upload(
            &caller,
            PhotoUpload {
                content_type: body.content_type,
                bytes,
                caption: body.caption,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(photo))
}

/// Delete one of the caller's photos.
#[utoipa::path(
    delete,
    path = "/api/v1/photos/{id}",
    params(("id" = String, Path, description = "Photo id")),
    responses(
        (status = 204, description = "Photo removed"),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the photo owner", body = Error),
        (status = 404, description = "Unknown photo", body = Error)
    ),
    tags = ["photos"],
    operation_id = "deletePhoto"
)]
#[delete("/photos/{id}")]
pub async fn delete_photo(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_member_id()?;
    let id = parse_photo_id(&path.into_inner())?;
    state.photos.delete(&caller, id).await?;
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
                    .service(list_photos)
                    .service(upload_photo)
                    .service(delete_photo),
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
    async fn gallery_listing_is_public() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/photos")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn uploads_require_a_session() {
        let app = actix_test::init_service(test_app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/photos")
                .set_json(UploadPhotoBody {
                    content_type: "image/png".to_owned(),
                    data: BASE64.encode([0_u8; 4]),
                    caption: None,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn signed_in_upload_is_created() {
        let app = actix_test::init_service(test_app()).await;
        let cookie = signed_in_cookie(&app).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/photos")
                .cookie(cookie)
                .set_json(UploadPhotoBody {
                    content_type: "image/png".to_owned(),
                    data: BASE64.encode([0_u8; 4]),
                    caption: Some("Reunion".to_owned()),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let photo: Photo = actix_test::read_body_json(response).await;
        assert!(photo.url.contains("gallery"));
    }

    #[rstest]
    #[actix_web::test]
    async fn non_image_uploads_are_bad_requests() {
        let app = actix_test::init_service(test_app()).await;
        let cookie = signed_in_cookie(&app).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/photos")
                .cookie(cookie)
                .set_json(UploadPhotoBody {
                    content_type: "text/plain".to_owned(),
                    data: BASE64.encode([0_u8; 4]),
                    caption: None,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
