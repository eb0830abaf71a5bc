//! Home page statistics handler.
//!
//! ```text
//! GET /api/v1/stats
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};

use crate::domain::Amount;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Aggregate figures for the landing page.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub member_count: u64,
    pub donation_total: Amount,
    pub upcoming_event_count: u64,
}

/// Landing page statistics. Public; totals are recomputed per request.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses((status = 200, description = "Aggregate statistics", body = StatsResponse)),
    tags = ["stats"],
    operation_id = "stats",
    security([])
)]
#[get("/stats")]
pub async fn stats(state: web::Data<HttpState>) -> ApiResult<web::Json<StatsResponse>> {
    let member_count = state.directory.member_count().await?;
    let donation_total = state.donations.public_total().await?;
    let now = state.clock.utc();
    let upcoming_event_count = state
        .events
        .list_events()
        .await?
        .iter()
        .filter(|event| !event.is_past(now))
        .count() as u64;

    Ok(web::Json(StatsResponse {
        member_count,
        donation_total,
        upcoming_event_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::fixture_state;
    use actix_web::{App, http::StatusCode, test as actix_test};
    use rstest::rstest;

    #[rstest]
    #[actix_web::test]
    async fn stats_are_public_and_zeroed_on_empty_stores() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(fixture_state()))
                .service(web::scope("/api/v1").service(stats)),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/stats")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: StatsResponse = actix_test::read_body_json(response).await;
        assert_eq!(body.member_count, 0);
        assert_eq!(body.donation_total.paise(), 0);
        assert_eq!(body.upcoming_event_count, 0);
    }
}
