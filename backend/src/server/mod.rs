//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, BackendEndpoints, ServerConfig};
pub use state_builders::build_http_state;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http;
use crate::inbound::http::state::HttpState;

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    key: actix_web::cookie::Key,
    cookie_secure: bool,
    same_site: actix_web::cookie::SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(same_site)
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .configure(http::configure);

    #[allow(unused_mut)]
    let mut app = App::new().app_data(http_state).service(api);

    #[cfg(debug_assertions)]
    {
        app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    app
}

/// Build and bind the HTTP server from a complete configuration.
///
/// # Errors
///
/// Returns [`std::io::Error`] when state construction fails or the bind
/// address is unavailable.
pub fn build_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config)?);
    let deps = AppDependencies {
        http_state,
        key: config.key.clone(),
        cookie_secure: config.cookie_secure,
        same_site: config.same_site,
    };
    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(config.bind_addr)?
        .run();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::{Key, SameSite};
    use actix_web::{http::StatusCode, test as actix_test};
    use rstest::rstest;

    fn deps() -> AppDependencies {
        let config = ServerConfig::new(
            Key::generate(),
            false,
            SameSite::Lax,
            "127.0.0.1:0".parse().expect("literal addr"),
        );
        AppDependencies {
            http_state: web::Data::new(
                build_http_state(&config).expect("fixture state should build"),
            ),
            key: config.key,
            cookie_secure: config.cookie_secure,
            same_site: config.same_site,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn public_routes_are_reachable_through_the_built_app() {
        let app = actix_test::init_service(build_app(deps())).await;
        for uri in [
            "/api/v1/stats",
            "/api/v1/events",
            "/api/v1/photos",
            "/api/v1/donations/wall",
        ] {
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
    async fn protected_routes_reject_anonymous_callers() {
        let app = actix_test::init_service(build_app(deps())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/members")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
