pub mod config;
pub mod counters;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod folders;
pub mod handlers;
pub mod models;
pub mod placement;
pub mod routes;
pub mod state;
pub mod upload;
pub mod utils;

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use axum::routing::get;
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fanview API",
        version = "1.0.0",
        description = "Creators, content uploads, likes, subscriptions and wallets"
    ),
    tags(
        (name = "Creators", description = "Creator profiles and profile images"),
        (name = "Content", description = "Content uploads, registration and likes"),
        (name = "Fans", description = "Fan accounts and wallets"),
        (name = "Subscriptions", description = "Fan-to-creator subscriptions"),
        (name = "Admin", description = "Provisioning helpers"),
        (name = "Diagnostics", description = "Service health"),
    ),
)]
struct ApiDoc;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes(&state.config))
        .split_for_parts();

    let uploads = format!(
        "{}/{{*path}}",
        state.config.storage.public_prefix.trim_end_matches('/')
    );

    router
        .route(&uploads, get(handlers::assets::serve_upload))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error::error_envelope,
        ))
        .layer(cors_layer(&state.config.server.cors))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}
