use axum::extract::DefaultBodyLimit;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::{AppConfig, StorageConfig};
use crate::handlers;
use crate::state::AppState;

/// Room for multipart framing and text fields on top of the file limits.
const FORM_OVERHEAD: u64 = 1024 * 1024;

fn body_limit(bytes: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max(usize::try_from(bytes).unwrap_or(usize::MAX))
}

pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/creators", creator_routes(&config.storage))
        .nest("/content", content_routes(&config.storage))
        .nest("/fans", fan_routes())
        .nest("/subscriptions", subscription_routes())
        .nest("/admin", admin_routes(&config.storage))
        .routes(routes!(handlers::health::health))
}

fn creator_routes(storage: &StorageConfig) -> OpenApiRouter<AppState> {
    let crud = OpenApiRouter::new()
        .routes(routes!(
            handlers::creator::create_creator,
            handlers::creator::list_creators
        ))
        .routes(routes!(
            handlers::creator::get_creator,
            handlers::creator::update_creator
        ))
        .routes(routes!(handlers::creator::list_creator_content));

    let images = OpenApiRouter::new()
        .routes(routes!(handlers::creator::upload_avatar))
        .routes(routes!(handlers::creator::upload_banner))
        .layer(body_limit(storage.max_image_size + FORM_OVERHEAD));

    crud.merge(images)
}

fn content_routes(storage: &StorageConfig) -> OpenApiRouter<AppState> {
    let crud = OpenApiRouter::new()
        .routes(routes!(handlers::content::register_content))
        .routes(routes!(handlers::content::get_content))
        .routes(routes!(
            handlers::content::like_content,
            handlers::content::unlike_content
        ));

    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::content::upload_content))
        .layer(body_limit(storage.max_upload_size + FORM_OVERHEAD));

    crud.merge(upload)
}

fn fan_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::fan::create_fan))
        .routes(routes!(handlers::fan::get_fan))
        .routes(routes!(handlers::fan::top_up_wallet))
        .routes(routes!(handlers::fan::list_fan_subscriptions))
}

fn subscription_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::fan::subscribe,
        handlers::fan::unsubscribe
    ))
}

fn admin_routes(storage: &StorageConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::admin::provision_test_creator))
        .layer(body_limit(2 * storage.max_image_size + FORM_OVERHEAD))
}
