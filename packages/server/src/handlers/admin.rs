use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::AssetKind;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use tracing::instrument;
use uuid::Uuid;

use crate::entity::creator;
use crate::error::{AppError, ErrorBody};
use crate::handlers::creator::{DUPLICATE_CREATOR, find_creator, require_image, set_profile_url};
use crate::models::creator::{CreateCreatorRequest, CreatorResponse, validate_create_creator};
use crate::models::shared::ApiResponse;
use crate::state::AppState;
use crate::upload::{FileLimit, StagedForm, stage_form};

#[utoipa::path(
    post,
    path = "/creators/provision-test",
    tag = "Admin",
    operation_id = "provisionTestCreator",
    summary = "Provision a creator with profile images",
    description = "Creates a creator from form fields (`display_name`, `username`, `email`, \
        optional `bio`) and places the `avatar` and optional `banner` files in its folder. \
        If placing either image fails the creator is removed again.",
    request_body(content_type = "multipart/form-data", description = "Creator fields and images"),
    responses(
        (status = 201, description = "Creator provisioned", body = ApiResponse<CreatorResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Username or email taken (CONFLICT)", body = ErrorBody),
        (status = 500, description = "Storage failure (IO_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn provision_test_creator(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let max = state.config.storage.max_image_size;
    let form = stage_form(
        &mut multipart,
        state.assets.as_ref(),
        &[FileLimit::new("avatar", max), FileLimit::new("banner", max)],
    )
    .await?;

    let result = provision(&state, &form).await;
    form.cleanup(state.assets.as_ref()).await;

    let model = result?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Creator provisioned",
            CreatorResponse::from(model),
        )),
    ))
}

async fn provision(state: &AppState, form: &StagedForm) -> Result<creator::Model, AppError> {
    let request = CreateCreatorRequest {
        display_name: form.text("display_name").unwrap_or_default().to_string(),
        username: form.text("username").unwrap_or_default().to_string(),
        email: form.text("email").unwrap_or_default().to_string(),
        bio: form.text("bio").map(str::to_string),
        subscription_price: None,
        user_id: None,
    };
    validate_create_creator(&request)?;

    let avatar = form
        .file("avatar")
        .ok_or_else(|| AppError::Validation("Missing 'avatar' field".into()))?;
    require_image(avatar, "avatar")?;
    let banner = form.file("banner");
    if let Some(banner) = banner {
        require_image(banner, "banner")?;
    }

    let model = creator::ActiveModel {
        id: Set(Uuid::now_v7()),
        username: Set(request.username),
        email: Set(request.email.to_ascii_lowercase()),
        display_name: Set(request.display_name),
        bio: Set(request.bio),
        subscription_price: Set(0),
        media_count: Set(0),
        subscriber_count: Set(0),
        created_at: Set(state.clock.now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| AppError::from_write(e, DUPLICATE_CREATOR))?;

    let placement = state.placement();
    let mut placed_files = Vec::new();
    let images = [(AssetKind::Avatar, Some(avatar)), (AssetKind::Banner, banner)];
    for (kind, file) in images {
        let Some(file) = file else { continue };
        let result = match placement.place_upload(file, model.id, kind).await {
            Ok(placed) => {
                let stored = set_profile_url(&state.db, model.id, kind, &placed.url).await;
                placed_files.push(placed);
                stored
            }
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            for placed in &placed_files {
                placement.discard_placed(placed).await;
            }
            discard_creator(state, model.id).await;
            return Err(e);
        }
    }

    tracing::info!(creator_id = %model.id, "Provisioned creator");
    find_creator(&state.db, model.id).await
}

/// Remove the row of a half-provisioned creator.
async fn discard_creator(state: &AppState, id: Uuid) {
    if let Err(e) = creator::Entity::delete_by_id(id).exec(&state.db).await {
        tracing::warn!(creator_id = %id, "Failed to remove half-provisioned creator: {e}");
    }
}
