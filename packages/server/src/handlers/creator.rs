use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::AssetKind;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{content, creator};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::content::ContentResponse;
use crate::models::creator::*;
use crate::models::shared::{ApiResponse, Page, PageParams, Pagination};
use crate::placement::{MediaClass, classify};
use crate::state::AppState;
use crate::upload::{FileLimit, StagedFile, StagedForm, stage_form};

pub(crate) async fn find_creator<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<creator::Model, AppError> {
    creator::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Creator not found".into()))
}

/// Avatars and banners must be images.
pub(crate) fn require_image(file: &StagedFile, field: &str) -> Result<(), AppError> {
    match classify(file.content_type.as_deref(), file.file_name.as_deref()) {
        Some(MediaClass::Image) => Ok(()),
        _ => Err(AppError::Validation(format!("'{field}' must be an image"))),
    }
}

pub(crate) const DUPLICATE_CREATOR: &str = "Username, email or user id is already registered";

#[utoipa::path(
    post,
    path = "/",
    tag = "Creators",
    operation_id = "createCreator",
    summary = "Create a creator",
    description = "Creates a creator record and assigns its storage folder.",
    request_body = CreateCreatorRequest,
    responses(
        (status = 201, description = "Creator created", body = ApiResponse<CreatorResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Username, email or user id taken (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn create_creator(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCreatorRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_creator(&payload)?;

    let new_creator = creator::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(payload.user_id),
        username: Set(payload.username.trim().to_string()),
        email: Set(payload.email.trim().to_ascii_lowercase()),
        display_name: Set(payload.display_name.trim().to_string()),
        bio: Set(payload.bio),
        subscription_price: Set(payload.subscription_price.unwrap_or(0)),
        media_count: Set(0),
        subscriber_count: Set(0),
        created_at: Set(state.clock.now()),
        ..Default::default()
    };
    let model = new_creator
        .insert(&state.db)
        .await
        .map_err(|e| AppError::from_write(e, DUPLICATE_CREATOR))?;

    // The folder is also assigned lazily on first upload, so a failure here
    // does not fail creation.
    if let Err(e) = state.placement().ensure_creator_folder(model.id).await {
        tracing::warn!(creator_id = %model.id, "Could not prepare creator folder: {e}");
    }
    let model = find_creator(&state.db, model.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Creator created", CreatorResponse::from(model))),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Creators",
    operation_id = "listCreators",
    summary = "List creators",
    description = "Returns creators, newest first.",
    params(PageParams),
    responses(
        (status = 200, description = "Creators", body = ApiResponse<Page<CreatorResponse>>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_creators(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<ApiResponse<Page<CreatorResponse>>>, AppError> {
    let (page, per_page) = params.resolve();

    let paginator = creator::Entity::find()
        .order_by_desc(creator::Column::CreatedAt)
        .order_by_desc(creator::Column::Id)
        .paginate(&state.db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;

    Ok(Json(ApiResponse::ok(
        "Creators retrieved",
        Page {
            items: items.into_iter().map(Into::into).collect(),
            pagination: Pagination {
                page,
                per_page,
                total,
                total_pages: total.div_ceil(per_page),
            },
        },
    )))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Creators",
    operation_id = "getCreator",
    summary = "Get a creator",
    params(("id" = Uuid, Path, description = "Creator ID")),
    responses(
        (status = 200, description = "Creator", body = ApiResponse<CreatorResponse>),
        (status = 404, description = "Creator not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_creator(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CreatorResponse>>, AppError> {
    let model = find_creator(&state.db, id).await?;
    Ok(Json(ApiResponse::ok("Creator retrieved", model.into())))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Creators",
    operation_id = "updateCreator",
    summary = "Update a creator profile",
    description = "Updates display name, bio or subscription price. The storage folder \
        keeps the name it was first assigned.",
    params(("id" = Uuid, Path, description = "Creator ID")),
    request_body = UpdateCreatorRequest,
    responses(
        (status = 200, description = "Creator updated", body = ApiResponse<CreatorResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Creator not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_creator(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateCreatorRequest>,
) -> Result<Json<ApiResponse<CreatorResponse>>, AppError> {
    validate_update_creator(&payload)?;

    let existing = find_creator(&state.db, id).await?;
    let mut active: creator::ActiveModel = existing.into();

    if let Some(ref display_name) = payload.display_name {
        active.display_name = Set(display_name.trim().to_string());
    }
    if let Some(bio) = payload.bio {
        active.bio = Set(bio);
    }
    if let Some(price) = payload.subscription_price {
        active.subscription_price = Set(price);
    }

    let model = active.update(&state.db).await?;
    Ok(Json(ApiResponse::ok("Creator updated", model.into())))
}

#[utoipa::path(
    post,
    path = "/{id}/avatar",
    tag = "Creators",
    operation_id = "uploadAvatar",
    summary = "Upload a creator avatar",
    description = "Stores the `avatar` multipart field as the creator's avatar, replacing any \
        previous one. The returned URL does not change between uploads.",
    params(("id" = Uuid, Path, description = "Creator ID")),
    request_body(content_type = "multipart/form-data", description = "Image in the `avatar` field"),
    responses(
        (status = 200, description = "Avatar stored", body = ApiResponse<ProfileImageResponse>),
        (status = 400, description = "Missing, oversized or non-image file (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Creator not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage failure (IO_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ProfileImageResponse>>, AppError> {
    upload_profile_image(&state, id, AssetKind::Avatar, multipart).await
}

#[utoipa::path(
    post,
    path = "/{id}/banner",
    tag = "Creators",
    operation_id = "uploadBanner",
    summary = "Upload a creator banner",
    description = "Stores the `banner` multipart field as the creator's banner, replacing any \
        previous one.",
    params(("id" = Uuid, Path, description = "Creator ID")),
    request_body(content_type = "multipart/form-data", description = "Image in the `banner` field"),
    responses(
        (status = 200, description = "Banner stored", body = ApiResponse<ProfileImageResponse>),
        (status = 400, description = "Missing, oversized or non-image file (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Creator not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage failure (IO_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ProfileImageResponse>>, AppError> {
    upload_profile_image(&state, id, AssetKind::Banner, multipart).await
}

async fn upload_profile_image(
    state: &AppState,
    creator_id: Uuid,
    kind: AssetKind,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ProfileImageResponse>>, AppError> {
    let field = kind.as_str();
    let form = stage_form(
        &mut multipart,
        state.assets.as_ref(),
        &[FileLimit::new(field, state.config.storage.max_image_size)],
    )
    .await?;

    let result = save_profile_image(state, creator_id, kind, &form).await;
    form.cleanup(state.assets.as_ref()).await;

    let (url, folder_name, model) = result?;
    let message = match kind {
        AssetKind::Banner => "Banner uploaded",
        _ => "Avatar uploaded",
    };
    Ok(Json(ApiResponse::ok(
        message,
        ProfileImageResponse {
            url,
            folder_name,
            creator: model.into(),
        },
    )))
}

async fn save_profile_image(
    state: &AppState,
    creator_id: Uuid,
    kind: AssetKind,
    form: &StagedForm,
) -> Result<(String, String, creator::Model), AppError> {
    let field = kind.as_str();
    let file = form
        .file(field)
        .ok_or_else(|| AppError::Validation(format!("Missing '{field}' field")))?;
    require_image(file, field)?;

    // The file on disk and the stored URL must name the same upload.
    let _guard = state
        .profile_locks
        .lock(&format!("{creator_id}/{}", kind.as_str()))
        .await;
    let placed = state.placement().place_upload(file, creator_id, kind).await?;
    set_profile_url(&state.db, creator_id, kind, &placed.url).await?;

    let model = find_creator(&state.db, creator_id).await?;
    Ok((placed.url, placed.folder_name, model))
}

pub(crate) async fn set_profile_url<C: ConnectionTrait>(
    db: &C,
    creator_id: Uuid,
    kind: AssetKind,
    url: &str,
) -> Result<(), AppError> {
    let column = match kind {
        AssetKind::Avatar => creator::Column::AvatarUrl,
        AssetKind::Banner => creator::Column::BannerUrl,
        AssetKind::Content => {
            return Err(AppError::Internal("Content is not a profile image".into()));
        }
    };
    creator::Entity::update_many()
        .col_expr(column, Expr::value(url))
        .filter(creator::Column::Id.eq(creator_id))
        .exec(db)
        .await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/{id}/content",
    tag = "Creators",
    operation_id = "listCreatorContent",
    summary = "List a creator's content",
    description = "Returns the creator's content items, newest first.",
    params(("id" = Uuid, Path, description = "Creator ID"), PageParams),
    responses(
        (status = 200, description = "Content items", body = ApiResponse<Page<ContentResponse>>),
        (status = 404, description = "Creator not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_creator_content(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<ApiResponse<Page<ContentResponse>>>, AppError> {
    find_creator(&state.db, id).await?;
    let (page, per_page) = params.resolve();

    let paginator = content::Entity::find()
        .filter(content::Column::CreatorId.eq(id))
        .order_by_desc(content::Column::CreatedAt)
        .order_by_desc(content::Column::Id)
        .paginate(&state.db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;

    Ok(Json(ApiResponse::ok(
        "Content retrieved",
        Page {
            items: items.into_iter().map(Into::into).collect(),
            pagination: Pagination {
                page,
                per_page,
                total,
                total_pages: total.div_ceil(per_page),
            },
        },
    )))
}
