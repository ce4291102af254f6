use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::AssetKind;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::instrument;
use uuid::Uuid;

use crate::counters::{adjust_like_count, adjust_media_count};
use crate::entity::{content, content_like, creator};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::handlers::creator::find_creator;
use crate::handlers::fan::find_fan;
use crate::models::content::*;
use crate::models::shared::{ApiResponse, parse_bool_field, parse_uuid};
use crate::placement::{MediaClass, classify};
use crate::state::AppState;
use crate::upload::{FileLimit, StagedForm, stage_form};

pub(crate) async fn find_content<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<content::Model, AppError> {
    content::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Content not found".into()))
}

/// Resolve the uploading creator from the form.
///
/// `userId` is the auth-provider identity and is matched against
/// `creator.user_id` first, then against the creator id itself.
async fn resolve_uploader<C: ConnectionTrait>(
    db: &C,
    form: &StagedForm,
) -> Result<creator::Model, AppError> {
    if let Some(raw) = form.text("creatorId") {
        let id = parse_uuid(raw, "creatorId")?;
        return find_creator(db, id).await;
    }

    let raw = form
        .text("userId")
        .ok_or_else(|| AppError::Validation("Missing 'creatorId' or 'userId' field".into()))?;
    let id = parse_uuid(raw, "userId")?;

    if let Some(model) = creator::Entity::find()
        .filter(creator::Column::UserId.eq(id))
        .one(db)
        .await?
    {
        return Ok(model);
    }
    find_creator(db, id).await
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Content",
    operation_id = "uploadContent",
    summary = "Upload a content item",
    description = "Stores the `contentFile` multipart field in the creator's content folder and \
        creates the content record. Form fields: `creatorId` or `userId`, `title`, optional \
        `description` and `isPremium`. Only images and videos are accepted.",
    request_body(content_type = "multipart/form-data", description = "Content file and metadata"),
    responses(
        (status = 201, description = "Content created", body = ApiResponse<ContentResponse>),
        (status = 400, description = "Missing field, oversized or unsupported file (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Creator not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage or data store failure (IO_ERROR, REMOTE_STORE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_content(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = stage_form(
        &mut multipart,
        state.assets.as_ref(),
        &[FileLimit::new(
            "contentFile",
            state.config.storage.max_upload_size,
        )],
    )
    .await?;

    let result = create_uploaded_content(&state, &form).await;
    form.cleanup(state.assets.as_ref()).await;

    let model = result?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Content uploaded",
            ContentResponse::from(model),
        )),
    ))
}

async fn create_uploaded_content(
    state: &AppState,
    form: &StagedForm,
) -> Result<content::Model, AppError> {
    let file = form
        .file("contentFile")
        .ok_or_else(|| AppError::Validation("Missing 'contentFile' field".into()))?;

    let title = form.text("title").unwrap_or_default();
    let description = form.text("description");
    validate_content_fields(title, description).finish()?;
    let is_premium = parse_bool_field(form.text("isPremium"), "isPremium")?;

    let class = classify(file.content_type.as_deref(), file.file_name.as_deref())
        .ok_or_else(|| AppError::Validation("Only image and video files are accepted".into()))?;

    let creator = resolve_uploader(&state.db, form).await?;
    let placement = state.placement();
    let placed = placement
        .place_upload(file, creator.id, AssetKind::Content)
        .await?;

    let inserted = insert_content(
        state,
        NewContent {
            creator_id: creator.id,
            title,
            description,
            is_premium,
            class,
            source: content::SOURCE_UPLOAD,
            url: placed.url.clone(),
        },
    )
    .await;
    if inserted.is_err() {
        placement.discard_placed(&placed).await;
    }
    inserted
}

struct NewContent<'a> {
    creator_id: Uuid,
    title: &'a str,
    description: Option<&'a str>,
    is_premium: bool,
    class: MediaClass,
    source: &'static str,
    url: String,
}

/// Insert the record and bump the creator's media count together.
async fn insert_content(state: &AppState, new: NewContent<'_>) -> Result<content::Model, AppError> {
    let txn = state.db.begin().await?;

    let model = content::ActiveModel {
        id: Set(Uuid::now_v7()),
        creator_id: Set(new.creator_id),
        title: Set(new.title.trim().to_string()),
        description: Set(new.description.map(str::to_string)),
        is_premium: Set(new.is_premium),
        content_type: Set(new.class.as_str().to_string()),
        source: Set(new.source.to_string()),
        url: Set(new.url),
        like_count: Set(0),
        created_at: Set(state.clock.now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    adjust_media_count(&txn, new.creator_id, 1).await?;
    txn.commit().await?;

    tracing::info!(content_id = %model.id, creator_id = %new.creator_id, "Content created");
    Ok(model)
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Content",
    operation_id = "registerContent",
    summary = "Register externally hosted content",
    description = "Creates a content record pointing at an absolute http(s) URL. No file is stored.",
    request_body = RegisterContentRequest,
    responses(
        (status = 201, description = "Content registered", body = ApiResponse<ContentResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Creator not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(creator_id = %payload.creator_id))]
pub async fn register_content(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let class = validate_register_content(&payload)?;
    find_creator(&state.db, payload.creator_id).await?;

    let model = insert_content(
        &state,
        NewContent {
            creator_id: payload.creator_id,
            title: &payload.title,
            description: payload.description.as_deref(),
            is_premium: payload.is_premium,
            class,
            source: content::SOURCE_EXTERNAL,
            url: payload.url.clone(),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Content registered",
            ContentResponse::from(model),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Content",
    operation_id = "getContent",
    summary = "Get a content item",
    params(("id" = Uuid, Path, description = "Content ID")),
    responses(
        (status = 200, description = "Content item", body = ApiResponse<ContentResponse>),
        (status = 404, description = "Content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ContentResponse>>, AppError> {
    let model = find_content(&state.db, id).await?;
    Ok(Json(ApiResponse::ok("Content retrieved", model.into())))
}

#[utoipa::path(
    post,
    path = "/{id}/like",
    tag = "Content",
    operation_id = "likeContent",
    summary = "Like a content item",
    params(("id" = Uuid, Path, description = "Content ID")),
    request_body = LikeRequest,
    responses(
        (status = 201, description = "Like recorded", body = ApiResponse<LikeResponse>),
        (status = 404, description = "Content or fan not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already liked (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(fan_id = %payload.fan_id))]
pub async fn like_content(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<LikeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_content(&txn, id).await?;
    find_fan(&txn, payload.fan_id).await?;

    content_like::ActiveModel {
        content_id: Set(id),
        fan_id: Set(payload.fan_id),
        created_at: Set(state.clock.now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::from_write(e, "Content already liked"))?;

    adjust_like_count(&txn, id, 1).await?;
    let like_count = find_content(&txn, id).await?.like_count;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Content liked",
            LikeResponse {
                content_id: id,
                fan_id: payload.fan_id,
                like_count,
            },
        )),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}/like",
    tag = "Content",
    operation_id = "unlikeContent",
    summary = "Remove a like",
    params(("id" = Uuid, Path, description = "Content ID")),
    request_body = LikeRequest,
    responses(
        (status = 200, description = "Like removed", body = ApiResponse<LikeResponse>),
        (status = 404, description = "Like not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(fan_id = %payload.fan_id))]
pub async fn unlike_content(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<LikeRequest>,
) -> Result<Json<ApiResponse<LikeResponse>>, AppError> {
    let txn = state.db.begin().await?;

    let removed = content_like::Entity::delete_many()
        .filter(content_like::Column::ContentId.eq(id))
        .filter(content_like::Column::FanId.eq(payload.fan_id))
        .exec(&txn)
        .await?;
    if removed.rows_affected == 0 {
        return Err(AppError::NotFound("Like not found".into()));
    }

    adjust_like_count(&txn, id, -1).await?;
    let like_count = find_content(&txn, id).await?.like_count;
    txn.commit().await?;

    Ok(Json(ApiResponse::ok(
        "Like removed",
        LikeResponse {
            content_id: id,
            fan_id: payload.fan_id,
            like_count,
        },
    )))
}
