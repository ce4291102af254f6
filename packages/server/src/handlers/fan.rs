use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::instrument;
use uuid::Uuid;

use crate::counters::{adjust_subscriber_count, credit_wallet};
use crate::entity::{fan, subscription, wallet_transaction};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::handlers::creator::find_creator;
use crate::models::fan::*;
use crate::models::shared::ApiResponse;
use crate::state::AppState;

pub(crate) async fn find_fan<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<fan::Model, AppError> {
    fan::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Fan not found".into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Fans",
    operation_id = "createFan",
    summary = "Create a fan account",
    request_body = CreateFanRequest,
    responses(
        (status = 201, description = "Fan created", body = ApiResponse<FanResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Username or email taken (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn create_fan(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateFanRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_fan(&payload)?;

    let model = fan::ActiveModel {
        id: Set(Uuid::now_v7()),
        username: Set(payload.username.trim().to_string()),
        email: Set(payload.email.trim().to_ascii_lowercase()),
        display_name: Set(payload.display_name.trim().to_string()),
        wallet_balance: Set(0),
        created_at: Set(state.clock.now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| AppError::from_write(e, "Username or email is already registered"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Fan created", FanResponse::from(model))),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Fans",
    operation_id = "getFan",
    summary = "Get a fan",
    params(("id" = Uuid, Path, description = "Fan ID")),
    responses(
        (status = 200, description = "Fan", body = ApiResponse<FanResponse>),
        (status = 404, description = "Fan not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_fan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FanResponse>>, AppError> {
    let model = find_fan(&state.db, id).await?;
    Ok(Json(ApiResponse::ok("Fan retrieved", model.into())))
}

#[utoipa::path(
    post,
    path = "/{id}/wallet/top-up",
    tag = "Fans",
    operation_id = "topUpWallet",
    summary = "Add funds to a fan's wallet",
    description = "Credits the wallet and records a ledger entry in one transaction.",
    params(("id" = Uuid, Path, description = "Fan ID")),
    request_body = TopUpRequest,
    responses(
        (status = 200, description = "Wallet credited", body = ApiResponse<WalletResponse>),
        (status = 400, description = "Amount out of range (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Fan not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(amount = payload.amount))]
pub async fn top_up_wallet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<TopUpRequest>,
) -> Result<Json<ApiResponse<WalletResponse>>, AppError> {
    validate_top_up(&payload)?;

    let txn = state.db.begin().await?;
    if credit_wallet(&txn, id, payload.amount).await? == 0 {
        return Err(AppError::NotFound("Fan not found".into()));
    }

    let entry = wallet_transaction::ActiveModel {
        id: Set(Uuid::now_v7()),
        fan_id: Set(id),
        amount: Set(payload.amount),
        kind: Set(wallet_transaction::KIND_TOP_UP.to_string()),
        created_at: Set(state.clock.now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let balance = find_fan(&txn, id).await?.wallet_balance;
    txn.commit().await?;

    tracing::info!(fan_id = %id, balance, "Wallet topped up");

    Ok(Json(ApiResponse::ok(
        "Wallet topped up",
        WalletResponse {
            fan_id: id,
            transaction_id: entry.id,
            amount: entry.amount,
            wallet_balance: balance,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Subscriptions",
    operation_id = "subscribe",
    summary = "Subscribe a fan to a creator",
    request_body = SubscriptionRequest,
    responses(
        (status = 201, description = "Subscribed", body = ApiResponse<SubscriptionResponse>),
        (status = 404, description = "Fan or creator not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already subscribed (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(fan_id = %payload.fan_id, creator_id = %payload.creator_id))]
pub async fn subscribe(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubscriptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_fan(&txn, payload.fan_id).await?;
    find_creator(&txn, payload.creator_id).await?;

    let model = subscription::ActiveModel {
        fan_id: Set(payload.fan_id),
        creator_id: Set(payload.creator_id),
        created_at: Set(state.clock.now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::from_write(e, "Already subscribed"))?;

    adjust_subscriber_count(&txn, payload.creator_id, 1).await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Subscribed",
            SubscriptionResponse::from(model),
        )),
    ))
}

#[utoipa::path(
    delete,
    path = "/",
    tag = "Subscriptions",
    operation_id = "unsubscribe",
    summary = "Cancel a subscription",
    request_body = SubscriptionRequest,
    responses(
        (status = 200, description = "Unsubscribed", body = ApiResponse<SubscriptionResponse>),
        (status = 404, description = "Subscription not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(fan_id = %payload.fan_id, creator_id = %payload.creator_id))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubscriptionRequest>,
) -> Result<Json<ApiResponse<SubscriptionResponse>>, AppError> {
    let txn = state.db.begin().await?;

    let existing = subscription::Entity::find_by_id((payload.fan_id, payload.creator_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Subscription not found".into()))?;

    let removed = subscription::Entity::delete_many()
        .filter(subscription::Column::FanId.eq(payload.fan_id))
        .filter(subscription::Column::CreatorId.eq(payload.creator_id))
        .exec(&txn)
        .await?;
    // A concurrent unsubscribe got here first.
    if removed.rows_affected == 0 {
        return Err(AppError::NotFound("Subscription not found".into()));
    }

    adjust_subscriber_count(&txn, payload.creator_id, -1).await?;
    txn.commit().await?;

    Ok(Json(ApiResponse::ok("Unsubscribed", existing.into())))
}

#[utoipa::path(
    get,
    path = "/{id}/subscriptions",
    tag = "Fans",
    operation_id = "listFanSubscriptions",
    summary = "List a fan's subscriptions",
    params(("id" = Uuid, Path, description = "Fan ID")),
    responses(
        (status = 200, description = "Subscriptions, newest first", body = ApiResponse<Vec<SubscriptionResponse>>),
        (status = 404, description = "Fan not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_fan_subscriptions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<SubscriptionResponse>>>, AppError> {
    find_fan(&state.db, id).await?;

    let rows = subscription::Entity::find()
        .filter(subscription::Column::FanId.eq(id))
        .order_by_desc(subscription::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::ok(
        "Subscriptions retrieved",
        rows.into_iter().map(Into::into).collect(),
    )))
}
