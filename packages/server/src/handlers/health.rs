use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::instrument;

use crate::database::ping;
use crate::models::shared::{ApiResponse, HealthResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/health",
    tag = "Diagnostics",
    operation_id = "health",
    summary = "Report store reachability and storage writability",
    responses(
        (status = 200, description = "All checks passed", body = ApiResponse<HealthResponse>),
        (status = 503, description = "A check failed", body = ApiResponse<HealthResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database = match ping(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Health check: data store unreachable: {e}");
            false
        }
    };
    let storage = match state.assets.check_writable().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Health check: uploads root not writable: {e}");
            false
        }
    };

    let healthy = database && storage;
    let (status, label) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(ApiResponse {
            success: healthy,
            message: format!("Service {label}"),
            data: HealthResponse {
                status: label,
                database,
                storage,
            },
        }),
    )
}
