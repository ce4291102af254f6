use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{fan, subscription};
use crate::error::AppError;

use super::shared::{FieldErrors, validate_display_name, validate_email, validate_username};

/// Largest single top-up, in cents.
pub const MAX_TOP_UP: i64 = 1_000_000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateFanRequest {
    #[schema(example = "superfan")]
    pub username: String,
    #[schema(example = "fan@example.com")]
    pub email: String,
    #[schema(example = "Super Fan")]
    pub display_name: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FanResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    /// Balance in cents.
    pub wallet_balance: i64,
    pub created_at: DateTime<Utc>,
}

impl From<fan::Model> for FanResponse {
    fn from(model: fan::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            display_name: model.display_name,
            wallet_balance: model.wallet_balance,
            created_at: model.created_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct TopUpRequest {
    /// Amount in cents, 1 to 1000000.
    #[schema(example = 2500)]
    pub amount: i64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct WalletResponse {
    pub fan_id: Uuid,
    pub transaction_id: Uuid,
    pub amount: i64,
    pub wallet_balance: i64,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubscriptionRequest {
    pub fan_id: Uuid,
    pub creator_id: Uuid,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubscriptionResponse {
    pub fan_id: Uuid,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<subscription::Model> for SubscriptionResponse {
    fn from(model: subscription::Model) -> Self {
        Self {
            fan_id: model.fan_id,
            creator_id: model.creator_id,
            created_at: model.created_at,
        }
    }
}

pub fn validate_create_fan(req: &CreateFanRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::default();
    errors.check(validate_username(&req.username));
    errors.check(validate_email(&req.email));
    errors.check(validate_display_name(&req.display_name));
    errors.finish()
}

pub fn validate_top_up(req: &TopUpRequest) -> Result<(), AppError> {
    if !(1..=MAX_TOP_UP).contains(&req.amount) {
        return Err(AppError::Validation(format!(
            "Amount must be between 1 and {MAX_TOP_UP} cents"
        )));
    }
    Ok(())
}
