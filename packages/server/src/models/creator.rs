use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::creator;
use crate::error::AppError;

use super::shared::{
    FieldErrors, double_option, validate_bio, validate_display_name, validate_email,
    validate_price, validate_username,
};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCreatorRequest {
    #[schema(example = "Jane Doe")]
    pub display_name: String,
    #[schema(example = "janedoe")]
    pub username: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    pub bio: Option<String>,
    /// Monthly price in cents. Defaults to 0.
    #[schema(example = 999)]
    pub subscription_price: Option<i64>,
    /// Identity issued by the auth provider.
    pub user_id: Option<Uuid>,
}

/// Profile fields a creator may change. The folder name is not one of them.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCreatorRequest {
    pub display_name: Option<String>,
    /// `null` clears the bio.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
    pub subscription_price: Option<i64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CreatorResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    #[schema(example = "janedoe")]
    pub username: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "Jane Doe")]
    pub display_name: String,
    pub bio: Option<String>,
    /// Storage folder, assigned on first asset placement.
    #[schema(example = "janedoe-3f2a")]
    pub folder_name: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    #[schema(example = 999)]
    pub subscription_price: i64,
    pub media_count: i32,
    pub subscriber_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<creator::Model> for CreatorResponse {
    fn from(model: creator::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            username: model.username,
            email: model.email,
            display_name: model.display_name,
            bio: model.bio,
            folder_name: model.folder_name,
            avatar_url: model.avatar_url,
            banner_url: model.banner_url,
            subscription_price: model.subscription_price,
            media_count: model.media_count,
            subscriber_count: model.subscriber_count,
            created_at: model.created_at,
        }
    }
}

/// Result of an avatar or banner upload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProfileImageResponse {
    /// Public URL of the stored image.
    #[schema(example = "/uploads/creators/janedoe-3f2a/avatar.png")]
    pub url: String,
    #[schema(example = "janedoe-3f2a")]
    pub folder_name: String,
    pub creator: CreatorResponse,
}

pub fn validate_create_creator(req: &CreateCreatorRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::default();
    errors.check(validate_display_name(&req.display_name));
    errors.check(validate_username(&req.username));
    errors.check(validate_email(&req.email));
    if let Some(bio) = &req.bio {
        errors.check(validate_bio(bio));
    }
    if let Some(price) = req.subscription_price {
        errors.check(validate_price(price));
    }
    errors.finish()
}

pub fn validate_update_creator(req: &UpdateCreatorRequest) -> Result<(), AppError> {
    if *req == UpdateCreatorRequest::default() {
        return Err(AppError::Validation("No fields to update".into()));
    }
    let mut errors = FieldErrors::default();
    if let Some(name) = &req.display_name {
        errors.check(validate_display_name(name));
    }
    if let Some(Some(bio)) = &req.bio {
        errors.check(validate_bio(bio));
    }
    if let Some(price) = req.subscription_price {
        errors.check(validate_price(price));
    }
    errors.finish()
}
