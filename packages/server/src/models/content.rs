use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::content;
use crate::error::AppError;
use crate::placement::MediaClass;

use super::shared::{FieldErrors, validate_description, validate_external_url, validate_title};

/// Register an item hosted elsewhere.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterContentRequest {
    pub creator_id: Uuid,
    #[schema(example = "Behind the scenes")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "https://cdn.example.com/bts.mp4")]
    pub url: String,
    /// `image` or `video`.
    #[schema(example = "video")]
    pub content_type: String,
    #[serde(default)]
    pub is_premium: bool,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct LikeRequest {
    pub fan_id: Uuid,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContentResponse {
    pub id: Uuid,
    pub creator_id: Uuid,
    #[schema(example = "Sunset")]
    pub title: String,
    pub description: Option<String>,
    pub is_premium: bool,
    /// `image` or `video`.
    #[schema(example = "image")]
    pub content_type: String,
    /// `upload` or `external`.
    #[schema(example = "upload")]
    pub source: String,
    #[schema(example = "/uploads/creators/janedoe-3f2a/content/1700000000000-1a2b3c4d.jpg")]
    pub url: String,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<content::Model> for ContentResponse {
    fn from(model: content::Model) -> Self {
        Self {
            id: model.id,
            creator_id: model.creator_id,
            title: model.title,
            description: model.description,
            is_premium: model.is_premium,
            content_type: model.content_type,
            source: model.source,
            url: model.url,
            like_count: model.like_count,
            created_at: model.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LikeResponse {
    pub content_id: Uuid,
    pub fan_id: Uuid,
    pub like_count: i32,
}

/// Fields common to uploaded and registered content.
pub fn validate_content_fields(title: &str, description: Option<&str>) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.check(validate_title(title));
    if let Some(description) = description {
        errors.check(validate_description(description));
    }
    errors
}

pub fn validate_register_content(req: &RegisterContentRequest) -> Result<MediaClass, AppError> {
    let mut errors = validate_content_fields(&req.title, req.description.as_deref());
    errors.check(validate_external_url(&req.url));
    let class = MediaClass::parse(req.content_type.trim());
    if class.is_none() {
        errors.check(Err("content_type must be 'image' or 'video'".into()));
    }
    errors.finish()?;
    class.ok_or_else(|| AppError::Validation("content_type must be 'image' or 'video'".into()))
}
