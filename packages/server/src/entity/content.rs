use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `content_type` values.
pub const TYPE_IMAGE: &str = "image";
pub const TYPE_VIDEO: &str = "video";

/// `source` values.
pub const SOURCE_UPLOAD: &str = "upload";
pub const SOURCE_EXTERNAL: &str = "external";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub creator_id: Uuid,
    #[sea_orm(belongs_to, from = "creator_id", to = "id")]
    pub creator: BelongsTo<super::creator::Entity>,

    pub title: String,
    pub description: Option<String>,
    pub is_premium: bool,
    pub content_type: String,
    pub source: String,

    /// Public URL; a path under the uploads prefix for uploaded items.
    pub url: String,

    pub like_count: i32,

    #[sea_orm(has_many)]
    pub likes: HasMany<super::content_like::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
