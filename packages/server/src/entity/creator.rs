use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "creator")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Identity issued by the hosted auth provider, when linked.
    #[sea_orm(unique)]
    pub user_id: Option<Uuid>,

    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,

    /// Storage folder. Assigned once, never changed afterwards.
    #[sea_orm(unique)]
    pub folder_name: Option<String>,

    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,

    /// Monthly price in cents.
    pub subscription_price: i64,
    pub media_count: i32,
    pub subscriber_count: i32,

    #[sea_orm(has_many)]
    pub contents: HasMany<super::content::Entity>,

    #[sea_orm(has_many)]
    pub subscriptions: HasMany<super::subscription::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
