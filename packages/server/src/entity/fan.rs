use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fan")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub display_name: String,

    /// Balance in cents.
    pub wallet_balance: i64,

    #[sea_orm(has_many)]
    pub likes: HasMany<super::content_like::Entity>,

    #[sea_orm(has_many)]
    pub subscriptions: HasMany<super::subscription::Entity>,

    #[sea_orm(has_many)]
    pub wallet_transactions: HasMany<super::wallet_transaction::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
