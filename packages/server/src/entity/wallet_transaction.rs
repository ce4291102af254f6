use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const KIND_TOP_UP: &str = "top_up";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_transaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub fan_id: Uuid,
    #[sea_orm(belongs_to, from = "fan_id", to = "id")]
    pub fan: BelongsTo<super::fan::Entity>,

    /// Signed amount in cents.
    pub amount: i64,
    pub kind: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
