use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entity::{content, creator, fan};

/// Add `delta` to `column` of the row whose `id_column` equals `id` in one
/// `UPDATE ... SET c = c + delta`, so concurrent requests never lose updates.
/// Returns the number of rows touched (0 when the row does not exist).
async fn increment<E, C>(
    db: &C,
    column: E::Column,
    id_column: E::Column,
    id: Uuid,
    delta: i64,
) -> Result<u64, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let result = E::update_many()
        .col_expr(column, Expr::col(column).add(delta))
        .filter(id_column.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub async fn adjust_media_count<C: ConnectionTrait>(
    db: &C,
    creator_id: Uuid,
    delta: i64,
) -> Result<u64, DbErr> {
    increment::<creator::Entity, _>(
        db,
        creator::Column::MediaCount,
        creator::Column::Id,
        creator_id,
        delta,
    )
    .await
}

pub async fn adjust_subscriber_count<C: ConnectionTrait>(
    db: &C,
    creator_id: Uuid,
    delta: i64,
) -> Result<u64, DbErr> {
    increment::<creator::Entity, _>(
        db,
        creator::Column::SubscriberCount,
        creator::Column::Id,
        creator_id,
        delta,
    )
    .await
}

pub async fn adjust_like_count<C: ConnectionTrait>(
    db: &C,
    content_id: Uuid,
    delta: i64,
) -> Result<u64, DbErr> {
    increment::<content::Entity, _>(
        db,
        content::Column::LikeCount,
        content::Column::Id,
        content_id,
        delta,
    )
    .await
}

pub async fn credit_wallet<C: ConnectionTrait>(
    db: &C,
    fan_id: Uuid,
    amount: i64,
) -> Result<u64, DbErr> {
    increment::<fan::Entity, _>(
        db,
        fan::Column::WalletBalance,
        fan::Column::Id,
        fan_id,
        amount,
    )
    .await
}
