use async_trait::async_trait;
use common::SlugGenerator;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, SqlErr};
use tracing::instrument;
use uuid::Uuid;

use crate::entity::creator;
use crate::error::AppError;

/// Upper bound on slug candidates tried when names collide across creators.
pub const MAX_CLAIM_ATTEMPTS: u32 = 5;

/// The part of a creator record the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorIdentity {
    pub id: Uuid,
    pub display_name: String,
    pub folder_name: Option<String>,
}

/// Outcome of a conditional folder-name write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The row had no folder name and now holds the candidate.
    Won,
    /// The row already had a folder name (or disappeared).
    AlreadySet,
    /// Another creator owns the candidate.
    Taken,
}

/// Remote-store operations used by the resolver.
#[async_trait]
pub trait CreatorStore: Send + Sync {
    async fn find_creator(&self, id: Uuid) -> Result<Option<CreatorIdentity>, DbErr>;

    /// Set `folder_name` only if it is still unset.
    async fn claim_folder_name(&self, id: Uuid, folder_name: &str) -> Result<Claim, DbErr>;
}

#[async_trait]
impl CreatorStore for DatabaseConnection {
    async fn find_creator(&self, id: Uuid) -> Result<Option<CreatorIdentity>, DbErr> {
        Ok(creator::Entity::find_by_id(id)
            .one(self)
            .await?
            .map(|c| CreatorIdentity {
                id: c.id,
                display_name: c.display_name,
                folder_name: c.folder_name,
            }))
    }

    async fn claim_folder_name(&self, id: Uuid, folder_name: &str) -> Result<Claim, DbErr> {
        let result = creator::Entity::update_many()
            .col_expr(creator::Column::FolderName, Expr::value(folder_name))
            .filter(creator::Column::Id.eq(id))
            .filter(creator::Column::FolderName.is_null())
            .exec(self)
            .await;

        match result {
            Ok(res) if res.rows_affected == 1 => Ok(Claim::Won),
            Ok(_) => Ok(Claim::AlreadySet),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(Claim::Taken),
                _ => Err(e),
            },
        }
    }
}

/// Return the creator's folder name, assigning one if it has none.
///
/// Assignment is a compare-and-set on the creator row, so concurrent
/// resolvers agree on whichever value was written first. The name never
/// changes once set.
///
/// Fails with `NotFound` when the creator does not exist. If the remote store
/// rejects the write for a reason other than a name collision, the computed
/// name is still returned so the current request can proceed.
#[instrument(skip(store, slugs))]
pub async fn resolve_folder_name<S>(
    store: &S,
    slugs: &SlugGenerator,
    creator_id: Uuid,
) -> Result<String, AppError>
where
    S: CreatorStore + ?Sized,
{
    let creator = store
        .find_creator(creator_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Creator not found".into()))?;

    if let Some(folder_name) = creator.folder_name {
        return Ok(folder_name);
    }

    let identifier = creator_id.to_string();
    for attempt in 0..MAX_CLAIM_ATTEMPTS {
        let candidate = slugs.generate(&creator.display_name, &identifier, attempt);

        match store.claim_folder_name(creator_id, &candidate).await {
            Ok(Claim::Won) => {
                tracing::info!(folder_name = %candidate, "Assigned creator folder");
                return Ok(candidate);
            }
            Ok(Claim::AlreadySet) => {
                let current = store
                    .find_creator(creator_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Creator not found".into()))?;
                if let Some(winner) = current.folder_name {
                    tracing::debug!(folder_name = %winner, "Folder assigned concurrently");
                    return Ok(winner);
                }
            }
            Ok(Claim::Taken) => {
                tracing::debug!(candidate = %candidate, attempt, "Folder name taken");
            }
            Err(e) => {
                tracing::warn!(
                    candidate = %candidate,
                    "Failed to persist folder name, using computed value: {e}"
                );
                return Ok(candidate);
            }
        }
    }

    Err(AppError::Conflict(
        "Could not assign a unique folder name".into(),
    ))
}
