use std::sync::Arc;

use common::storage::AssetStore;
use common::{Clock, KeyedLocks, SlugGenerator, TokenSource};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub assets: Arc<dyn AssetStore>,
    pub slugs: SlugGenerator,
    pub clock: Arc<dyn Clock>,
    pub tokens: Arc<dyn TokenSource>,
    /// Serialises avatar and banner replacement per creator and kind.
    pub profile_locks: Arc<KeyedLocks>,
}
