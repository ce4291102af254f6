use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemAssetStore;
use common::{KeyedLocks, RandomTokens, SlugGenerator, SystemClock, TokenSource};
use tracing::{Level, info};

use server::config::AppConfig;
use server::database::init_db;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to the data store")?;
    info!("Connected to data store");

    let assets = FilesystemAssetStore::new(
        config.storage.uploads_dir.clone(),
        &config.storage.public_prefix,
    )
    .await
    .with_context(|| {
        format!(
            "Failed to prepare uploads directory {}",
            config.storage.uploads_dir.display()
        )
    })?;
    info!(root = %assets.root().display(), "Asset storage ready");

    let tokens: Arc<dyn TokenSource> = Arc::new(RandomTokens);
    let state = AppState {
        db,
        slugs: SlugGenerator::new(config.naming.suffix, tokens.clone()),
        assets: Arc::new(assets),
        clock: Arc::new(SystemClock),
        tokens,
        profile_locks: Arc::new(KeyedLocks::new()),
        config: config.clone(),
    };

    if config.errors.expose_debug {
        tracing::warn!("Error responses include debug details");
    }

    let app = server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host/server.port")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
