mod auth;
mod cloud;
mod config;
mod dataset;
mod error;
mod favorites;
mod model;
mod paging;
mod query;
mod reconcile;
mod server;
mod settings;
#[cfg(test)]
mod testutil;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use cookify_common::redis::RedisStore;

use auth::AccountStore;
use cloud::CloudFavorites;
use config::Config;
use favorites::FavoritesStore;
use settings::SettingsStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting cookify server");

    // 1. Load config from environment
    let config = Config::from_env()?;
    info!(
        recipes_path = %config.recipes_path,
        data_dir = %config.data_dir,
        redis = config.redis_url.is_some(),
        "configuration loaded"
    );

    // 2. Load the recipe dataset (once; immutable afterwards)
    let recipes = dataset::load(std::path::Path::new(&config.recipes_path))?;

    // 3. Open the local durable stores
    let data_dir = std::path::Path::new(&config.data_dir);
    let local = Arc::new(FavoritesStore::open(data_dir)?);
    let settings = Arc::new(SettingsStore::open(data_dir)?);

    // 4. Connect to Redis (optional — without it, favorites stay local-only
    //    and accounts are unavailable)
    let redis = RedisStore::new(config.redis_url.as_deref());
    if redis.is_available().await {
        info!("redis connected, cloud sync enabled");
    } else {
        info!("redis unavailable, running local-only");
    }
    let cloud = CloudFavorites::new(redis.clone());
    let accounts = AccountStore::new(redis, config.session_ttl_secs);

    // 5. Assemble state (boots an anonymous reconciler) and serve
    let state = Arc::new(
        server::AppState::new(recipes, local, settings, cloud, accounts).await,
    );
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "cookify server ready");
    axum::serve(listener, app).await?;

    info!("cookify server shut down");
    Ok(())
}
