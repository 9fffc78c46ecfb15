mod config;
mod error;
mod filter;
mod listing;
mod model;
mod seed;
mod server;
mod sponsor;
mod store;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use tomo_common::redis::RedisStore;

use config::Config;
use filter::FilterCriteria;
use store::CatalogStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_ansi(false)
        .init();

    info!("starting guide-catalog server");

    // 1. Load config from environment
    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        redis = config.redis_url.is_some(),
        seed = config.seed_path.is_some(),
        "configuration loaded"
    );

    // 2. Connect to Redis (optional — graceful degradation if unavailable)
    let redis = RedisStore::new(config.redis_url.as_deref());
    match redis.ping().await {
        Ok(()) => info!("redis connected"),
        Err(e) => info!(reason = %e, "running without persistence"),
    }

    // 3. Build the store: prefer a persisted snapshot, fall back to the seed file
    let store = Arc::new(CatalogStore::new(redis));
    if store.restore().await {
        info!(guides = store.guides().await.len(), "catalog restored from snapshot");
    } else if let Some(path) = &config.seed_path {
        let raw = std::fs::read_to_string(path)?;
        let guides = seed::load_guides(&raw)?;
        info!(guides = guides.len(), path = %path, "catalog seeded from file");
        store.replace_guides(guides).await;
    } else {
        info!("starting with an empty catalog");
    }

    // 4. One reactive pass per state revision: recompute the unfiltered
    // listing and log its counts, instead of timers re-checking the view.
    let watch_store = Arc::clone(&store);
    tokio::spawn(async move {
        let mut revisions = watch_store.subscribe();
        while revisions.changed().await.is_ok() {
            let revision = *revisions.borrow_and_update();
            let guides = watch_store.guides().await;
            let locale = watch_store.locale().await;
            let view = listing::render(&guides, &FilterCriteria::default(), locale);
            info!(
                revision,
                total = view.total_count,
                counter = %view.counter_text,
                "catalog state changed"
            );
        }
    });

    // 5. Serve HTTP
    let state = server::AppState { store };
    let app = server::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "guide catalog ready");
    axum::serve(listener, app).await?;
    Ok(())
}
