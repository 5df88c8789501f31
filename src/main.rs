mod analytics;
mod api;
mod catalog;
mod config;
mod db;
mod error;
mod types;

use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::db::SampleStore;
use crate::error::Result;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let opts = SqliteConnectOptions::new()
        .filename(&cfg.db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(opts).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database ready at {}", cfg.db_path);

    // --- Reference catalog ---
    // A missing catalog degrades gracefully: sample-only endpoints stay
    // fully functional, taxonomy filters and craft rankings go empty.
    let catalog = match Catalog::from_path(&cfg.catalog_path) {
        Ok(c) => {
            info!(
                "Catalog loaded from {}: {} items, {} recipes",
                cfg.catalog_path,
                c.item_count(),
                c.recipes().len(),
            );
            c
        }
        Err(e) => {
            warn!(
                "Catalog unavailable at {} ({e}) — display names, taxonomy filters and craft rankings degrade",
                cfg.catalog_path,
            );
            Catalog::empty()
        }
    };

    // --- HTTP API server ---
    let api_state = ApiState {
        store: SampleStore::new(pool),
        catalog: Arc::new(catalog),
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
