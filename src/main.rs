use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use saveup_api::config::{self, Environment};
use saveup_api::routes::{app, AppState};
use saveup_api::storage::{FallbackStorage, MemoryStorage, PgStorage, Storage};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting SaveUp API in {:?} mode", config.environment);

    if config.environment == Environment::Production && config.security.jwt_secret.is_empty() {
        tracing::error!("JWT_SECRET must be set in production");
        std::process::exit(1);
    }

    let storage: Arc<dyn Storage> = match &config.database.url {
        Some(url) => match PgStorage::connect(url, &config.database).await {
            Ok(pg) => {
                tracing::info!("Connected to Postgres; in-memory fallback armed");
                Arc::new(FallbackStorage::new(pg, MemoryStorage::new()))
            }
            Err(err) => {
                tracing::warn!(error = %err, "Postgres unavailable at startup; running on the in-memory store");
                Arc::new(MemoryStorage::new())
            }
        },
        None => {
            tracing::info!("DATABASE_URL not set; running on the in-memory store");
            Arc::new(MemoryStorage::new())
        }
    };

    let router = app(AppState::new(storage));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, "failed to bind {bind_addr}");
            std::process::exit(1);
        }
    };

    tracing::info!("SaveUp API listening on http://{bind_addr}");

    if let Err(err) = axum::serve(listener, router).await {
        tracing::error!(error = %err, "server exited");
        std::process::exit(1);
    }
}
