use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shift_radar::db::{self, MemoryRepository, PgRepository, ShiftRepository};
use shift_radar::{handlers, startup, AppConfig, AppState, OfferEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with conditional JSON/text output
    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "text".to_string()) == "json";

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,shift_radar=debug,tower_http=debug".into());

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;

    let repo: Arc<dyn ShiftRepository> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await.map_err(|e| {
                tracing::error!("Failed to create database pool: {}", e);
                e
            })?;
            db::ensure_schema(&pool).await.map_err(|e| {
                tracing::error!("Failed to apply schema: {}", e);
                e
            })?;
            tracing::info!("Database pool created successfully");
            Arc::new(PgRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, keeping shifts in memory");
            Arc::new(MemoryRepository::new())
        }
    };

    let metrics_state = Arc::new(handlers::setup_metrics_recorder()?);
    tracing::info!("Metrics recorder initialized");

    let engine = OfferEngine::new(repo, config.user_cache_ttl);
    let bind_addr = config.bind_addr.clone();

    let state = Arc::new(AppState {
        engine,
        config,
        metrics: metrics_state,
    });

    let app = startup::build_router(state)?;

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
