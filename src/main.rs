//! Beer server: loads `.env`, picks PostgreSQL or the in-memory store, mounts all routes.

use beer_service::{
    app_with_body_limit, ensure_beer_table, ensure_database_exists, AppConfig, AppState, MemoryBeerRepository,
    PgBeerRepository,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("beer_service=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let state = match &config.database_url {
        Some(database_url) => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            ensure_beer_table(&pool).await?;
            tracing::info!("using PostgreSQL beer store");
            AppState::new(PgBeerRepository::new(pool))
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory beer store");
            AppState::new(MemoryBeerRepository::new())
        }
    };

    let app = app_with_body_limit(state, config.body_limit);
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
