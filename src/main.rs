use std::sync::Arc;

use devconnect_api::auth::TokenService;
use devconnect_api::config::AppConfig;
use devconnect_api::github::GithubClient;
use devconnect_api::routes::{app, AppState};
use devconnect_api::store::postgres::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and JWT_SECRET.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    tracing::info!("starting devconnect-api in {:?} mode", config.environment);

    let store = PgStore::connect(&config.database).await?;
    store.migrate().await?;

    let state = AppState {
        store: Arc::new(store),
        tokens: TokenService::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)?,
        github: GithubClient::new(&config.github),
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
