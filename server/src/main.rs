use anyhow::Context;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app_config::AppConfig;
use app_database::db_connect::initialize_db;
use app_error::AppError;
use fundraiser_api::{routes, state::AppState};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv::dotenv().ok();

    let mut config = AppConfig::load().context("Failed to load configuration")?;

    // The signing secret can be rotated without touching the config file.
    if let Ok(secret) = std::env::var("SECRET_KEY") {
        config.security.jwt.secret = secret;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting fundraiser API at {}", chrono::Utc::now());

    let db = initialize_db(&config).await?;

    let address = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, db);
    let app = routes::create_routes(state);

    let listener = TcpListener::bind(&address)
        .await
        .context(format!("Failed to bind to address: {}", address))?;

    info!("Listening on http://{}", address);

    // ConnectInfo carries the peer address the rate limiter keys on.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
