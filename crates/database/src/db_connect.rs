use app_config::AppConfig;
use app_error::{AppErrorExt, AppResult};
use std::sync::Arc;

use crate::{Database, service::DbCredentials};

/// Initialize the database named by the configuration. A `memory` endpoint
/// gets the embedded engine (development and tests); anything else is a
/// remote SurrealDB connection.
pub async fn initialize_db(config: &AppConfig) -> AppResult<Arc<Database>> {
    let db_config = &config.database;
    tracing::debug!("Connecting to SurrealDB: {}", db_config.endpoint);

    if db_config.endpoint.starts_with("wss://") {
        tracing::info!("Using secure TLS connection to database");
    } else if !db_config.endpoint.contains("memory") {
        tracing::warn!("Using non-secure database connection");
    }

    let max_connections = db_config.pool.size;
    tracing::info!(
        "Initializing database connection pool with {} connections",
        max_connections
    );

    let db = if db_config.endpoint.contains("memory") {
        Database::initialize_memory(max_connections, &db_config.namespace, &db_config.database)
            .await?
    } else {
        let credentials = DbCredentials::new(&db_config.username, &db_config.password);
        Database::initialize(
            &db_config.endpoint,
            max_connections,
            &db_config.namespace,
            &db_config.database,
            &credentials,
        )
        .await?
    };

    define_indexes(&db).await?;

    tracing::info!("Successfully connected to SurrealDB with connection pool");

    Ok(Arc::new(db))
}

/// In-memory database for tests.
pub async fn initialize_memory_db() -> AppResult<Arc<Database>> {
    let db = Database::initialize_memory(10, "fundraiser", "fundraiser").await?;
    define_indexes(&db).await?;
    Ok(Arc::new(db))
}

/// Uniqueness constraints the application relies on: concurrent
/// registrations with the same username or email are resolved here, not in
/// application code.
async fn define_indexes(db: &Database) -> AppResult<()> {
    let conn = db.get_connection().await?;

    conn.get_ref()
        .query(
            "DEFINE INDEX IF NOT EXISTS user_username_idx ON TABLE users COLUMNS username UNIQUE",
        )
        .await
        .db_err()?;

    conn.get_ref()
        .query("DEFINE INDEX IF NOT EXISTS user_email_idx ON TABLE users COLUMNS email UNIQUE")
        .await
        .db_err()?;

    Ok(())
}
