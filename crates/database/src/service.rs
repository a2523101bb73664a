use crate::{ConnectionPool, Database, PooledConnection};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{marker::PhantomData, sync::Arc, sync::Mutex, time::Duration};
use surrealdb::{engine::any::Any, opt::auth::Root};
use tokio::time::timeout;

use app_error::{AppError, AppErrorExt, AppResult};

impl ConnectionPool {
    pub fn new(connection_url: &str, max_size: usize) -> Self {
        Self {
            connection_url: connection_url.to_string(),
            connections: Mutex::new(Vec::with_capacity(max_size)).into(),
            max_size,
        }
    }

    /// Get a connection from the pool or create a new one if needed.
    /// Pooled connections are health-checked before reuse; dead ones are
    /// dropped and replaced.
    pub async fn get_connection(&self) -> AppResult<PooledConnection<'_>> {
        let conn_opt: Option<surrealdb::Surreal<Any>> = {
            let mut connections = self.connections.lock().map_err(|e| {
                AppError::ServerError(anyhow::anyhow!(
                    "Failed to lock connection pool mutex: {}",
                    e
                ))
            })?;
            connections.pop()
        };

        if let Some(conn) = conn_opt {
            match timeout(Duration::from_secs(2), conn.health()).await {
                Ok(Ok(_)) => {
                    return Ok(PooledConnection {
                        conn: Some(conn),
                        pool: self,
                    });
                }
                _ => {
                    tracing::debug!("Discarding invalid connection from pool");
                }
            }
        }

        let conn_future = surrealdb::engine::any::connect(&self.connection_url);
        match timeout(Duration::from_secs(5), conn_future).await {
            Ok(conn_result) => {
                let new_conn = conn_result
                    .context("Failed to connect to database")
                    .db_err()?;

                Ok(PooledConnection {
                    conn: Some(new_conn),
                    pool: self,
                })
            }
            Err(_) => Err(AppError::DatabaseError(anyhow::anyhow!(
                "Database connection timeout - could not establish connection within 5 seconds"
            ))),
        }
    }

    pub fn return_connection(&self, conn: surrealdb::Surreal<Any>) {
        if let Ok(mut connections) = self.connections.lock() {
            if connections.len() < self.max_size {
                connections.push(conn);
                return;
            }
        }
        // Pool full or mutex poisoned; the connection is dropped.
    }
}

#[derive(Clone)]
pub struct DbCredentials {
    username: String,
    password: String,
}

impl DbCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_password(&self) -> &str {
        &self.password
    }
}

// Don't accidentally log credentials
impl std::fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Translate a SurrealDB error into the application taxonomy. Unique-index
/// violations become conflicts so registration races surface as duplicates
/// rather than server faults.
fn translate_db_error(operation: &str, e: surrealdb::Error) -> AppError {
    let message = e.to_string();
    if message.contains("already contains") {
        AppError::ConflictError("Record violates a uniqueness constraint".to_string())
    } else {
        AppError::DatabaseError(anyhow::anyhow!("Failed to {}: {}", operation, message))
    }
}

impl Database {
    pub fn new(connection_url: &str, max_connections: usize) -> Self {
        if !connection_url.starts_with("ws://")
            && !connection_url.starts_with("wss://")
            && !connection_url.contains("memory")
        {
            tracing::warn!(
                "Potentially invalid database connection URL format: {}",
                connection_url
            );
        }

        let pool = ConnectionPool::new(connection_url, max_connections);
        Self { pool }
    }

    pub async fn get_connection(&self) -> AppResult<PooledConnection<'_>> {
        self.pool.get_connection().await
    }

    pub async fn initialize(
        connection_url: &str,
        max_connections: usize,
        namespace: &str,
        database: &str,
        credentials: &DbCredentials,
    ) -> AppResult<Self> {
        if namespace.trim().is_empty() {
            return Err(AppError::validation("Database namespace cannot be empty"));
        }

        if database.trim().is_empty() {
            return Err(AppError::validation("Database name cannot be empty"));
        }

        let db = Self::new(connection_url, max_connections);

        {
            let conn = db.get_connection().await?;

            conn.get_ref()
                .signin(Root {
                    username: credentials.get_username(),
                    password: credentials.get_password(),
                })
                .await
                .context("Failed to authenticate with database")
                .db_err()?;

            conn.get_ref()
                .use_ns(namespace)
                .use_db(database)
                .await
                .context("Failed to select namespace and database")
                .db_err()?;
        }

        Ok(db)
    }

    /// In-memory engine, used by tests and the default development config.
    /// No authentication step; the memory engine has no credentials.
    pub async fn initialize_memory(
        max_connections: usize,
        namespace: &str,
        database: &str,
    ) -> AppResult<Self> {
        let db = Self::new("memory", max_connections);

        {
            let conn = db.get_connection().await?;

            conn.get_ref()
                .use_ns(namespace)
                .use_db(database)
                .await
                .context("Failed to select namespace and database")
                .db_err()?;
        }

        Ok(db)
    }

    pub async fn create<T>(&self, table: &str, data: T) -> AppResult<Option<T>>
    where
        T: Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static,
    {
        let conn = self.get_connection().await?;
        conn.get_ref()
            .create(table)
            .content(data)
            .await
            .map_err(|e| translate_db_error("create record", e))
    }

    pub async fn update<T>(&self, location: (&str, &str), data: T) -> AppResult<Option<T>>
    where
        T: Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static,
    {
        let conn = self.get_connection().await?;
        conn.get_ref()
            .update(location)
            .content(data)
            .await
            .map_err(|e| translate_db_error("update record", e))
    }

    pub async fn delete<T>(&self, location: (&str, &str)) -> AppResult<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let conn = self.get_connection().await?;
        conn.get_ref()
            .delete(location)
            .await
            .context("Failed to delete record")
            .db_err()
    }

    pub async fn select<T>(&self, location: (&str, &str)) -> AppResult<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let conn = self.get_connection().await?;
        conn.get_ref()
            .select(location)
            .await
            .context("Failed to select record")
            .db_err()
    }

    pub fn query(&self, sql: impl Into<String>) -> QueryBuilder<'_> {
        QueryBuilder {
            pool: &self.pool,
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }
}

pub struct QueryBuilder<'a> {
    pool: &'a ConnectionPool,
    sql: String,
    bindings: Vec<(String, serde_json::Value)>,
}

impl<'a> QueryBuilder<'a> {
    pub fn bind(mut self, binding: (impl Into<String>, impl Into<serde_json::Value>)) -> Self {
        self.bindings.push((binding.0.into(), binding.1.into()));
        self
    }

    pub async fn run(self) -> AppResult<QueryResponse> {
        let conn = self.pool.get_connection().await?;
        let mut query = conn.get_ref().query(&self.sql);

        for (name, value) in self.bindings {
            query = query.bind((name, value));
        }

        let response = query.await.context("Failed to execute query").db_err()?;
        Ok(QueryResponse(response))
    }
}

pub struct QueryResponse(surrealdb::Response);

impl QueryResponse {
    pub fn take<T>(&mut self, index: usize) -> AppResult<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.0
            .take(index)
            .map_err(|e| anyhow::anyhow!("Failed to extract query results: {}", e))
            .db_err()
    }
}

/// Typed record CRUD over one table.
pub struct DbService<T> {
    db: Arc<Database>,
    table_name: String,
    _phantom: PhantomData<T>,
}

impl<T> DbService<T>
where
    T: Clone + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static,
{
    pub fn new(db: Arc<Database>, table_name: impl Into<String>) -> Self {
        Self {
            db,
            table_name: table_name.into(),
            _phantom: PhantomData,
        }
    }

    fn contextualize(&self, operation: &str, e: AppError) -> AppError {
        if let AppError::DatabaseError(err) = e {
            AppError::DatabaseError(anyhow::anyhow!(
                "Failed to {} {} record: {}",
                operation,
                self.table_name,
                err
            ))
        } else {
            e
        }
    }

    pub async fn create_record(&self, item: T) -> AppResult<Option<T>> {
        self.db
            .create(&self.table_name, item)
            .await
            .map_err(|e| self.contextualize("create", e))
    }

    pub async fn update_record(&self, record_id: &str, updated_data: T) -> AppResult<Option<T>> {
        self.db
            .update((&self.table_name, record_id), updated_data)
            .await
            .map_err(|e| self.contextualize("update", e))
    }

    pub async fn delete_record(&self, record_id: &str) -> AppResult<Option<T>> {
        self.db
            .delete((&self.table_name, record_id))
            .await
            .map_err(|e| self.contextualize("delete", e))
    }

    pub async fn get_record_by_id(&self, record_id: &str) -> AppResult<Option<T>> {
        self.db
            .select((&self.table_name, record_id))
            .await
            .map_err(|e| self.contextualize("fetch", e))
    }

    // Identifier whitelist; field and table names are never interpolated
    // from request data without passing this.
    fn validate_identifier(&self, identifier: &str) -> AppResult<()> {
        let valid_pattern = regex::Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();

        if !valid_pattern.is_match(identifier) {
            return Err(AppError::validation(format!(
                "Invalid identifier '{}': must start with a letter or underscore and contain only alphanumeric characters and underscores",
                identifier
            )));
        }

        Ok(())
    }

    pub async fn get_records_by_field<V>(&self, field: &str, value: V) -> AppResult<Vec<T>>
    where
        V: Serialize + Send + Sync + 'static,
    {
        self.validate_identifier(field)?;
        self.validate_identifier(&self.table_name)?;

        let sql = format!("SELECT * FROM {} WHERE {} = $value", self.table_name, field);

        let value_json = serde_json::to_value(value).map_err(|e| {
            AppError::validation(format!(
                "Failed to serialize value for field '{}': {}",
                field, e
            ))
        })?;

        let mut response = self
            .db
            .query(&sql)
            .bind(("value", value_json))
            .run()
            .await
            .map_err(|e| self.contextualize("query", e))?;

        response.take(0)
    }

    /// Run a parameterized query returning records of this table's type.
    pub async fn run_custom_query(
        &self,
        sql: &str,
        bindings: Vec<(String, serde_json::Value)>,
    ) -> AppResult<Vec<T>> {
        tracing::debug!("Executing custom query on {}: {}", self.table_name, sql);

        if sql.contains("${") || sql.contains("--") || sql.contains(";") || sql.contains("/*") {
            return Err(AppError::validation(
                "Custom SQL queries must use parameterized queries ($param) for security",
            ));
        }

        let mut query = self.db.query(sql);

        for (name, value) in bindings {
            if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(AppError::validation(format!(
                    "Invalid parameter name '{}': must contain only alphanumeric characters and underscores",
                    name
                )));
            }

            query = query.bind((name, value));
        }

        let mut response = query.run().await.map_err(|e| self.contextualize("query", e))?;
        response.take(0)
    }

    /// Count the records matching a WHERE clause (parameterized).
    pub async fn count_where(
        &self,
        where_clause: &str,
        bindings: Vec<(String, serde_json::Value)>,
    ) -> AppResult<u64> {
        self.validate_identifier(&self.table_name)?;

        let sql = format!(
            "SELECT count() AS count FROM {} WHERE {} GROUP ALL",
            self.table_name, where_clause
        );

        let mut query = self.db.query(&sql);
        for (name, value) in bindings {
            query = query.bind((name, value));
        }

        let mut response = query.run().await.map_err(|e| self.contextualize("count", e))?;
        let rows: Vec<serde_json::Value> = response.take(0)?;

        Ok(rows
            .first()
            .and_then(|v| v.get("count"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }
}
