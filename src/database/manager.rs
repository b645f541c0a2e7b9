use std::time::{Duration, Instant};

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::database::query_builder::{bind_param_query, bind_param_query_as, SqlParam};

/// Errors from the persistence gateway
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    #[error("Row is still referenced through {constraint}")]
    StillReferenced { constraint: String },

    #[error("Check constraint violated: {constraint}")]
    CheckViolation { constraint: String },

    #[error("Value too long: {0}")]
    ValueTooLong(String),

    #[error("Invalid filter: {0}")]
    Filter(#[from] crate::filter::FilterError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.code().as_deref() {
                Some("23505") => return DatabaseError::UniqueViolation { constraint },
                // Postgres reports restricted deletes as "update or delete on table ..."
                Some("23503") if db_err.message().starts_with("update or delete") => {
                    return DatabaseError::StillReferenced { constraint }
                }
                Some("23503") => return DatabaseError::ForeignKeyViolation { constraint },
                Some("23514") => return DatabaseError::CheckViolation { constraint },
                Some("22001") => return DatabaseError::ValueTooLong(db_err.message().to_string()),
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

impl DatabaseError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation { .. })
    }
}

/// Pooled query executor shared by every repository.
///
/// Cloning is cheap; all clones share the same pool. Every statement is
/// logged with its duration and row count.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
    log_queries: bool,
    slow_query: Duration,
}

impl Database {
    /// Open the pool and verify connectivity
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if config.url.is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        info!("Connected to database {}", redact_url(&config.url)?);
        Ok(Self::from_pool(pool, config))
    }

    /// Build the pool without opening a connection until first use
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if config.url.is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(&config.url)?;

        Ok(Self::from_pool(pool, config))
    }

    fn from_pool(pool: PgPool, config: &DatabaseConfig) -> Self {
        Self {
            pool,
            log_queries: config.enable_query_logging,
            slow_query: Duration::from_millis(config.slow_query_threshold_ms),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, DatabaseError> {
        Ok(self.pool.begin().await?)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool on shutdown
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    pub async fn fetch_all<T>(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.fetch_all_on(&self.pool, sql, params).await
    }

    pub async fn fetch_optional<T>(&self, sql: &str, params: &[SqlParam]) -> Result<Option<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.fetch_optional_on(&self.pool, sql, params).await
    }

    pub async fn fetch_one<T>(&self, sql: &str, params: &[SqlParam]) -> Result<T, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.fetch_one_on(&self.pool, sql, params).await
    }

    pub async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64, DatabaseError> {
        self.execute_on(&self.pool, sql, params).await
    }

    pub async fn fetch_all_on<'c, E, T>(
        &self,
        executor: E,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Vec<T>, DatabaseError>
    where
        E: PgExecutor<'c>,
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let started = Instant::now();
        let mut q = sqlx::query_as::<_, T>(sql);
        for p in params {
            q = bind_param_query_as(q, p);
        }
        let result = q.fetch_all(executor).await;
        self.log_statement(sql, started, result.as_ref().map(|rows| rows.len() as u64));
        Ok(result?)
    }

    pub async fn fetch_optional_on<'c, E, T>(
        &self,
        executor: E,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Option<T>, DatabaseError>
    where
        E: PgExecutor<'c>,
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let started = Instant::now();
        let mut q = sqlx::query_as::<_, T>(sql);
        for p in params {
            q = bind_param_query_as(q, p);
        }
        let result = q.fetch_optional(executor).await;
        self.log_statement(sql, started, result.as_ref().map(|row| row.is_some() as u64));
        Ok(result?)
    }

    pub async fn fetch_one_on<'c, E, T>(
        &self,
        executor: E,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<T, DatabaseError>
    where
        E: PgExecutor<'c>,
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let started = Instant::now();
        let mut q = sqlx::query_as::<_, T>(sql);
        for p in params {
            q = bind_param_query_as(q, p);
        }
        let result = q.fetch_one(executor).await;
        self.log_statement(sql, started, result.as_ref().map(|_| 1));
        Ok(result?)
    }

    pub async fn execute_on<'c, E>(&self, executor: E, sql: &str, params: &[SqlParam]) -> Result<u64, DatabaseError>
    where
        E: PgExecutor<'c>,
    {
        let started = Instant::now();
        let mut q = sqlx::query(sql);
        for p in params {
            q = bind_param_query(q, p);
        }
        let result = q.execute(executor).await.map(|done| done.rows_affected());
        self.log_statement(sql, started, result.as_ref().copied());
        Ok(result?)
    }

    fn log_statement(&self, sql: &str, started: Instant, outcome: Result<u64, &sqlx::Error>) {
        let elapsed = started.elapsed();
        let statement = compact_sql(sql);

        match outcome {
            Ok(rows) => {
                if elapsed >= self.slow_query {
                    warn!(duration_ms = elapsed.as_millis() as u64, rows, "slow query: {}", statement);
                } else if self.log_queries {
                    debug!(duration_ms = elapsed.as_millis() as u64, rows, "query: {}", statement);
                }
            }
            Err(sqlx::Error::Database(db_err)) => {
                warn!(
                    duration_ms = elapsed.as_millis() as u64,
                    code = db_err.code().as_deref().unwrap_or(""),
                    constraint = db_err.constraint().unwrap_or(""),
                    "query failed: {}: {}",
                    statement,
                    db_err.message()
                );
            }
            Err(e) => {
                warn!(duration_ms = elapsed.as_millis() as u64, "query failed: {}: {}", statement, e);
            }
        }
    }
}

/// Collapse whitespace so multi-line statements log on one line
fn compact_sql(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Connection string with the password removed, for logging
pub fn redact_url(raw: &str) -> Result<String, DatabaseError> {
    let mut url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    if url.password().is_some() {
        url.set_password(None).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    }
    Ok(url.to_string())
}
