//! PostgreSQL Backend Implementation
//!
//! Implements [`DatabasePool`] on top of a sqlx `PgPool`. Every value is bound
//! as a real statement parameter.

use super::core::*;
use crate::error::{OrmError, OrmResult};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{postgres::PgPoolOptions, Column, Pool, Postgres, Row as SqlxRow, TypeInfo, ValueRef};
use std::sync::Arc;

/// PostgreSQL database backend
#[derive(Debug, Default)]
pub struct PostgresBackend;

impl PostgresBackend {
    pub fn new() -> Self {
        Self
    }

    /// Validate a database URL for this backend
    pub fn validate_database_url(&self, url: &str) -> OrmResult<()> {
        let parsed = url::Url::parse(url)
            .map_err(|e| OrmError::Connection(format!("Invalid database URL: {}", e)))?;

        if parsed.scheme() != "postgresql" && parsed.scheme() != "postgres" {
            return Err(OrmError::Connection(
                "Invalid PostgreSQL URL scheme".to_string(),
            ));
        }

        if parsed.path().trim_start_matches('/').is_empty() {
            return Err(OrmError::Connection(
                "Missing database name in URL".to_string(),
            ));
        }

        Ok(())
    }

    /// Create a connection pool from a database URL
    pub async fn connect(
        &self,
        database_url: &str,
        config: DatabasePoolConfig,
    ) -> OrmResult<Arc<dyn DatabasePool>> {
        self.validate_database_url(database_url)?;

        let mut options = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.acquire_timeout_seconds))
            .test_before_acquire(config.test_before_acquire);

        if let Some(idle_timeout) = config.idle_timeout_seconds {
            options = options.idle_timeout(std::time::Duration::from_secs(idle_timeout));
        }

        if let Some(max_lifetime) = config.max_lifetime_seconds {
            options = options.max_lifetime(std::time::Duration::from_secs(max_lifetime));
        }

        let sqlx_pool = options
            .connect(database_url)
            .await
            .map_err(|e| OrmError::Connection(format!("Failed to create PostgreSQL pool: {}", e)))?;

        tracing::info!(
            max_connections = config.max_connections,
            "PostgreSQL pool created"
        );

        Ok(Arc::new(PostgresPool::new(Arc::new(sqlx_pool))))
    }
}

/// PostgreSQL connection pool implementation
pub struct PostgresPool {
    pool: Arc<Pool<Postgres>>,
}

impl PostgresPool {
    pub fn new(pool: Arc<Pool<Postgres>>) -> Self {
        Self { pool }
    }
}

type PgQuery<'a> = sqlx::query::Query<'a, Postgres, sqlx::postgres::PgArguments>;

fn build_query<'a>(sql: &'a str, params: &[DatabaseValue]) -> OrmResult<PgQuery<'a>> {
    params
        .iter()
        .try_fold(sqlx::query(sql), |query, param| bind_database_value(query, param))
}

#[async_trait]
impl DatabasePool for PostgresPool {
    async fn fetch_all(
        &self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Vec<Box<dyn DatabaseRow>>> {
        let rows = build_query(sql, params)?
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| OrmError::Database(format!("Query fetch failed: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| Box::new(PostgresRow::new(row)) as Box<dyn DatabaseRow>)
            .collect())
    }

    async fn fetch_optional(
        &self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Option<Box<dyn DatabaseRow>>> {
        let row = build_query(sql, params)?
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| OrmError::Database(format!("Query fetch failed: {}", e)))?;

        Ok(row.map(|r| Box::new(PostgresRow::new(r)) as Box<dyn DatabaseRow>))
    }

    async fn close(&self) -> OrmResult<()> {
        self.pool.close().await;
        Ok(())
    }

    fn stats(&self) -> DatabasePoolStats {
        let total = self.pool.size();
        let idle = self.pool.num_idle() as u32;

        DatabasePoolStats {
            total_connections: total,
            idle_connections: idle,
            active_connections: total.saturating_sub(idle),
        }
    }

    async fn health_check(&self) -> OrmResult<std::time::Duration> {
        let start = std::time::Instant::now();

        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| OrmError::Connection(format!("Health check failed: {}", e)))?;

        Ok(start.elapsed())
    }
}

/// PostgreSQL row implementation
pub struct PostgresRow {
    row: sqlx::postgres::PgRow,
}

impl PostgresRow {
    pub fn new(row: sqlx::postgres::PgRow) -> Self {
        Self { row }
    }
}

impl DatabaseRow for PostgresRow {
    fn get_by_index(&self, index: usize) -> OrmResult<DatabaseValue> {
        if index >= self.row.len() {
            return Err(OrmError::ColumnNotFound(format!(
                "Column at index {} not found",
                index
            )));
        }
        postgres_value_to_database_value(&self.row, index)
    }

    fn get_by_name(&self, name: &str) -> OrmResult<DatabaseValue> {
        let index = self
            .row
            .columns()
            .iter()
            .position(|col| col.name() == name)
            .ok_or_else(|| OrmError::ColumnNotFound(format!("Column '{}' not found", name)))?;

        postgres_value_to_database_value(&self.row, index)
    }

    fn column_count(&self) -> usize {
        self.row.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.row
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect()
    }
}

/// Bind a DatabaseValue to a sqlx query
fn bind_database_value<'a>(query: PgQuery<'a>, value: &DatabaseValue) -> OrmResult<PgQuery<'a>> {
    match value {
        DatabaseValue::Null => Ok(query.bind(Option::<String>::None)),
        DatabaseValue::Bool(b) => Ok(query.bind(*b)),
        DatabaseValue::Int32(i) => Ok(query.bind(*i)),
        DatabaseValue::Int64(i) => Ok(query.bind(*i)),
        DatabaseValue::Float32(f) => Ok(query.bind(*f)),
        DatabaseValue::Float64(f) => Ok(query.bind(*f)),
        DatabaseValue::String(s) => Ok(query.bind(s.clone())),
        DatabaseValue::Bytes(b) => Ok(query.bind(b.clone())),
        DatabaseValue::Uuid(u) => Ok(query.bind(*u)),
        DatabaseValue::DateTime(dt) => Ok(query.bind(*dt)),
        DatabaseValue::Date(d) => Ok(query.bind(*d)),
        DatabaseValue::Time(t) => Ok(query.bind(*t)),
        DatabaseValue::Json(j) => Ok(query.bind(j.clone())),
        DatabaseValue::Array(_) => Err(OrmError::Query(
            "Array values must be expanded into one placeholder per element".to_string(),
        )),
    }
}

fn decode<'r, T>(row: &'r sqlx::postgres::PgRow, index: usize, kind: &str) -> OrmResult<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(index)
        .map_err(|e| OrmError::Serialization(format!("Failed to get {} value: {}", kind, e)))
}

/// Convert a PostgreSQL column value to DatabaseValue
fn postgres_value_to_database_value(
    row: &sqlx::postgres::PgRow,
    index: usize,
) -> OrmResult<DatabaseValue> {
    let raw = row
        .try_get_raw(index)
        .map_err(|e| OrmError::Serialization(e.to_string()))?;
    if raw.is_null() {
        return Ok(DatabaseValue::Null);
    }

    let type_name = row.columns()[index].type_info().name().to_string();

    match type_name.as_str() {
        "BOOL" => Ok(DatabaseValue::Bool(decode(row, index, "bool")?)),
        "INT2" => Ok(DatabaseValue::Int32(i32::from(decode::<i16>(row, index, "int16")?))),
        "INT4" => Ok(DatabaseValue::Int32(decode(row, index, "int32")?)),
        "INT8" => Ok(DatabaseValue::Int64(decode(row, index, "int64")?)),
        "FLOAT4" => Ok(DatabaseValue::Float32(decode(row, index, "float32")?)),
        "FLOAT8" => Ok(DatabaseValue::Float64(decode(row, index, "float64")?)),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
            Ok(DatabaseValue::String(decode(row, index, "string")?))
        }
        "BYTEA" => Ok(DatabaseValue::Bytes(decode(row, index, "bytes")?)),
        "UUID" => Ok(DatabaseValue::Uuid(decode(row, index, "UUID")?)),
        "TIMESTAMPTZ" => Ok(DatabaseValue::DateTime(decode(row, index, "datetime")?)),
        "TIMESTAMP" => {
            let naive: chrono::NaiveDateTime = decode(row, index, "timestamp")?;
            Ok(DatabaseValue::DateTime(naive.and_utc()))
        }
        "DATE" => Ok(DatabaseValue::Date(decode(row, index, "date")?)),
        "TIME" => Ok(DatabaseValue::Time(decode(row, index, "time")?)),
        "JSON" | "JSONB" => Ok(DatabaseValue::Json(decode::<JsonValue>(row, index, "JSON")?)),
        _ => {
            // Fallback: try to get as string
            let value: String = row.try_get(index).map_err(|e| {
                OrmError::Serialization(format!(
                    "Failed to get value as string for unknown type '{}': {}",
                    type_name, e
                ))
            })?;
            Ok(DatabaseValue::String(value))
        }
    }
}
