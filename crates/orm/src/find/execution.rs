//! Find execution against a DatabasePool

use serde_json::Value as JsonValue;
use std::time::Instant;

use super::builder::Find;
use super::types::FindOutput;
use crate::backends::{DatabasePool, DatabaseRowExt, DatabaseValue};
use crate::error::{FindResult, ModelError, OrmResult, QueryExecutionError};

impl Find {
    /// Run the rendered statements and collect the result
    ///
    /// Data and count statements run concurrently; the first failure aborts
    /// the whole call. After [`request_total`](Find::request_total) only the
    /// count statement runs.
    pub async fn execute(self, pool: &dyn DatabasePool) -> FindResult<FindOutput> {
        let rendered = self.render();
        let started = Instant::now();

        let output = if self.total_only {
            let count = fetch_count(pool, &rendered.count, &rendered.params).await?;
            FindOutput::Total { count }
        } else {
            let (data, count) = tokio::try_join!(
                fetch_rows(pool, &rendered.query, &rendered.params),
                fetch_count(pool, &rendered.count, &rendered.params),
            )?;
            FindOutput::Page { data, count }
        };

        tracing::debug!(
            model = %self.model_name,
            rows = output.data().len(),
            count = output.count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "List query executed"
        );

        Ok(output)
    }
}

async fn fetch_rows(
    pool: &dyn DatabasePool,
    sql: &str,
    params: &[DatabaseValue],
) -> Result<Vec<JsonValue>, QueryExecutionError> {
    let rows = pool
        .fetch_all(sql, params)
        .await
        .map_err(|e| execution_failed(sql, e))?;

    rows.iter()
        .map(|row| row.to_json())
        .collect::<OrmResult<Vec<_>>>()
        .map_err(|e| execution_failed(sql, e))
}

async fn fetch_count(
    pool: &dyn DatabasePool,
    sql: &str,
    params: &[DatabaseValue],
) -> Result<i64, QueryExecutionError> {
    let row = pool
        .fetch_optional(sql, params)
        .await
        .map_err(|e| execution_failed(sql, e))?;

    match row {
        Some(row) => row.first_i64().map_err(|e| execution_failed(sql, e)),
        None => Ok(0),
    }
}

fn execution_failed(sql: &str, source: ModelError) -> QueryExecutionError {
    tracing::error!(statement = %sql, error = %source, "List query failed");
    QueryExecutionError::new(sql, source)
}
