//! In-memory pool used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use trainhub_orm::{
    DatabasePool, DatabaseRow, DatabaseValue, FieldType, ModelDefinition, ModelError,
    ModelRegistry, OrmResult,
};
use trainhub_orm::backends::DatabasePoolStats;

/// A row of named values
#[derive(Debug, Clone)]
pub struct MockRow {
    columns: Vec<(String, DatabaseValue)>,
}

impl MockRow {
    pub fn new(columns: Vec<(&str, DatabaseValue)>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }
}

impl DatabaseRow for MockRow {
    fn get_by_index(&self, index: usize) -> OrmResult<DatabaseValue> {
        self.columns
            .get(index)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ModelError::ColumnNotFound(format!("Column at index {} not found", index)))
    }

    fn get_by_name(&self, name: &str) -> OrmResult<DatabaseValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ModelError::ColumnNotFound(format!("Column '{}' not found", name)))
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// A statement the pool was asked to run
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub sql: String,
    pub params: Vec<DatabaseValue>,
}

/// Pool answering data statements with fixed rows and count statements
/// with the number of those rows
#[derive(Default)]
pub struct MockPool {
    rows: Vec<MockRow>,
    fail_when: Option<String>,
    delay: Option<Duration>,
    recorded: Mutex<Vec<Recorded>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockPool {
    pub fn new(rows: Vec<MockRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    /// Fail every statement containing `needle`
    pub fn failing_when<S: Into<String>>(mut self, needle: S) -> Self {
        self.fail_when = Some(needle.into());
        self
    }

    /// Hold every statement for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn run(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<()> {
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(Recorded {
                sql: sql.to_string(),
                params: params.to_vec(),
            });
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.fail_when {
            Some(needle) if sql.contains(needle.as_str()) => Err(ModelError::Database(format!(
                "relation \"{}\" does not exist",
                needle
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl DatabasePool for MockPool {
    async fn fetch_all(
        &self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Vec<Box<dyn DatabaseRow>>> {
        self.run(sql, params).await?;
        Ok(self
            .rows
            .iter()
            .cloned()
            .map(|row| Box::new(row) as Box<dyn DatabaseRow>)
            .collect())
    }

    async fn fetch_optional(
        &self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Option<Box<dyn DatabaseRow>>> {
        self.run(sql, params).await?;
        let count = MockRow::new(vec![("count", DatabaseValue::Int64(self.rows.len() as i64))]);
        Ok(Some(Box::new(count)))
    }

    async fn close(&self) -> OrmResult<()> {
        Ok(())
    }

    fn stats(&self) -> DatabasePoolStats {
        DatabasePoolStats::default()
    }

    async fn health_check(&self) -> OrmResult<Duration> {
        Ok(Duration::ZERO)
    }
}

pub fn training_row(id: i64, title: &str, company: i64) -> MockRow {
    MockRow::new(vec![
        ("id", DatabaseValue::Int64(id)),
        ("title", DatabaseValue::from(title)),
        ("company", DatabaseValue::Int64(company)),
    ])
}

pub fn registry() -> ModelRegistry {
    ModelRegistry::new()
        .with_model(
            ModelDefinition::new("training")
                .field("title", FieldType::String)
                .field("startDate", FieldType::Date)
                .field("cost", FieldType::Float)
                .association("company", "company")
                .association("instructor", "user"),
        )
        .with_model(
            ModelDefinition::new("trainingpresence")
                .field("presence", FieldType::Boolean)
                .association("user", "user")
                .association("training", "training"),
        )
}
