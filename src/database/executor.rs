use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row};
use std::time::Instant;
use tracing::debug;

use super::manager::{DatabaseError, DatabaseManager};
use crate::config::DatabaseConfig;
use crate::predicate::SqlResult;

/// Executes assembled statements. The predicate compilers never call this;
/// only the request handlers do, after access has been decided.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn fetch_rows(&self, sql: &SqlResult) -> Result<Vec<Value>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Postgres executor that returns each row as a JSON object.
pub struct PgExecutor {
    pool: PgPool,
    query_logging: bool,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, query_logging: false }
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::connect_lazy(config)?;
        Ok(Self {
            pool,
            query_logging: config.enable_query_logging,
        })
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn fetch_rows(&self, sql: &SqlResult) -> Result<Vec<Value>, DatabaseError> {
        let wrapped = format!("SELECT row_to_json(q) AS row FROM ({}) q", sql.query);

        let mut q = sqlx::query(&wrapped);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }

        let started = Instant::now();
        let rows = q.fetch_all(&self.pool).await?;
        if self.query_logging {
            debug!(rows = rows.len(), elapsed_ms = started.elapsed().as_millis() as u64, "executed query");
        }

        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(DatabaseError::from))
            .collect()
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // Compilers only bind scalars
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
