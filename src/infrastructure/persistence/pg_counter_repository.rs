//! PostgreSQL implementation of the counter snapshot repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::CounterSnapshotRepository;
use crate::error::{AppError, map_sqlx_error};

/// PostgreSQL storage for per-account counter snapshots.
pub struct PgCounterRepository {
    pool: Arc<PgPool>,
}

impl PgCounterRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CounterSnapshotRepository for PgCounterRepository {
    async fn load(&self, account_id: &str) -> Result<u64, AppError> {
        let clicks: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT clicks
            FROM account_counters
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(clicks.unwrap_or(0).max(0) as u64)
    }

    async fn store(&self, account_id: &str, count: u64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO account_counters (account_id, clicks, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (account_id)
            DO UPDATE SET clicks = EXCLUDED.clicks, updated_at = now()
            "#,
        )
        .bind(account_id)
        .bind(count as i64)
        .execute(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
