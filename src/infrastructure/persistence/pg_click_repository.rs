//! PostgreSQL implementation of the click repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::NewClick;
use crate::domain::repositories::ClickRepository;
use crate::error::{AppError, map_sqlx_error};

/// PostgreSQL repository for click records.
///
/// The event id is the primary key; `ON CONFLICT DO NOTHING` makes the write
/// idempotent under at-least-once delivery, and `rows_affected` tells the
/// caller whether this delivery was the first.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn upsert(&self, click: &NewClick) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO link_clicks
                (event_id, link_code, account_id, destination, country, latitude, longitude, clicked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(&click.event_id)
        .bind(&click.link_code)
        .bind(&click.account_id)
        .bind(&click.destination)
        .bind(&click.country)
        .bind(click.latitude)
        .bind(click.longitude)
        .bind(click.clicked_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }
}
