//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;

use crate::domain::entities::{RoutingInfo, RoutingRule};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct LinkRow {
    account_id: String,
    default_destination: String,
    rules: Json<Vec<RoutingRule>>,
}

/// PostgreSQL repository for link routing configuration.
///
/// Rules are stored as an ordered jsonb array; list order is the evaluation
/// order, so no sorting happens on read.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn get_routing_info(&self, link_id: &str) -> Result<Option<RoutingInfo>, AppError> {
        let row: Option<LinkRow> = sqlx::query_as(
            r#"
            SELECT account_id, default_destination, rules
            FROM links
            WHERE code = $1
            "#,
        )
        .bind(link_id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|row| RoutingInfo {
            account_id: row.account_id,
            rules: row.rules.0,
            default_destination: row.default_destination,
        }))
    }
}
