use axum::async_trait;
use sqlx::PgPool;
use tracing::error;

use super::repo_types::{Item, ItemRow, ItemStatus, NewItem};
use crate::error::AppResult;

/// The `items` table. Reads and writes are single attempts; no retries.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Every row, unordered, status left as stored.
    async fn list_all(&self) -> AppResult<Vec<ItemRow>>;
    /// Rows whose status equals `status`, newest first.
    async fn list_by_status(&self, status: ItemStatus) -> AppResult<Vec<Item>>;
    async fn insert(&self, item: NewItem) -> AppResult<Item>;
}

#[derive(Clone)]
pub struct PgItemStore {
    db: PgPool,
}

impl PgItemStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn list_all(&self) -> AppResult<Vec<ItemRow>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, title, description, status, posted_by, photo_url, created_at
            FROM items
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "list all items failed");
            e
        })?;
        Ok(rows)
    }

    async fn list_by_status(&self, status: ItemStatus) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, title, description, status, posted_by, photo_url, created_at
            FROM items
            WHERE status = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, %status, "list items by status failed");
            e
        })?;

        rows.into_iter().map(Item::try_from).collect()
    }

    async fn insert(&self, item: NewItem) -> AppResult<Item> {
        item.validate()?;

        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO items (title, description, status, posted_by, photo_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, status, posted_by, photo_url, created_at
            "#,
        )
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.status.as_str())
        .bind(&item.posted_by)
        .bind(item.photo_url.unwrap_or_default())
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "insert item failed");
            e
        })?;

        Item::try_from(row)
    }
}
