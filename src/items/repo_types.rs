use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Which feed an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Lost,
    Found,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Lost => "lost",
            ItemStatus::Found => "found",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Exact match only: the feed filters on equality, so "Lost" or "lost " never match.
impl FromStr for ItemStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lost" => Ok(ItemStatus::Lost),
            "found" => Ok(ItemStatus::Found),
            other => Err(AppError::Validation(format!(
                "unknown status \"{}\" (expected \"lost\" or \"found\")",
                other
            ))),
        }
    }
}

/// A row as stored, status still raw text.
#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub posted_by: String,
    pub photo_url: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: ItemStatus,
    pub posted_by: String,
    /// Empty when the item was posted without a photo.
    pub photo_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<ItemRow> for Item {
    type Error = AppError;

    fn try_from(r: ItemRow) -> Result<Self, Self::Error> {
        let status = r.status.parse::<ItemStatus>().map_err(|_| {
            AppError::Store(format!("item {} has unexpected status \"{}\"", r.id, r.status))
        })?;
        Ok(Self {
            id: r.id,
            title: r.title,
            description: r.description,
            status,
            posted_by: r.posted_by,
            photo_url: r.photo_url,
            created_at: r.created_at,
        })
    }
}

/// Fields supplied by the poster; id and created_at come from the store.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub status: ItemStatus,
    pub posted_by: String,
    pub photo_url: Option<String>,
}

impl NewItem {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::Validation("description is required".into()));
        }
        if self.posted_by.trim().is_empty() {
            return Err(AppError::Validation("posted_by is required".into()));
        }
        Ok(())
    }
}
