use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Item, ItemStatus};
use super::services::SubmissionState;

/// One item as shown in a feed.
#[derive(Debug, Serialize)]
pub struct ItemCard {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub description: String,
    pub posted_by: String,
    pub status: ItemStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub posted_at: String,
    /// `mailto:` link addressed to the poster.
    pub contact: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum FeedView {
    Items {
        status: ItemStatus,
        summary: String,
        items: Vec<ItemCard>,
    },
    Empty {
        status: ItemStatus,
        message: String,
    },
    Error {
        status: ItemStatus,
        message: String,
    },
}

#[derive(Debug, Serialize)]
pub struct FeedLinks {
    pub lost: String,
    pub found: String,
}

impl Default for FeedLinks {
    fn default() -> Self {
        Self {
            lost: feed_path(ItemStatus::Lost),
            found: feed_path(ItemStatus::Found),
        }
    }
}

pub fn feed_path(status: ItemStatus) -> String {
    format!("/api/v1/items/{}", status)
}

/// What the form holds after a submission attempt.
#[derive(Debug, Serialize)]
pub struct FormSnapshot {
    pub state: SubmissionState,
    pub title: String,
    pub description: String,
    pub status: ItemStatus,
    pub posted_by: String,
    pub has_photo: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub message: String,
    pub item: Item,
    pub links: FeedLinks,
    pub form: FormSnapshot,
}
