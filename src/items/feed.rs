use std::collections::BTreeMap;

use time::{macros::format_description, OffsetDateTime, UtcOffset};
use tracing::{debug, error, info, instrument, warn};

use super::dto::{FeedView, ItemCard};
use super::repo::ItemStore;
use super::repo_types::{Item, ItemRow, ItemStatus};

/// Count of each raw status value, keyed by its quoted form so stray
/// whitespace and casing stay visible in logs.
pub fn status_distribution(rows: &[ItemRow]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(format!("\"{}\"", row.status)).or_insert(0) += 1;
    }
    counts
}

pub fn format_posted_at(ts: OffsetDateTime) -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute] UTC");
    let utc = ts.to_offset(UtcOffset::UTC);
    utc.format(&fmt).unwrap_or_else(|_| utc.to_string())
}

pub fn contact_link(item: &Item) -> String {
    let subject = format!("I saw your {} item on WatFind", item.status);
    let body = format!(
        "Hi, I saw your post about \"{}\" on WatFind. I wanted to reach out about it.",
        item.title
    );
    format!(
        "mailto:{}?subject={}&body={}",
        item.posted_by,
        urlencoding::encode(&subject),
        urlencoding::encode(&body)
    )
}

impl From<Item> for ItemCard {
    fn from(item: Item) -> Self {
        let contact = contact_link(&item);
        let posted_at = format_posted_at(item.created_at);
        Self {
            id: item.id,
            photo_url: Some(item.photo_url).filter(|u| !u.is_empty()),
            title: item.title,
            description: item.description,
            posted_by: item.posted_by,
            status: item.status,
            created_at: item.created_at,
            posted_at,
            contact,
        }
    }
}

async fn log_diagnostics(store: &dyn ItemStore, status: ItemStatus) {
    match store.list_all().await {
        Ok(rows) if rows.is_empty() => warn!("no items in the store at all"),
        Ok(rows) => {
            let distribution = status_distribution(&rows);
            debug!(
                looking_for = %status,
                total = rows.len(),
                ?distribution,
                "status values present in store"
            );
        }
        Err(e) => warn!(error = %e, "diagnostic scan of all items failed"),
    }
}

/// Builds the feed for one status, newest first.
///
/// With `verbose` set, every item is scanned first and the status distribution
/// logged; that scan never affects what is returned.
#[instrument(skip(store))]
pub async fn render_feed(store: &dyn ItemStore, status: ItemStatus, verbose: bool) -> FeedView {
    if verbose {
        log_diagnostics(store, status).await;
    }

    let items = match store.list_by_status(status).await {
        Ok(items) => items,
        Err(e) => {
            error!(error = %e, "feed query failed");
            return FeedView::Error {
                status,
                message: e.to_string(),
            };
        }
    };

    info!(count = items.len(), "feed loaded");
    if items.is_empty() {
        return FeedView::Empty {
            status,
            message: format!("No {} items found", status),
        };
    }

    let summary = format!(
        "Showing {} {} item{}",
        items.len(),
        status,
        if items.len() == 1 { "" } else { "s" }
    );
    FeedView::Items {
        status,
        summary,
        items: items.into_iter().map(ItemCard::from).collect(),
    }
}
