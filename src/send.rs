//! Pushing admin-held items into the retail catalog.
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{info, warn};

use crate::admin::model::{ExtItems, Item, SendItemHistory};
use crate::admin::AdminApi;
use crate::cache::EntitySource;
use crate::catalog::model::ExtItemResponse;
use crate::catalog::CatalogApi;
use crate::http::ApiError;
use crate::table::{EntityTable, RowValidator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

/// One line of feedback per item the catalog answered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub item_id: i64,
    pub level: Level,
    pub message: String,
}

impl From<&ExtItemResponse> for Notification {
    fn from(res: &ExtItemResponse) -> Self {
        Self {
            item_id: res.ext_item_id,
            level: if res.succeeded() {
                Level::Success
            } else {
                Level::Error
            },
            message: res.message.clone(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            Level::Success => "ok",
            Level::Error => "error",
        };
        write!(f, "[{tag}] item {}: {}", self.item_id, self.message)
    }
}

/// Last push outcome as shown next to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Sent,
    Failed,
    NotSent,
}

pub fn send_state(item: &Item) -> SendState {
    match item.last_status.as_deref() {
        Some(crate::catalog::model::STATUS_SUCCEEDED) => SendState::Sent,
        Some("Failed") => SendState::Failed,
        _ => SendState::NotSent,
    }
}

/// The item as the catalog expects it: catalog-side bookkeeping dropped and
/// the creation stamp set to `now`.
pub fn outbound_item(item: &Item, now: DateTime<Utc>) -> Item {
    Item {
        sd_item_id: None,
        last_action: None,
        last_status: None,
        created_date: Some(now),
        ..item.clone()
    }
}

pub fn ext_items(head_office_token: &str, items: &[Item], now: DateTime<Utc>) -> ExtItems {
    ExtItems {
        public_key: head_office_token.to_string(),
        ext_items: items.iter().map(|i| outbound_item(i, now)).collect(),
    }
}

/// Post `items` to the catalog, refresh the item grid and report each
/// response. Nothing is sent for an empty selection.
pub async fn send_items<S, V>(
    catalog: &dyn CatalogApi,
    table: &EntityTable<Item, S, V>,
    head_office_token: &str,
    items: &[Item],
) -> Result<Vec<Notification>, ApiError>
where
    S: EntitySource<Item>,
    V: RowValidator<Item>,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let payload = ext_items(head_office_token, items, Utc::now());
    let responses = catalog.post_items(&payload).await;
    // last-sent metadata changes even when some items fail
    table.refresh().await;
    let responses = responses?;

    let notes: Vec<Notification> = responses.iter().map(Notification::from).collect();
    for note in &notes {
        match note.level {
            Level::Success => info!(item_id = note.item_id, message = %note.message, "item sent"),
            Level::Error => warn!(item_id = note.item_id, message = %note.message, "item rejected"),
        }
    }
    Ok(notes)
}

pub async fn last_send_history(
    admin: &dyn AdminApi,
    item_id: i64,
) -> Result<Option<SendItemHistory>, ApiError> {
    admin.last_send_history(item_id).await
}
