//! Dispatch jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwatch_core::{AlertId, NotificationLogId, StoreId};

use crate::channel::NotificationChannel;

/// Denormalized alert snapshot carried by every dispatch job, so senders
/// never reach back into the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub alert_id: AlertId,
    pub store_id: StoreId,
    pub shop: String,
    pub inventory_item_id: String,
    pub variant_id: Option<String>,
    pub product_id: Option<String>,
    pub available: i64,
    pub threshold: i64,
    pub occurred_at: DateTime<Utc>,
}

/// One planned delivery attempt for one (alert, channel) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchJob {
    pub channel: NotificationChannel,
    /// Log row this attempt reports into.
    pub log_id: NotificationLogId,
    pub payload: NotificationPayload,
    /// Channel-specific recipients (email addresses for the email channel;
    /// empty for channels that resolve recipients elsewhere).
    pub recipients: Vec<String>,
}
