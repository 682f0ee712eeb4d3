//! Store traits.
//!
//! Every method is async: each call is a suspension point against the
//! backing storage. Implementations must be shareable across tasks
//! (`Send + Sync`); mutation goes through these operations only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwatch_alerts::{
    AlertIntent, AlertStatus, InventoryLevel, InventoryLevelUpdate, LowStockAlert, ShopSettings,
};
use stockwatch_core::{AlertId, NotificationLogId, StoreId};
use stockwatch_dispatch::{NotificationChannel, NotificationLog};

use super::StoreResult;

/// Tenant root: one record per shop domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub id: StoreId,
    pub shop: String,
    pub created_at: DateTime<Utc>,
}

impl StoreRecord {
    pub fn new(shop: impl Into<String>) -> Self {
        Self {
            id: StoreId::new(),
            shop: shop.into(),
            created_at: Utc::now(),
        }
    }
}

/// Tenant directory. Shops are lazily created on their first inventory
/// event; nothing registers them up front.
#[async_trait::async_trait]
pub trait StoreDirectory: Send + Sync {
    /// Find or create the store for a shop domain.
    async fn ensure(&self, shop: &str) -> StoreResult<StoreRecord>;

    /// Find an existing store. `None` means "no such shop yet" and callers
    /// treat it as an empty tenant, not an error.
    async fn find(&self, shop: &str) -> StoreResult<Option<StoreRecord>>;
}

/// Result of a ledger upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerUpsert {
    /// The record now stored for the key.
    pub level: InventoryLevel,
    /// Available quantity before this call; `None` on first sighting.
    pub previous_available: Option<i64>,
    /// Whether the update replaced the stored record. `false` means the
    /// incoming event time was not strictly newer (stale delivery).
    pub accepted: bool,
}

/// Current available-quantity ledger, keyed by
/// (store, inventory item, location).
#[async_trait::async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Upsert-if-newer with "return previous value" semantics.
    ///
    /// Last-writer-wins by event timestamp, not arrival order: a stale
    /// update leaves the record untouched and reports `accepted: false`.
    async fn upsert(
        &self,
        store: &StoreRecord,
        update: &InventoryLevelUpdate,
    ) -> StoreResult<LedgerUpsert>;

    async fn get(
        &self,
        store_id: StoreId,
        inventory_item_id: &str,
        location_id: &str,
    ) -> StoreResult<Option<InventoryLevel>>;
}

/// Outcome of a conditional alert create.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(LowStockAlert),
    /// An active alert already covered the item; no mutation happened.
    Existing(LowStockAlert),
}

impl CreateOutcome {
    pub fn into_alert(self) -> LowStockAlert {
        match self {
            CreateOutcome::Created(a) | CreateOutcome::Existing(a) => a,
        }
    }
}

/// Alert persistence with the at-most-one-active-alert guarantee.
#[async_trait::async_trait]
pub trait AlertStore: Send + Sync {
    /// Create a `ready` alert unless an active (`ready`/`sent`) one already
    /// exists for (store, inventory item).
    ///
    /// Check-and-create must be a single serialization point per key: a
    /// unique partial index or equivalent conditional write in durable
    /// backends, one write-lock section in memory. A plain read-then-write
    /// has a race window under concurrent webhook delivery for the same
    /// item.
    async fn create_if_absent(&self, alert: LowStockAlert) -> StoreResult<CreateOutcome>;

    /// Close every active alert for the item (bulk status update to
    /// `cleared`, preserving history). Returns how many were closed.
    async fn clear_active(
        &self,
        store_id: StoreId,
        inventory_item_id: &str,
    ) -> StoreResult<usize>;

    /// Filtered listing, newest first. `statuses` narrows by status set;
    /// `search` is a substring match over item/product/variant identifiers.
    async fn list(
        &self,
        store_id: StoreId,
        statuses: Option<&[AlertStatus]>,
        search: Option<&str>,
    ) -> StoreResult<Vec<LowStockAlert>>;

    /// Ready alerts in creation order (the dispatch order).
    async fn list_ready(&self, store_id: StoreId) -> StoreResult<Vec<LowStockAlert>>;

    async fn get(&self, store_id: StoreId, alert_id: AlertId)
    -> StoreResult<Option<LowStockAlert>>;

    /// Apply a guarded user intent. Invalid-state intents are no-ops that
    /// return the unchanged alert; an unknown alert returns `None`.
    async fn apply_intent(
        &self,
        store_id: StoreId,
        alert_id: AlertId,
        intent: AlertIntent,
    ) -> StoreResult<Option<LowStockAlert>>;

    /// Unguarded transition used by dispatch reconciliation.
    async fn set_status(&self, alert_id: AlertId, status: AlertStatus) -> StoreResult<()>;
}

/// Append-and-update store for per-channel delivery logs.
#[async_trait::async_trait]
pub trait NotificationLogStore: Send + Sync {
    /// Most recent log for (alert, channel), if any.
    async fn find_latest(
        &self,
        alert_id: AlertId,
        channel: NotificationChannel,
    ) -> StoreResult<Option<NotificationLog>>;

    async fn create(&self, log: NotificationLog) -> StoreResult<NotificationLog>;

    /// Reset to `queued` without touching the attempt counter.
    async fn requeue(&self, log_id: NotificationLogId) -> StoreResult<NotificationLog>;

    /// Record a successful delivery; increments attempts.
    async fn record_sent(
        &self,
        log_id: NotificationLogId,
        provider_message_id: Option<String>,
    ) -> StoreResult<NotificationLog>;

    /// Record a failed delivery; increments attempts.
    async fn record_failure(
        &self,
        log_id: NotificationLogId,
        error: &str,
    ) -> StoreResult<NotificationLog>;

    /// Re-open every lineage for an alert (queued, attempts zeroed).
    /// Backs the resend intent: without it the planner would keep skipping
    /// channels that delivered in the previous episode. Returns how many
    /// logs were reset.
    async fn reset_for_alert(&self, alert_id: AlertId) -> StoreResult<usize>;

    /// Recent logs for a store, newest first.
    async fn list_recent(&self, store_id: StoreId, limit: usize)
    -> StoreResult<Vec<NotificationLog>>;
}

/// Per-shop settings persistence.
#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    /// Settings for a store; defaults when none were saved yet.
    async fn get(&self, store_id: StoreId) -> StoreResult<ShopSettings>;

    async fn save(&self, store_id: StoreId, settings: &ShopSettings) -> StoreResult<()>;
}
