//! Inventory-level records and the last-writer-wins acceptance rule.
//!
//! Webhook deliveries arrive out of order; the ledger keeps only the record
//! with the most recent **event** timestamp per (store, inventory item,
//! location), never the latest arrival.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwatch_core::StoreId;

/// Inbound inventory-level update (webhook or sync payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLevelUpdate {
    pub shop: String,
    pub inventory_item_id: String,
    pub location_id: String,
    pub available: i64,
    /// Event time reported by the platform, not arrival time.
    pub updated_at: DateTime<Utc>,
    pub variant_id: Option<String>,
    pub product_id: Option<String>,
    pub source: Option<String>,
}

impl InventoryLevelUpdate {
    /// Malformed updates are dropped by the pipeline, never errored:
    /// a webhook retry storm over a bad payload helps nobody.
    pub fn is_well_formed(&self) -> bool {
        !self.inventory_item_id.trim().is_empty() && !self.location_id.trim().is_empty()
    }
}

/// Stored quantity per (store, inventory item, location).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub store_id: StoreId,
    pub inventory_item_id: String,
    pub location_id: String,
    pub available: i64,
    pub updated_at: DateTime<Utc>,
    pub variant_id: Option<String>,
    pub product_id: Option<String>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_synced_at: DateTime<Utc>,
}

/// Last-writer-wins by event time: only a strictly newer `updated_at`
/// replaces the stored record. Equal timestamps keep the existing record,
/// so replays are no-ops.
pub fn should_replace(
    existing_updated_at: Option<DateTime<Utc>>,
    incoming_updated_at: DateTime<Utc>,
) -> bool {
    match existing_updated_at {
        None => true,
        Some(existing) => incoming_updated_at > existing,
    }
}

impl InventoryLevel {
    /// First sighting of a (store, item, location) key.
    pub fn from_update(store_id: StoreId, update: &InventoryLevelUpdate) -> Self {
        let now = Utc::now();
        Self {
            store_id,
            inventory_item_id: update.inventory_item_id.clone(),
            location_id: update.location_id.clone(),
            available: update.available,
            updated_at: update.updated_at,
            variant_id: update.variant_id.clone(),
            product_id: update.product_id.clone(),
            source: update.source.clone(),
            created_at: now,
            last_synced_at: now,
        }
    }

    /// Apply an accepted (strictly newer) update in place. Optional fields
    /// fall back to previously-known values so a sparse webhook payload
    /// cannot erase variant/product attribution.
    pub fn apply_update(&mut self, update: &InventoryLevelUpdate) {
        self.available = update.available;
        self.updated_at = update.updated_at;
        if update.variant_id.is_some() {
            self.variant_id = update.variant_id.clone();
        }
        if update.product_id.is_some() {
            self.product_id = update.product_id.clone();
        }
        if update.source.is_some() {
            self.source = update.source.clone();
        }
        self.last_synced_at = Utc::now();
    }
}
