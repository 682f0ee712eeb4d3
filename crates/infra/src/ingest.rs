//! Inventory ingest pipeline.
//!
//! One inbound inventory-level update flows through: validation → tenant
//! resolution → ledger upsert-if-newer → threshold evaluation → alert
//! enqueue/clear. Malformed and stale events short-circuit without error.

use std::sync::Arc;

use tracing::{debug, info, warn};

use stockwatch_alerts::{InventoryLevelUpdate, LowStockAlert, ThresholdAction, evaluate};

use crate::stores::{
    AlertStore, CreateOutcome, InventoryLedger, SettingsStore, StoreDirectory, StoreResult,
};

/// Outcome of one inventory-level ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Malformed event, dropped without error.
    Dropped,
    /// Event time not newer than the stored record; ignored.
    Stale,
    /// Downward crossing created a new ready alert.
    Enqueued(LowStockAlert),
    /// Crossing observed but an active alert already covers the item.
    AlreadyActive(LowStockAlert),
    /// Stock above threshold; n active alerts were closed.
    Cleared(usize),
    /// No transition (already-low stock staying low).
    Unchanged,
}

impl IngestOutcome {
    /// Whether a dispatch pass right after this ingestion could find work.
    pub fn leaves_ready_alert(&self) -> bool {
        matches!(
            self,
            IngestOutcome::Enqueued(_) | IngestOutcome::AlreadyActive(_)
        )
    }
}

/// The ingest service. Holds the stores it coordinates; all mutation goes
/// through their operations.
pub struct InventoryIngest {
    directory: Arc<dyn StoreDirectory>,
    ledger: Arc<dyn InventoryLedger>,
    alerts: Arc<dyn AlertStore>,
    settings: Arc<dyn SettingsStore>,
}

impl InventoryIngest {
    pub fn new(
        directory: Arc<dyn StoreDirectory>,
        ledger: Arc<dyn InventoryLedger>,
        alerts: Arc<dyn AlertStore>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            directory,
            ledger,
            alerts,
            settings,
        }
    }

    /// Process one inventory-level update.
    ///
    /// Returns `Err` only for storage failures; every data-shaped problem
    /// resolves to an [`IngestOutcome`].
    pub async fn ingest(&self, update: &InventoryLevelUpdate) -> StoreResult<IngestOutcome> {
        if !update.is_well_formed() {
            warn!(
                shop = %update.shop,
                inventory_item_id = %update.inventory_item_id,
                location_id = %update.location_id,
                "dropping malformed inventory update"
            );
            return Ok(IngestOutcome::Dropped);
        }

        let store = self.directory.ensure(&update.shop).await?;
        let upsert = self.ledger.upsert(&store, update).await?;
        if !upsert.accepted {
            debug!(
                shop = %update.shop,
                inventory_item_id = %update.inventory_item_id,
                "ignoring stale inventory update"
            );
            return Ok(IngestOutcome::Stale);
        }

        let settings = self.settings.get(store.id).await?;
        let action = evaluate(
            update.available,
            settings.global_threshold,
            upsert.previous_available,
        );

        match action {
            ThresholdAction::Clear => {
                let cleared = self
                    .alerts
                    .clear_active(store.id, &update.inventory_item_id)
                    .await?;
                if cleared > 0 {
                    info!(
                        shop = %update.shop,
                        inventory_item_id = %update.inventory_item_id,
                        cleared,
                        "stock recovered, cleared active alerts"
                    );
                }
                Ok(IngestOutcome::Cleared(cleared))
            }
            ThresholdAction::Enqueue => {
                let alert = LowStockAlert::new(
                    store.id,
                    update.inventory_item_id.clone(),
                    upsert.level.variant_id.clone(),
                    upsert.level.product_id.clone(),
                    update.available,
                    settings.global_threshold,
                );

                match self.alerts.create_if_absent(alert).await? {
                    CreateOutcome::Created(alert) => {
                        info!(
                            shop = %update.shop,
                            inventory_item_id = %update.inventory_item_id,
                            available = update.available,
                            threshold = settings.global_threshold,
                            alert_id = %alert.id,
                            "low stock crossing, alert queued"
                        );
                        Ok(IngestOutcome::Enqueued(alert))
                    }
                    CreateOutcome::Existing(alert) => Ok(IngestOutcome::AlreadyActive(alert)),
                }
            }
            ThresholdAction::Noop => Ok(IngestOutcome::Unchanged),
        }
    }
}
