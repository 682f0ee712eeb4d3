//! In-memory persistence for tests, development and the reference binary.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use stockwatch_alerts::{
    AlertIntent, AlertStatus, InventoryLevel, InventoryLevelUpdate, LowStockAlert, ShopSettings,
    level,
};
use stockwatch_core::{AlertId, NotificationLogId, StoreId};
use stockwatch_dispatch::{NotificationChannel, NotificationLog};

use super::traits::{
    AlertStore, CreateOutcome, InventoryLedger, LedgerUpsert, NotificationLogStore, SettingsStore,
    StoreDirectory, StoreRecord,
};
use super::{StoreError, StoreResult};

/// One struct backs every store trait, mirroring a single database handle.
///
/// Each table sits behind its own lock; no method holds a lock across an
/// await. `create_if_absent` does its check-and-create inside one write
/// guard, which is this backend's serialization point for the
/// at-most-one-active-alert invariant.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    stores: RwLock<HashMap<String, StoreRecord>>,
    levels: RwLock<HashMap<(StoreId, String, String), InventoryLevel>>,
    alerts: RwLock<Vec<LowStockAlert>>,
    logs: RwLock<Vec<NotificationLog>>,
    settings: RwLock<HashMap<StoreId, ShopSettings>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait::async_trait]
impl StoreDirectory for InMemoryStore {
    async fn ensure(&self, shop: &str) -> StoreResult<StoreRecord> {
        let mut stores = self.stores.write().unwrap();
        let record = stores
            .entry(shop.to_string())
            .or_insert_with(|| StoreRecord::new(shop));
        Ok(record.clone())
    }

    async fn find(&self, shop: &str) -> StoreResult<Option<StoreRecord>> {
        let stores = self.stores.read().unwrap();
        Ok(stores.get(shop).cloned())
    }
}

#[async_trait::async_trait]
impl InventoryLedger for InMemoryStore {
    async fn upsert(
        &self,
        store: &StoreRecord,
        update: &InventoryLevelUpdate,
    ) -> StoreResult<LedgerUpsert> {
        let key = (
            store.id,
            update.inventory_item_id.clone(),
            update.location_id.clone(),
        );

        let mut levels = self.levels.write().unwrap();
        match levels.get_mut(&key) {
            Some(existing) => {
                if !level::should_replace(Some(existing.updated_at), update.updated_at) {
                    return Ok(LedgerUpsert {
                        level: existing.clone(),
                        previous_available: Some(existing.available),
                        accepted: false,
                    });
                }
                let previous = existing.available;
                existing.apply_update(update);
                Ok(LedgerUpsert {
                    level: existing.clone(),
                    previous_available: Some(previous),
                    accepted: true,
                })
            }
            None => {
                let record = InventoryLevel::from_update(store.id, update);
                levels.insert(key, record.clone());
                Ok(LedgerUpsert {
                    level: record,
                    previous_available: None,
                    accepted: true,
                })
            }
        }
    }

    async fn get(
        &self,
        store_id: StoreId,
        inventory_item_id: &str,
        location_id: &str,
    ) -> StoreResult<Option<InventoryLevel>> {
        let levels = self.levels.read().unwrap();
        Ok(levels
            .get(&(
                store_id,
                inventory_item_id.to_string(),
                location_id.to_string(),
            ))
            .cloned())
    }
}

#[async_trait::async_trait]
impl AlertStore for InMemoryStore {
    async fn create_if_absent(&self, alert: LowStockAlert) -> StoreResult<CreateOutcome> {
        let mut alerts = self.alerts.write().unwrap();

        if let Some(existing) = alerts
            .iter()
            .find(|a| {
                a.store_id == alert.store_id
                    && a.inventory_item_id == alert.inventory_item_id
                    && a.is_active()
            })
        {
            return Ok(CreateOutcome::Existing(existing.clone()));
        }

        alerts.push(alert.clone());
        Ok(CreateOutcome::Created(alert))
    }

    async fn clear_active(
        &self,
        store_id: StoreId,
        inventory_item_id: &str,
    ) -> StoreResult<usize> {
        let mut alerts = self.alerts.write().unwrap();
        let mut cleared = 0;
        for alert in alerts.iter_mut() {
            if alert.store_id == store_id
                && alert.inventory_item_id == inventory_item_id
                && alert.is_active()
            {
                alert.transition(AlertStatus::Cleared);
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn list(
        &self,
        store_id: StoreId,
        statuses: Option<&[AlertStatus]>,
        search: Option<&str>,
    ) -> StoreResult<Vec<LowStockAlert>> {
        let alerts = self.alerts.read().unwrap();
        let mut result: Vec<_> = alerts
            .iter()
            .filter(|a| a.store_id == store_id)
            .filter(|a| statuses.is_none_or(|s| s.contains(&a.status)))
            .filter(|a| search.is_none_or(|term| a.matches_search(term)))
            .cloned()
            .collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn list_ready(&self, store_id: StoreId) -> StoreResult<Vec<LowStockAlert>> {
        let alerts = self.alerts.read().unwrap();
        let mut result: Vec<_> = alerts
            .iter()
            .filter(|a| a.store_id == store_id && a.status == AlertStatus::Ready)
            .cloned()
            .collect();

        result.sort_by_key(|a| a.created_at);
        Ok(result)
    }

    async fn get(
        &self,
        store_id: StoreId,
        alert_id: AlertId,
    ) -> StoreResult<Option<LowStockAlert>> {
        let alerts = self.alerts.read().unwrap();
        Ok(alerts
            .iter()
            .find(|a| a.id == alert_id && a.store_id == store_id)
            .cloned())
    }

    async fn apply_intent(
        &self,
        store_id: StoreId,
        alert_id: AlertId,
        intent: AlertIntent,
    ) -> StoreResult<Option<LowStockAlert>> {
        let mut alerts = self.alerts.write().unwrap();
        let Some(alert) = alerts
            .iter_mut()
            .find(|a| a.id == alert_id && a.store_id == store_id)
        else {
            return Ok(None);
        };

        if let Some(next) = alert.status.after_intent(intent) {
            alert.transition(next);
        }
        Ok(Some(alert.clone()))
    }

    async fn set_status(&self, alert_id: AlertId, status: AlertStatus) -> StoreResult<()> {
        let mut alerts = self.alerts.write().unwrap();
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or(StoreError::NotFound)?;
        alert.transition(status);
        Ok(())
    }
}

#[async_trait::async_trait]
impl NotificationLogStore for InMemoryStore {
    async fn find_latest(
        &self,
        alert_id: AlertId,
        channel: NotificationChannel,
    ) -> StoreResult<Option<NotificationLog>> {
        let logs = self.logs.read().unwrap();
        Ok(logs
            .iter()
            .filter(|l| l.alert_id == alert_id && l.channel == channel)
            .max_by_key(|l| l.updated_at)
            .cloned())
    }

    async fn create(&self, log: NotificationLog) -> StoreResult<NotificationLog> {
        let mut logs = self.logs.write().unwrap();
        logs.push(log.clone());
        Ok(log)
    }

    async fn requeue(&self, log_id: NotificationLogId) -> StoreResult<NotificationLog> {
        self.mutate_log(log_id, NotificationLog::requeue)
    }

    async fn record_sent(
        &self,
        log_id: NotificationLogId,
        provider_message_id: Option<String>,
    ) -> StoreResult<NotificationLog> {
        self.mutate_log(log_id, |log| log.record_sent(provider_message_id.clone()))
    }

    async fn record_failure(
        &self,
        log_id: NotificationLogId,
        error: &str,
    ) -> StoreResult<NotificationLog> {
        self.mutate_log(log_id, |log| log.record_failure(error))
    }

    async fn reset_for_alert(&self, alert_id: AlertId) -> StoreResult<usize> {
        let mut logs = self.logs.write().unwrap();
        let mut reset = 0;
        for log in logs.iter_mut().filter(|l| l.alert_id == alert_id) {
            log.reset();
            reset += 1;
        }
        Ok(reset)
    }

    async fn list_recent(
        &self,
        store_id: StoreId,
        limit: usize,
    ) -> StoreResult<Vec<NotificationLog>> {
        let logs = self.logs.read().unwrap();
        let mut result: Vec<_> = logs
            .iter()
            .filter(|l| l.store_id == store_id)
            .cloned()
            .collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result.truncate(limit);
        Ok(result)
    }
}

impl InMemoryStore {
    fn mutate_log(
        &self,
        log_id: NotificationLogId,
        mutate: impl Fn(&mut NotificationLog),
    ) -> StoreResult<NotificationLog> {
        let mut logs = self.logs.write().unwrap();
        let log = logs
            .iter_mut()
            .find(|l| l.id == log_id)
            .ok_or(StoreError::NotFound)?;
        mutate(log);
        Ok(log.clone())
    }
}

#[async_trait::async_trait]
impl SettingsStore for InMemoryStore {
    async fn get(&self, store_id: StoreId) -> StoreResult<ShopSettings> {
        let settings = self.settings.read().unwrap();
        Ok(settings.get(&store_id).cloned().unwrap_or_default())
    }

    async fn save(&self, store_id: StoreId, settings: &ShopSettings) -> StoreResult<()> {
        let mut map = self.settings.write().unwrap();
        map.insert(store_id, settings.clone());
        Ok(())
    }
}
