//! Service wiring for the HTTP layer.

use std::sync::Arc;

use stockwatch_dispatch::{ChannelSender, ConsoleEmailProvider, EmailSender, NotificationChannel};
use stockwatch_infra::{
    AlertStore, InMemoryStore, InventoryIngest, NotificationDispatcher, NotificationLogStore,
    RateLimiter, SettingsStore, StoreDirectory,
};

/// Shared application services, injected into handlers via `Extension`.
pub struct AppServices {
    pub directory: Arc<dyn StoreDirectory>,
    pub alerts: Arc<dyn AlertStore>,
    pub logs: Arc<dyn NotificationLogStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub ingest: InventoryIngest,
    pub dispatcher: NotificationDispatcher,
    /// Registered channel senders; a planned channel without one fails in
    /// place rather than aborting a batch.
    pub senders: Vec<Arc<dyn ChannelSender>>,
    /// Channels fanned out on dispatch.
    pub channels: Vec<NotificationChannel>,
    pub webhook_limiter: RateLimiter,
}

/// Wire the in-memory reference stack: one store backing every trait and the
/// console email provider as the only registered sender. Durable backends
/// swap in here without touching routes.
pub fn build_services() -> AppServices {
    let db = InMemoryStore::arc();

    let from = std::env::var("STOCKWATCH_EMAIL_FROM").ok();
    let email: Arc<dyn ChannelSender> = Arc::new(EmailSender::new(ConsoleEmailProvider, from));

    AppServices {
        directory: db.clone(),
        alerts: db.clone(),
        logs: db.clone(),
        settings: db.clone(),
        ingest: InventoryIngest::new(db.clone(), db.clone(), db.clone(), db.clone()),
        dispatcher: NotificationDispatcher::new(db.clone(), db.clone()),
        senders: vec![email],
        channels: vec![NotificationChannel::Email],
        webhook_limiter: RateLimiter::default(),
    }
}
