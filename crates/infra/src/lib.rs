//! Infrastructure layer: persistence abstractions, the inventory ingest
//! pipeline and the notification dispatch engine.

pub mod dispatcher;
pub mod ingest;
pub mod rate_limit;
pub mod stores;


pub use dispatcher::{DispatchOptions, NotificationDispatcher};
pub use ingest::{IngestOutcome, InventoryIngest};
pub use rate_limit::{RateLimitDecision, RateLimiter};
pub use stores::{
    AlertStore, CreateOutcome, InMemoryStore, InventoryLedger, LedgerUpsert, NotificationLogStore,
    SettingsStore, StoreDirectory, StoreError, StoreRecord, StoreResult,
};
