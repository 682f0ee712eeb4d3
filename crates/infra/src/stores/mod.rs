//! Persistence abstractions.
//!
//! The pipeline talks to storage through the traits in [`traits`]; the
//! in-memory implementation in [`memory`] backs tests, development and the
//! reference binary. Durable backends implement the same traits.

pub mod memory;
pub mod traits;

use thiserror::Error;

pub use memory::InMemoryStore;
pub use traits::{
    AlertStore, CreateOutcome, InventoryLedger, LedgerUpsert, NotificationLogStore, SettingsStore,
    StoreDirectory, StoreRecord,
};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
///
/// Infrastructure failures only. Domain-level "absence" (no store for a
/// shop, no alert with an id) is modelled as `Ok(None)`/empty results, not
/// as an error: a shop is lazily created on its first inventory event.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A record that must exist for the operation to proceed is missing.
    #[error("record not found")]
    NotFound,

    /// A uniqueness or state precondition failed.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing storage failed (connection, corruption, timeout).
    #[error("storage failure: {0}")]
    Storage(String),
}
