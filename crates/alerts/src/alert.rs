//! Low-stock alert lifecycle.
//!
//! One alert represents one low-stock episode for an inventory item. At most
//! one alert per (store, inventory item) may be active (`ready` or `sent`)
//! at any time; enforcing that uniqueness atomically is the alert store's
//! job, the types here only describe the state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwatch_core::{AlertId, DomainError, StoreId};

/// Alert lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Queued for dispatch; not yet delivered on every channel.
    Ready,
    /// Delivered on every planned channel.
    Sent,
    /// Episode closed (stock recovered or user action).
    Cleared,
}

impl AlertStatus {
    /// Active means the episode is still open (`ready` or `sent`).
    pub fn is_active(self) -> bool {
        matches!(self, AlertStatus::Ready | AlertStatus::Sent)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlertStatus::Ready => "ready",
            AlertStatus::Sent => "sent",
            AlertStatus::Cleared => "cleared",
        }
    }

    /// Guarded intent application.
    ///
    /// Returns the target status when the guard passes, `None` when the
    /// intent does not apply from this state. Callers treat `None` as a
    /// no-op (not an error) so user-facing controls stay idempotent under
    /// double submission.
    pub fn after_intent(self, intent: AlertIntent) -> Option<AlertStatus> {
        match intent {
            AlertIntent::Resend if self == AlertStatus::Sent => Some(AlertStatus::Ready),
            AlertIntent::Cancel if self == AlertStatus::Ready => Some(AlertStatus::Cleared),
            AlertIntent::Clear if self != AlertStatus::Cleared => Some(AlertStatus::Cleared),
            _ => None,
        }
    }
}

impl core::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for AlertStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(AlertStatus::Ready),
            "sent" => Ok(AlertStatus::Sent),
            "cleared" => Ok(AlertStatus::Cleared),
            other => Err(DomainError::validation(format!(
                "unknown alert status: {other}"
            ))),
        }
    }
}

/// User-facing alert action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertIntent {
    /// Re-open a sent alert for another delivery pass (sent → ready).
    Resend,
    /// Drop a queued alert before it is delivered (ready → cleared).
    Cancel,
    /// Close the episode whatever its delivery state (ready/sent → cleared).
    Clear,
}

impl core::str::FromStr for AlertIntent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resend" => Ok(AlertIntent::Resend),
            "cancel" => Ok(AlertIntent::Cancel),
            "clear" => Ok(AlertIntent::Clear),
            other => Err(DomainError::validation(format!(
                "unknown alert intent: {other}"
            ))),
        }
    }
}

/// One active or historical low-stock episode for an inventory item.
///
/// `available` and `threshold` are snapshots taken at creation, so the
/// notification always reports the values that triggered it even if stock
/// keeps moving afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub id: AlertId,
    pub store_id: StoreId,
    pub inventory_item_id: String,
    pub variant_id: Option<String>,
    pub product_id: Option<String>,
    pub available: i64,
    pub threshold: i64,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl LowStockAlert {
    /// Create a fresh `ready` alert snapshot.
    pub fn new(
        store_id: StoreId,
        inventory_item_id: impl Into<String>,
        variant_id: Option<String>,
        product_id: Option<String>,
        available: i64,
        threshold: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AlertId::new(),
            store_id,
            inventory_item_id: inventory_item_id.into(),
            variant_id,
            product_id,
            available,
            threshold,
            status: AlertStatus::Ready,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Move to `status`, maintaining `resolved_at`: set when the episode
    /// reaches `sent` or `cleared`, dropped when it re-opens to `ready`.
    pub fn transition(&mut self, status: AlertStatus) {
        let now = Utc::now();
        self.status = status;
        self.updated_at = now;
        self.resolved_at = match status {
            AlertStatus::Ready => None,
            AlertStatus::Sent | AlertStatus::Cleared => Some(now),
        };
    }

    /// Free-text match over the platform identifiers (item, product,
    /// variant). Used by the admin listing's search box.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        self.inventory_item_id.contains(term)
            || self
                .product_id
                .as_deref()
                .is_some_and(|p| p.contains(term))
            || self
                .variant_id
                .as_deref()
                .is_some_and(|v| v.contains(term))
    }
}
