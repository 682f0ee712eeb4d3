//! Per-channel delivery logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwatch_core::{AlertId, NotificationLogId, StoreId};

use crate::channel::NotificationChannel;

/// Delivery status of one (alert, channel) lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Planned for sending; attempt counter untouched.
    Queued,
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryStatus::Sent | DeliveryStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Queued => "queued",
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl core::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery lineage for one (alert, channel) pair.
///
/// One row accumulates attempts across planning passes; planners reuse it
/// instead of inserting a sibling, otherwise the attempt cap could never
/// bound retries. Attempts move only on terminal outcomes, never on queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationLog {
    pub id: NotificationLogId,
    pub store_id: StoreId,
    pub alert_id: AlertId,
    pub channel: NotificationChannel,
    pub status: DeliveryStatus,
    pub attempts: u32,
    pub provider_message_id: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationLog {
    /// Fresh queued log for a newly planned (alert, channel) pair.
    pub fn queued(store_id: StoreId, alert_id: AlertId, channel: NotificationChannel) -> Self {
        let now = Utc::now();
        Self {
            id: NotificationLogId::new(),
            store_id,
            alert_id,
            channel,
            status: DeliveryStatus::Queued,
            attempts: 0,
            provider_message_id: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Re-queue for another pass without touching the attempt counter.
    pub fn requeue(&mut self) {
        self.status = DeliveryStatus::Queued;
        self.updated_at = Utc::now();
    }

    /// Record a successful delivery, bumping the attempt counter.
    pub fn record_sent(&mut self, provider_message_id: Option<String>) {
        self.status = DeliveryStatus::Sent;
        self.provider_message_id = provider_message_id;
        self.error = None;
        self.attempts += 1;
        self.updated_at = Utc::now();
    }

    /// Record a failed delivery, bumping the attempt counter.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.status = DeliveryStatus::Failed;
        self.provider_message_id = None;
        self.error = Some(error.into());
        self.attempts += 1;
        self.updated_at = Utc::now();
    }

    /// Start a fresh delivery episode on the same lineage (manual resend):
    /// back to queued with a zeroed attempt counter.
    pub fn reset(&mut self) {
        self.status = DeliveryStatus::Queued;
        self.attempts = 0;
        self.provider_message_id = None;
        self.error = None;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> NotificationLog {
        NotificationLog::queued(StoreId::new(), AlertId::new(), NotificationChannel::Email)
    }

    #[test]
    fn queueing_never_counts_as_an_attempt() {
        let mut l = log();
        assert_eq!(l.attempts, 0);

        l.requeue();
        l.requeue();
        assert_eq!(l.attempts, 0);
        assert_eq!(l.status, DeliveryStatus::Queued);
    }

    #[test]
    fn terminal_outcomes_increment_attempts() {
        let mut l = log();

        l.record_failure("smtp timeout");
        assert_eq!(l.attempts, 1);
        assert_eq!(l.status, DeliveryStatus::Failed);
        assert_eq!(l.error.as_deref(), Some("smtp timeout"));

        l.requeue();
        l.record_sent(Some("msg-1".to_string()));
        assert_eq!(l.attempts, 2);
        assert_eq!(l.status, DeliveryStatus::Sent);
        assert_eq!(l.provider_message_id.as_deref(), Some("msg-1"));
        assert!(l.error.is_none());
    }

    #[test]
    fn reset_starts_a_fresh_episode() {
        let mut l = log();
        l.record_failure("smtp timeout");
        l.record_failure("smtp timeout");
        assert_eq!(l.attempts, 2);

        l.reset();
        assert_eq!(l.status, DeliveryStatus::Queued);
        assert_eq!(l.attempts, 0);
        assert!(l.provider_message_id.is_none());
        assert!(l.error.is_none());
    }
}
