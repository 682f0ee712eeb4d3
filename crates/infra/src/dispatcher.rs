//! Notification dispatch engine: planning and batch orchestration.
//!
//! Planning turns `ready` alerts into per-channel jobs while reusing the
//! existing (alert, channel) log lineage; the batch step sends each job,
//! records outcomes and reconciles alert status from the aggregate result.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use stockwatch_alerts::{AlertIntent, AlertStatus, LowStockAlert};
use stockwatch_core::{AlertId, StoreId};
use stockwatch_dispatch::{
    ChannelSender, DeliveryStatus, DispatchJob, NotificationChannel, NotificationLog,
    NotificationPayload, SendOutcome,
};

use crate::stores::{AlertStore, NotificationLogStore, StoreRecord, StoreResult};

/// Per-batch dispatch tuning.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Recipients resolved for the email channel.
    pub email_recipients: Vec<String>,
    /// Attempt cap per (alert, channel). Once a log reaches it in `failed`
    /// state, planning skips the pair until a manual resend resets the
    /// situation.
    pub max_attempts: u32,
    /// Upper bound on one sender call; expiry counts as a failed attempt.
    pub send_timeout: Duration,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            email_recipients: Vec::new(),
            max_attempts: 3,
            send_timeout: Duration::from_secs(10),
        }
    }
}

impl DispatchOptions {
    pub fn with_email_recipients(mut self, recipients: Vec<String>) -> Self {
        self.email_recipients = recipients;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Plans and executes dispatch batches for one shop at a time.
pub struct NotificationDispatcher {
    alerts: Arc<dyn AlertStore>,
    logs: Arc<dyn NotificationLogStore>,
}

impl NotificationDispatcher {
    pub fn new(alerts: Arc<dyn AlertStore>, logs: Arc<dyn NotificationLogStore>) -> Self {
        Self { alerts, logs }
    }

    /// Plan per-channel delivery jobs for every ready alert.
    ///
    /// Idempotent: a (alert, channel) pair whose latest log is `sent` is
    /// skipped, as is one that exhausted its attempts. Otherwise the
    /// existing log is re-queued (attempts untouched) or a fresh one is
    /// created, and a job carrying the alert snapshot is emitted.
    pub async fn prepare_jobs(
        &self,
        store: &StoreRecord,
        channels: &[NotificationChannel],
        options: &DispatchOptions,
    ) -> StoreResult<Vec<DispatchJob>> {
        let ready = self.alerts.list_ready(store.id).await?;
        let mut jobs = Vec::new();

        for alert in &ready {
            for &channel in channels {
                let existing = self.logs.find_latest(alert.id, channel).await?;

                if let Some(log) = &existing {
                    if log.status == DeliveryStatus::Sent {
                        continue; // already delivered on this channel
                    }
                    if log.attempts >= options.max_attempts {
                        continue; // give up until manual intervention
                    }
                }

                let log = match existing {
                    Some(log) => self.logs.requeue(log.id).await?,
                    None => {
                        self.logs
                            .create(NotificationLog::queued(store.id, alert.id, channel))
                            .await?
                    }
                };

                jobs.push(DispatchJob {
                    channel,
                    log_id: log.id,
                    payload: NotificationPayload {
                        alert_id: alert.id,
                        store_id: store.id,
                        shop: store.shop.clone(),
                        inventory_item_id: alert.inventory_item_id.clone(),
                        variant_id: alert.variant_id.clone(),
                        product_id: alert.product_id.clone(),
                        available: alert.available,
                        threshold: alert.threshold,
                        occurred_at: alert.updated_at,
                    },
                    recipients: if channel == NotificationChannel::Email {
                        options.email_recipients.clone()
                    } else {
                        Vec::new()
                    },
                });
            }
        }

        Ok(jobs)
    }

    /// Apply a user intent to an alert.
    ///
    /// Delegates the guarded transition to the alert store. A resend that
    /// actually re-opened the alert also re-opens its delivery lineage
    /// (logs back to queued, attempts zeroed): the previous episode's
    /// `sent` logs would otherwise make the planner skip every channel,
    /// and a capped-out channel could never be retried. Resend is the
    /// manual recovery path for an exhausted attempt cap.
    pub async fn apply_intent(
        &self,
        store_id: StoreId,
        alert_id: AlertId,
        intent: AlertIntent,
    ) -> StoreResult<Option<LowStockAlert>> {
        let before = self.alerts.get(store_id, alert_id).await?;
        let result = self.alerts.apply_intent(store_id, alert_id, intent).await?;

        if let (Some(before), Some(after)) = (&before, &result) {
            let reopened = intent == AlertIntent::Resend
                && before.status == AlertStatus::Sent
                && after.status == AlertStatus::Ready;
            if reopened {
                let reset = self.logs.reset_for_alert(alert_id).await?;
                info!(
                    alert_id = %alert_id,
                    reset,
                    "resend re-opened alert, delivery lineage reset"
                );
            }
        }

        Ok(result)
    }

    /// Plan, send and reconcile ready alerts for one shop.
    ///
    /// Always completes and returns the number of jobs attempted: a missing
    /// sender, a provider failure or a timeout becomes a `failed` log entry,
    /// never an error of this call. Only storage failures propagate.
    pub async fn dispatch_and_send(
        &self,
        store: &StoreRecord,
        channels: &[NotificationChannel],
        senders: &[Arc<dyn ChannelSender>],
        options: &DispatchOptions,
    ) -> StoreResult<usize> {
        let jobs = self.prepare_jobs(store, channels, options).await?;

        if jobs.is_empty() {
            info!(shop = %store.shop, "no ready alerts to send");
            return Ok(0);
        }

        info!(
            shop = %store.shop,
            count = jobs.len(),
            ?channels,
            "sending dispatch jobs"
        );

        let mut total_by_alert: HashMap<AlertId, usize> = HashMap::new();
        let mut success_by_alert: HashMap<AlertId, usize> = HashMap::new();

        for job in &jobs {
            *total_by_alert.entry(job.payload.alert_id).or_default() += 1;

            let Some(sender) = senders.iter().find(|s| s.channel() == job.channel) else {
                self.logs
                    .record_failure(job.log_id, "No sender registered")
                    .await?;
                error!(
                    channel = %job.channel,
                    log_id = %job.log_id,
                    "no sender for channel"
                );
                continue;
            };

            let outcome = match tokio::time::timeout(options.send_timeout, sender.send(job)).await
            {
                Ok(outcome) => outcome,
                Err(_) => SendOutcome::failed(format!(
                    "send timed out after {:?}",
                    options.send_timeout
                )),
            };

            match outcome {
                SendOutcome::Sent {
                    provider_message_id,
                } => {
                    self.logs
                        .record_sent(job.log_id, provider_message_id.clone())
                        .await?;
                    info!(
                        log_id = %job.log_id,
                        channel = %job.channel,
                        alert_id = %job.payload.alert_id,
                        provider_message_id = ?provider_message_id,
                        "job sent"
                    );
                    *success_by_alert.entry(job.payload.alert_id).or_default() += 1;
                }
                SendOutcome::Failed { error } => {
                    self.logs.record_failure(job.log_id, &error).await?;
                    error!(
                        log_id = %job.log_id,
                        channel = %job.channel,
                        alert_id = %job.payload.alert_id,
                        error = %error,
                        "job failed"
                    );
                }
            }
        }

        // An alert flips to sent only when every channel planned for it in
        // this batch succeeded; anything less leaves it ready for a retry
        // pass.
        for (alert_id, total) in &total_by_alert {
            let success = success_by_alert.get(alert_id).copied().unwrap_or(0);
            if success == *total && *total > 0 {
                self.alerts.set_status(*alert_id, AlertStatus::Sent).await?;
            }
        }

        Ok(jobs.len())
    }
}
