//! Email channel: content rendering, provider capability and the sender.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::channel::NotificationChannel;
use crate::job::{DispatchJob, NotificationPayload};
use crate::sender::{ChannelSender, SendOutcome};

/// Transport-level message handed to an email provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub from: Option<String>,
}

/// Provider acknowledgement for an accepted message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderReceipt {
    pub id: Option<String>,
}

/// Transport-layer failure reported by an email provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider accepted the connection but rejected the message
    /// (non-2xx response, policy rejection).
    #[error("provider rejected message: {0}")]
    Rejected(String),

    /// The provider was unreachable or the connection failed mid-flight.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Pluggable email transport.
#[async_trait::async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<ProviderReceipt, ProviderError>;
}

/// Rendered email content, independent of any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Render the low-stock notification for one job payload.
///
/// Deterministic: the same payload always renders the same content, so
/// retries and resends are byte-identical.
pub fn render_low_stock_email(payload: &NotificationPayload) -> EmailContent {
    let variant_label = payload.variant_id.as_deref().unwrap_or("Variant");
    let product_label = payload.product_id.as_deref().unwrap_or("Product");

    let subject = format!("Low stock alert: {variant_label} at {}", payload.available);

    let text = [
        format!("Shop: {}", payload.shop),
        format!("Product: {product_label}"),
        format!("Variant: {variant_label}"),
        format!("Inventory item: {}", payload.inventory_item_id),
        format!("Available: {}", payload.available),
        format!("Threshold: {}", payload.threshold),
    ]
    .join("\n");

    let html = format!(
        "<p><strong>Low stock alert</strong></p>\
         <p><strong>Shop:</strong> {}</p>\
         <p><strong>Product:</strong> {product_label}</p>\
         <p><strong>Variant:</strong> {variant_label}</p>\
         <p><strong>Inventory item:</strong> {}</p>\
         <p><strong>Available:</strong> {}</p>\
         <p><strong>Threshold:</strong> {}</p>",
        payload.shop, payload.inventory_item_id, payload.available, payload.threshold,
    );

    EmailContent {
        subject,
        text,
        html,
    }
}

/// Email implementation of [`ChannelSender`].
///
/// Fails fast without a provider call when no recipients survive blank
/// filtering: that is a configuration error, and retrying it cannot succeed
/// until the configuration changes.
pub struct EmailSender<P> {
    provider: P,
    from: Option<String>,
}

impl<P> EmailSender<P> {
    pub fn new(provider: P, from: Option<String>) -> Self {
        Self { provider, from }
    }
}

#[async_trait::async_trait]
impl<P> ChannelSender for EmailSender<P>
where
    P: EmailProvider,
{
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    async fn send(&self, job: &DispatchJob) -> SendOutcome {
        let recipients: Vec<String> = job
            .recipients
            .iter()
            .filter(|r| !r.trim().is_empty())
            .cloned()
            .collect();

        if recipients.is_empty() {
            return SendOutcome::failed("No recipients configured");
        }

        let content = render_low_stock_email(&job.payload);
        let message = EmailMessage {
            to: recipients,
            subject: content.subject,
            text: content.text,
            html: content.html,
            from: self.from.clone(),
        };

        match self.provider.send(message).await {
            Ok(receipt) => SendOutcome::Sent {
                provider_message_id: receipt.id,
            },
            Err(e) => SendOutcome::failed(e.to_string()),
        }
    }
}

/// Provider that logs instead of sending. Development and tests only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleEmailProvider;

#[async_trait::async_trait]
impl EmailProvider for ConsoleEmailProvider {
    async fn send(&self, message: EmailMessage) -> Result<ProviderReceipt, ProviderError> {
        tracing::info!(
            to = ?message.to,
            subject = %message.subject,
            "sending email (console provider)"
        );
        Ok(ProviderReceipt {
            id: Some("console-provider".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;
    use stockwatch_core::{AlertId, NotificationLogId, StoreId};

    fn payload() -> NotificationPayload {
        NotificationPayload {
            alert_id: AlertId::new(),
            store_id: StoreId::new(),
            shop: "shop.test".to_string(),
            inventory_item_id: "inv-1".to_string(),
            variant_id: Some("var-1".to_string()),
            product_id: Some("prod-1".to_string()),
            available: 2,
            threshold: 5,
            occurred_at: Utc::now(),
        }
    }

    fn job(recipients: Vec<String>) -> DispatchJob {
        DispatchJob {
            channel: NotificationChannel::Email,
            log_id: NotificationLogId::new(),
            payload: payload(),
            recipients,
        }
    }

    /// Provider double: records messages, optionally fails every call.
    #[derive(Default)]
    struct RecordingProvider {
        sent: Mutex<Vec<EmailMessage>>,
        fail_with: Option<ProviderError>,
    }

    #[async_trait::async_trait]
    impl EmailProvider for RecordingProvider {
        async fn send(&self, message: EmailMessage) -> Result<ProviderReceipt, ProviderError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            self.sent.lock().unwrap().push(message);
            Ok(ProviderReceipt {
                id: Some("msg-42".to_string()),
            })
        }
    }

    #[test]
    fn rendered_text_contains_all_identifiers_and_numbers() {
        let content = render_low_stock_email(&payload());

        assert!(content.text.contains("inv-1"));
        assert!(content.text.contains("prod-1"));
        assert!(content.text.contains("var-1"));
        assert!(content.text.contains("Available: 2"));
        assert!(content.text.contains("Threshold: 5"));
        assert_eq!(content.subject, "Low stock alert: var-1 at 2");
    }

    #[test]
    fn rendering_falls_back_to_generic_labels() {
        let mut p = payload();
        p.variant_id = None;
        p.product_id = None;

        let content = render_low_stock_email(&p);
        assert!(content.text.contains("Product: Product"));
        assert!(content.text.contains("Variant: Variant"));
        assert_eq!(content.subject, "Low stock alert: Variant at 2");
    }

    #[tokio::test]
    async fn empty_recipients_fail_fast_without_provider_call() {
        let provider = RecordingProvider::default();
        let sender = EmailSender::new(provider, None);

        let outcome = sender
            .send(&job(vec![" ".to_string(), String::new()]))
            .await;

        assert_eq!(outcome, SendOutcome::failed("No recipients configured"));
        assert!(sender.provider.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_send_returns_provider_message_id() {
        let provider = RecordingProvider::default();
        let sender = EmailSender::new(provider, Some("alerts@shop.test".to_string()));

        let outcome = sender.send(&job(vec!["a@example.com".to_string()])).await;

        assert_eq!(
            outcome,
            SendOutcome::Sent {
                provider_message_id: Some("msg-42".to_string())
            }
        );

        let sent = sender.provider.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["a@example.com"]);
        assert_eq!(sent[0].from.as_deref(), Some("alerts@shop.test"));
    }

    #[tokio::test]
    async fn provider_failure_surfaces_as_failed_outcome() {
        let provider = RecordingProvider {
            fail_with: Some(ProviderError::Rejected("bad sender domain".to_string())),
            ..Default::default()
        };
        let sender = EmailSender::new(provider, None);

        let outcome = sender.send(&job(vec!["a@example.com".to_string()])).await;

        assert_eq!(
            outcome,
            SendOutcome::failed("provider rejected message: bad sender domain")
        );
    }
}
