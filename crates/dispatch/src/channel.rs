//! Delivery channels.

use serde::{Deserialize, Serialize};

use stockwatch_core::DomainError;

/// A delivery transport. New channels add a variant (and a sender
/// implementation), not a conditional branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Email,
    Slack,
    Sms,
    Whatsapp,
}

impl NotificationChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationChannel::Email => "email",
            NotificationChannel::Slack => "slack",
            NotificationChannel::Sms => "sms",
            NotificationChannel::Whatsapp => "whatsapp",
        }
    }
}

impl core::fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for NotificationChannel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(NotificationChannel::Email),
            "slack" => Ok(NotificationChannel::Slack),
            "sms" => Ok(NotificationChannel::Sms),
            "whatsapp" => Ok(NotificationChannel::Whatsapp),
            other => Err(DomainError::validation(format!(
                "unknown notification channel: {other}"
            ))),
        }
    }
}
