//! Channel sender capability.

use std::sync::Arc;

use crate::channel::NotificationChannel;
use crate::job::DispatchJob;

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent {
        provider_message_id: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl SendOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent { .. })
    }
}

/// A delivery transport for one channel.
///
/// `send` is infallible by contract: implementations catch their provider's
/// failures and report them as a `Failed` outcome, so one broken channel can
/// never abort a dispatch batch. Calls may suspend on network I/O; callers
/// are expected to bound them with a timeout.
#[async_trait::async_trait]
pub trait ChannelSender: Send + Sync {
    /// The channel this sender delivers on.
    fn channel(&self) -> NotificationChannel;

    /// Attempt delivery of one job.
    async fn send(&self, job: &DispatchJob) -> SendOutcome;
}

#[async_trait::async_trait]
impl<S> ChannelSender for Arc<S>
where
    S: ChannelSender + ?Sized,
{
    fn channel(&self) -> NotificationChannel {
        (**self).channel()
    }

    async fn send(&self, job: &DispatchJob) -> SendOutcome {
        (**self).send(job).await
    }
}
