//! `stockwatch-dispatch` — notification channels, jobs and senders.
//!
//! The channel model (one enum variant per transport), the dispatch job
//! payload, the per-(alert, channel) delivery log, the `ChannelSender`
//! capability and the email reference implementation live here. Planning
//! and batch orchestration sit in `stockwatch-infra`.

pub mod channel;
pub mod email;
pub mod job;
pub mod log;
pub mod sender;

pub use channel::NotificationChannel;
pub use email::{
    ConsoleEmailProvider, EmailContent, EmailMessage, EmailProvider, EmailSender, ProviderError,
    ProviderReceipt, render_low_stock_email,
};
pub use job::{DispatchJob, NotificationPayload};
pub use log::{DeliveryStatus, NotificationLog};
pub use sender::{ChannelSender, SendOutcome};
