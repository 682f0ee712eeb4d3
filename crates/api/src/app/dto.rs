use serde::Deserialize;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct ApplyIntentRequest {
    /// One of `resend`, `cancel`, `clear`.
    pub intent: String,
}

/// Form-shaped settings payload: both fields arrive as raw strings and go
/// through the domain validation, mirroring the admin form submission.
#[derive(Debug, Deserialize)]
pub struct SaveSettingsRequest {
    pub global_threshold: String,
    pub alert_emails: String,
}

#[derive(Debug, Deserialize)]
pub struct ListAlertsQuery {
    /// Comma-separated status set (`ready,sent`).
    pub status: Option<String>,
    /// Substring match over item/product/variant identifiers.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub limit: Option<usize>,
}
