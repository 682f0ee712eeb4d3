//! Per-shop alerting settings and their validation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Threshold applied when a shop has not saved settings yet.
pub const DEFAULT_GLOBAL_THRESHOLD: i64 = 5;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Per-shop configuration the alerting core reads as an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSettings {
    pub global_threshold: i64,
    pub alert_emails: Vec<String>,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            global_threshold: DEFAULT_GLOBAL_THRESHOLD,
            alert_emails: Vec::new(),
        }
    }
}

/// Field-level validation failures, shaped for form display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingsValidationErrors {
    pub global_threshold: Option<String>,
    pub alert_emails: Option<String>,
}

impl SettingsValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.global_threshold.is_none() && self.alert_emails.is_none()
    }
}

/// Split a comma-separated address list, trimming and dropping blanks.
pub fn normalize_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate raw form input into settings.
///
/// The threshold must parse as a non-negative integer; at least one
/// syntactically valid email address is required.
pub fn validate_settings(
    global_threshold_raw: &str,
    alert_emails_raw: &str,
) -> Result<ShopSettings, SettingsValidationErrors> {
    let mut errors = SettingsValidationErrors::default();

    let threshold = match global_threshold_raw.trim().parse::<i64>() {
        Ok(value) if value < 0 => {
            errors.global_threshold = Some("Threshold cannot be negative.".to_string());
            None
        }
        Ok(value) => Some(value),
        Err(_) => {
            errors.global_threshold = Some("Enter a number for the threshold.".to_string());
            None
        }
    };

    let emails = normalize_emails(alert_emails_raw);
    if emails.is_empty() {
        errors.alert_emails = Some("Add at least one email.".to_string());
    } else if emails.iter().any(|email| !EMAIL_RE.is_match(email)) {
        errors.alert_emails = Some("One or more emails are invalid.".to_string());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ShopSettings {
        global_threshold: threshold.unwrap_or(DEFAULT_GLOBAL_THRESHOLD),
        alert_emails: emails,
    })
}
