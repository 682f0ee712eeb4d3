//! Inbound platform webhooks.
//!
//! Malformed deliveries are acknowledged with 200 and dropped: a retry
//! storm over a payload that will never parse helps nobody. Only storage
//! failures surface as errors.

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use stockwatch_alerts::InventoryLevelUpdate;
use stockwatch_infra::{DispatchOptions, SettingsStore, StoreDirectory, StoreError};

use crate::app::errors;
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/inventory-levels", post(inventory_levels_update))
}

/// Pull a field that platforms deliver in either snake_case or camelCase,
/// as a string or a bare number.
fn string_field(level: &Value, snake: &str, camel: &str) -> Option<String> {
    for key in [snake, camel] {
        match level.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

pub async fn inventory_levels_update(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> axum::response::Response {
    let shop = match common::require_shop(&headers) {
        Ok(shop) => shop,
        Err(resp) => return resp,
    };

    let decision = services.webhook_limiter.check(&shop);
    if !decision.allowed {
        return errors::json_error(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            format!("retry after {}", decision.reset_at),
        );
    }

    // The platform nests the record under `inventory_level`; flat payloads
    // occur in replays and manual syncs.
    let level = payload.get("inventory_level").unwrap_or(&payload);

    let inventory_item_id =
        string_field(level, "inventory_item_id", "inventoryItemId").unwrap_or_default();
    let location_id = string_field(level, "location_id", "locationId").unwrap_or_default();
    let available = level.get("available").and_then(Value::as_i64);

    let Some(available) = available else {
        warn!(shop = %shop, "invalid inventory_levels/update webhook");
        return StatusCode::OK.into_response();
    };
    if inventory_item_id.is_empty() || location_id.is_empty() {
        warn!(shop = %shop, "invalid inventory_levels/update webhook");
        return StatusCode::OK.into_response();
    }

    let updated_at = string_field(level, "updated_at", "updatedAt")
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    info!(
        shop = %shop,
        inventory_item_id = %inventory_item_id,
        location_id = %location_id,
        available,
        "received inventory_levels/update"
    );

    let update = InventoryLevelUpdate {
        shop: shop.clone(),
        inventory_item_id,
        location_id,
        available,
        updated_at,
        variant_id: string_field(level, "variant_id", "variantId"),
        product_id: string_field(level, "product_id", "productId"),
        source: Some("webhook".to_string()),
    };

    let outcome = match services.ingest.ingest(&update).await {
        Ok(outcome) => outcome,
        Err(e) => return errors::store_error_to_response(e),
    };

    // Deliver in the same request when the ingest left a ready alert; the
    // manual sweep endpoint covers everything else.
    if outcome.leaves_ready_alert() {
        if let Err(e) = dispatch_for_shop(&services, &shop).await {
            return errors::store_error_to_response(e);
        }
    }

    StatusCode::OK.into_response()
}

/// One dispatch pass for a shop with its configured recipients.
pub(crate) async fn dispatch_for_shop(
    services: &AppServices,
    shop: &str,
) -> Result<usize, StoreError> {
    let store = services.directory.ensure(shop).await?;
    let settings = services.settings.get(store.id).await?;
    let options = DispatchOptions::default().with_email_recipients(settings.alert_emails);

    services
        .dispatcher
        .dispatch_and_send(&store, &services.channels, &services.senders, &options)
        .await
}
