use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};

use stockwatch_alerts::{AlertIntent, AlertStatus};
use stockwatch_core::AlertId;
use stockwatch_infra::{AlertStore, StoreDirectory};

use crate::app::routes::{common, webhooks};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_alerts))
        .route("/dispatch", post(dispatch_alerts))
        .route("/:id/intent", post(apply_intent))
}

fn parse_statuses(raw: &str) -> Result<Vec<AlertStatus>, axum::response::Response> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            AlertStatus::from_str(s).map_err(|e| {
                errors::json_error(StatusCode::BAD_REQUEST, "invalid_status", e.to_string())
            })
        })
        .collect()
}

pub async fn list_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Query(query): Query<dto::ListAlertsQuery>,
) -> axum::response::Response {
    let shop = match common::require_shop(&headers) {
        Ok(shop) => shop,
        Err(resp) => return resp,
    };

    // No store yet means no alerts, not an error.
    let store = match services.directory.find(&shop).await {
        Ok(Some(store)) => store,
        Ok(None) => return Json(serde_json::json!({ "alerts": [] })).into_response(),
        Err(e) => return errors::store_error_to_response(e),
    };

    let statuses = match query.status.as_deref().map(parse_statuses).transpose() {
        Ok(statuses) => statuses,
        Err(resp) => return resp,
    };

    match services
        .alerts
        .list(store.id, statuses.as_deref(), query.search.as_deref())
        .await
    {
        Ok(alerts) => Json(serde_json::json!({ "alerts": alerts })).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn apply_intent(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<dto::ApplyIntentRequest>,
) -> axum::response::Response {
    let shop = match common::require_shop(&headers) {
        Ok(shop) => shop,
        Err(resp) => return resp,
    };

    let alert_id = match AlertId::from_str(&id) {
        Ok(alert_id) => alert_id,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string());
        }
    };

    let intent = match AlertIntent::from_str(&body.intent) {
        Ok(intent) => intent,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_intent", e.to_string());
        }
    };

    let store = match services.directory.find(&shop).await {
        Ok(Some(store)) => store,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "unknown shop");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    match services
        .dispatcher
        .apply_intent(store.id, alert_id, intent)
        .await
    {
        Ok(Some(alert)) => Json(serde_json::json!({ "alert": alert })).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "alert not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn dispatch_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let shop = match common::require_shop(&headers) {
        Ok(shop) => shop,
        Err(resp) => return resp,
    };

    match webhooks::dispatch_for_shop(&services, &shop).await {
        Ok(attempted) => Json(serde_json::json!({ "attempted": attempted })).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
