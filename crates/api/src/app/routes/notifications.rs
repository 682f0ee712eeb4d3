use std::sync::Arc;

use axum::extract::Query;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};

use stockwatch_infra::{NotificationLogStore, StoreDirectory};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

pub fn router() -> Router {
    Router::new().route("/", get(list_notifications))
}

pub async fn list_notifications(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Query(query): Query<dto::ListNotificationsQuery>,
) -> axum::response::Response {
    let shop = match common::require_shop(&headers) {
        Ok(shop) => shop,
        Err(resp) => return resp,
    };

    let store = match services.directory.find(&shop).await {
        Ok(Some(store)) => store,
        Ok(None) => return Json(serde_json::json!({ "notifications": [] })).into_response(),
        Err(e) => return errors::store_error_to_response(e),
    };

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    match services.logs.list_recent(store.id, limit).await {
        Ok(logs) => Json(serde_json::json!({ "notifications": logs })).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
