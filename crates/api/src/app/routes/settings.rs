use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};

use stockwatch_alerts::validate_settings;
use stockwatch_infra::{SettingsStore, StoreDirectory};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(get_settings).put(save_settings))
}

pub async fn get_settings(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let shop = match common::require_shop(&headers) {
        Ok(shop) => shop,
        Err(resp) => return resp,
    };

    let store = match services.directory.ensure(&shop).await {
        Ok(store) => store,
        Err(e) => return errors::store_error_to_response(e),
    };

    match services.settings.get(store.id).await {
        Ok(settings) => Json(settings).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn save_settings(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Json(body): Json<dto::SaveSettingsRequest>,
) -> axum::response::Response {
    let shop = match common::require_shop(&headers) {
        Ok(shop) => shop,
        Err(resp) => return resp,
    };

    let settings = match validate_settings(&body.global_threshold, &body.alert_emails) {
        Ok(settings) => settings,
        Err(field_errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({
                    "error": "validation_error",
                    "errors": field_errors,
                })),
            )
                .into_response();
        }
    };

    let store = match services.directory.ensure(&shop).await {
        Ok(store) => store,
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(e) = services.settings.save(store.id, &settings).await {
        return errors::store_error_to_response(e);
    }

    Json(settings).into_response()
}
