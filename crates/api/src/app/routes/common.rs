use axum::http::{HeaderMap, StatusCode};

use crate::app::errors;

/// Header carrying the shop identity.
///
/// Authentication and webhook signature verification are upstream concerns
/// (embedded-app session, HMAC check at the edge); by the time a request
/// reaches these handlers the shop domain travels in a trusted header.
pub const SHOP_HEADER: &str = "x-shop-domain";

pub fn require_shop(headers: &HeaderMap) -> Result<String, axum::response::Response> {
    let shop = headers
        .get(SHOP_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    if shop.is_empty() {
        return Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_shop",
            "X-Shop-Domain header is required",
        ));
    }

    Ok(shop.to_string())
}
