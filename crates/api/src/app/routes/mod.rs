use axum::Router;

pub mod alerts;
pub mod common;
pub mod notifications;
pub mod settings;
pub mod system;
pub mod webhooks;

/// Router for all shop-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/webhooks", webhooks::router())
        .nest("/alerts", alerts::router())
        .nest("/settings", settings::router())
        .nest("/notifications", notifications::router())
}
