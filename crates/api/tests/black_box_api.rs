//! Black-box tests: the full router served over a real socket, driven with
//! an HTTP client the way the platform and the admin UI would drive it.

use reqwest::StatusCode;
use serde_json::{Value, json};

const SHOP_HEADER: &str = "X-Shop-Domain";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = stockwatch_api::app::build_app();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn post_webhook(
    client: &reqwest::Client,
    base_url: &str,
    shop: &str,
    body: Value,
) -> reqwest::Response {
    client
        .post(format!("{base_url}/webhooks/inventory-levels"))
        .header(SHOP_HEADER, shop)
        .json(&body)
        .send()
        .await
        .unwrap()
}

fn level(item: &str, available: i64, updated_at: &str) -> Value {
    json!({
        "inventory_level": {
            "inventory_item_id": item,
            "location_id": "loc-1",
            "available": available,
            "updated_at": updated_at,
        }
    })
}

async fn alerts_with_status(
    client: &reqwest::Client,
    base_url: &str,
    shop: &str,
    status: &str,
) -> Vec<Value> {
    let res = client
        .get(format!("{base_url}/alerts?status={status}"))
        .header(SHOP_HEADER, shop)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["alerts"].as_array().unwrap().clone()
}

#[tokio::test]
async fn health_endpoint_answers() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn shop_header_is_required() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/alerts", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn full_alert_flow_over_http() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let shop = "flow.test";

    // Configure recipients so the email channel can deliver.
    let res = client
        .put(format!("{}/settings", server.base_url))
        .header(SHOP_HEADER, shop)
        .json(&json!({
            "global_threshold": "5",
            "alert_emails": "ops@flow.test",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Healthy stock: no alert.
    let res = post_webhook(
        &client,
        &server.base_url,
        shop,
        level("item-1", 10, "2026-01-01T00:00:00Z"),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        alerts_with_status(&client, &server.base_url, shop, "ready,sent")
            .await
            .is_empty()
    );

    // Crossing: alert is created and delivered inline by the console
    // provider, so it lands directly in `sent`.
    let res = post_webhook(
        &client,
        &server.base_url,
        shop,
        level("item-1", 3, "2026-01-01T00:01:00Z"),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let sent = alerts_with_status(&client, &server.base_url, shop, "sent").await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["inventory_item_id"], "item-1");
    assert_eq!(sent[0]["available"], 3);
    assert_eq!(sent[0]["threshold"], 5);

    // Delivery log is visible.
    let res = client
        .get(format!("{}/notifications", server.base_url))
        .header(SHOP_HEADER, shop)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let logs = body["notifications"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["status"], "sent");
    assert_eq!(logs[0]["attempts"], 1);

    // Recovery: the sent alert transitions to cleared.
    let res = post_webhook(
        &client,
        &server.base_url,
        shop,
        level("item-1", 8, "2026-01-01T00:02:00Z"),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let cleared = alerts_with_status(&client, &server.base_url, shop, "cleared").await;
    assert_eq!(cleared.len(), 1);
    assert!(
        alerts_with_status(&client, &server.base_url, shop, "ready,sent")
            .await
            .is_empty()
    );
}

#[tokio::test]
async fn malformed_webhooks_are_acknowledged_and_dropped() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let shop = "malformed.test";

    // Missing `available`.
    let res = post_webhook(
        &client,
        &server.base_url,
        shop,
        json!({ "inventory_level": { "inventory_item_id": "item-1", "location_id": "loc-1" } }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Missing identifiers.
    let res = post_webhook(
        &client,
        &server.base_url,
        shop,
        json!({ "available": 0 }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    assert!(
        alerts_with_status(&client, &server.base_url, shop, "ready,sent,cleared")
            .await
            .is_empty()
    );
}

#[tokio::test]
async fn cancel_intent_clears_an_undeliverable_alert() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let shop = "cancel.test";

    // No settings saved: the crossing queues an alert, the email job fails
    // fast on the empty recipient list and the alert stays ready.
    let res = post_webhook(
        &client,
        &server.base_url,
        shop,
        level("item-9", 2, "2026-01-01T00:00:00Z"),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let ready = alerts_with_status(&client, &server.base_url, shop, "ready").await;
    assert_eq!(ready.len(), 1);
    let id = ready[0]["id"].as_str().unwrap().to_string();

    // Cancel it.
    let res = client
        .post(format!("{}/alerts/{id}/intent", server.base_url))
        .header(SHOP_HEADER, shop)
        .json(&json!({ "intent": "cancel" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["alert"]["status"], "cleared");

    // Double submission is a no-op, not an error.
    let res = client
        .post(format!("{}/alerts/{id}/intent", server.base_url))
        .header(SHOP_HEADER, shop)
        .json(&json!({ "intent": "cancel" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["alert"]["status"], "cleared");
}

#[tokio::test]
async fn resend_intent_redelivers_after_settings_fix() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let shop = "resend.test";

    let res = client
        .put(format!("{}/settings", server.base_url))
        .header(SHOP_HEADER, shop)
        .json(&json!({
            "global_threshold": "5",
            "alert_emails": "ops@resend.test",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    post_webhook(
        &client,
        &server.base_url,
        shop,
        level("item-1", 2, "2026-01-01T00:00:00Z"),
    )
    .await;

    let sent = alerts_with_status(&client, &server.base_url, shop, "sent").await;
    assert_eq!(sent.len(), 1);
    let id = sent[0]["id"].as_str().unwrap().to_string();

    // Resend re-opens the alert; the manual sweep delivers it again.
    let res = client
        .post(format!("{}/alerts/{id}/intent", server.base_url))
        .header(SHOP_HEADER, shop)
        .json(&json!({ "intent": "resend" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["alert"]["status"], "ready");

    let res = client
        .post(format!("{}/alerts/dispatch", server.base_url))
        .header(SHOP_HEADER, shop)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["attempted"], 1);

    let sent = alerts_with_status(&client, &server.base_url, shop, "sent").await;
    assert_eq!(sent.len(), 1);
}

#[tokio::test]
async fn webhook_floods_are_rate_limited_per_shop() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let shop = "flood.test";

    // Default window: 20 requests per 30 s per shop. Healthy stock keeps
    // each delivery cheap.
    for i in 0..20 {
        let res = post_webhook(
            &client,
            &server.base_url,
            shop,
            level("item-1", 10 + i, "2026-01-01T00:00:00Z"),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = post_webhook(
        &client,
        &server.base_url,
        shop,
        level("item-1", 10, "2026-01-01T00:00:00Z"),
    )
    .await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    // Other shops are unaffected.
    let res = post_webhook(
        &client,
        &server.base_url,
        "calm.test",
        level("item-1", 10, "2026-01-01T00:00:00Z"),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn settings_validation_reports_field_errors() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .put(format!("{}/settings", server.base_url))
        .header(SHOP_HEADER, "settings.test")
        .json(&json!({
            "global_threshold": "-3",
            "alert_emails": "not-an-email",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert!(body["errors"]["global_threshold"].is_string());
    assert!(body["errors"]["alert_emails"].is_string());
}
