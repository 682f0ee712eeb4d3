//! Benchmarks for the hot paths: threshold evaluation and a full
//! ingest-plan-send cycle against the in-memory store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use stockwatch_alerts::{InventoryLevelUpdate, evaluate};
use stockwatch_dispatch::{ChannelSender, ConsoleEmailProvider, EmailSender, NotificationChannel};
use stockwatch_infra::{
    DispatchOptions, InMemoryStore, InventoryIngest, NotificationDispatcher, StoreDirectory,
};

fn update(item: &str, available: i64, secs: i64) -> InventoryLevelUpdate {
    InventoryLevelUpdate {
        shop: "bench.shop".to_string(),
        inventory_item_id: item.to_string(),
        location_id: "loc-1".to_string(),
        available,
        updated_at: Utc.timestamp_opt(secs, 0).unwrap(),
        variant_id: Some("var-1".to_string()),
        product_id: Some("prod-1".to_string()),
        source: Some("webhook".to_string()),
    }
}

fn threshold_evaluation(c: &mut Criterion) {
    c.bench_function("evaluate_sweep", |b| {
        b.iter(|| {
            for available in -50i64..50 {
                black_box(evaluate(
                    black_box(available),
                    black_box(5),
                    black_box(Some(available + 1)),
                ));
            }
        })
    });
}

fn ingest_and_dispatch_cycle(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");

    c.bench_function("ingest_dispatch_cycle", |b| {
        b.iter(|| {
            rt.block_on(async {
                let db = InMemoryStore::arc();
                let ingest =
                    InventoryIngest::new(db.clone(), db.clone(), db.clone(), db.clone());
                let dispatcher = NotificationDispatcher::new(db.clone(), db.clone());
                let senders: Vec<Arc<dyn ChannelSender>> =
                    vec![Arc::new(EmailSender::new(ConsoleEmailProvider, None))];
                let options = DispatchOptions::default()
                    .with_email_recipients(vec!["ops@bench.shop".to_string()]);

                for i in 0..16 {
                    let item = format!("item-{i}");
                    ingest.ingest(&update(&item, 10, 100)).await.unwrap();
                    ingest.ingest(&update(&item, 2, 200)).await.unwrap();
                }

                let store = db.find("bench.shop").await.unwrap().unwrap();
                let attempted = dispatcher
                    .dispatch_and_send(
                        &store,
                        &[NotificationChannel::Email],
                        &senders,
                        &options,
                    )
                    .await
                    .unwrap();
                black_box(attempted)
            })
        })
    });
}

criterion_group!(benches, threshold_evaluation, ingest_and_dispatch_cycle);
criterion_main!(benches);
