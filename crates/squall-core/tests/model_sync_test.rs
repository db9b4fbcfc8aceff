#![allow(clippy::unwrap_used)]
// Integration tests for model sync against a mock endpoint.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use squall_core::{Payload, PropertyMap, Schema, Transport, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

fn transport() -> Transport {
    Transport::new(&TransportConfig::default()).unwrap()
}

// ── Sync ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sync_sends_the_full_property_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(body_string("name=gale&size=4"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"saved": true})))
        .mount(&server)
        .await;

    let schema = Schema::builder()
        .stored("name", "gale")
        .stored("size", 4)
        .url(format!("{}/models", server.uri()))
        .build();
    let model = schema.create(PropertyMap::new());

    let received: Arc<Mutex<Option<Payload>>> = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&received);
    model
        .sync(
            &transport(),
            move |payload| *slot.lock().unwrap() = Some(payload),
            || {},
        )
        .unwrap()
        .completed()
        .await;

    let payload = received.lock().unwrap().take().unwrap();
    assert_eq!(payload.as_json().unwrap(), &json!({"saved": true}));
}

#[tokio::test]
async fn test_computed_properties_ride_in_the_sync_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profiles"))
        .and(body_string("first=Ada&full_name=Ada+Lovelace&last=Lovelace"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let schema = Schema::builder()
        .stored("first", "Ada")
        .stored("last", "Lovelace")
        .computed("full_name", |data| {
            let first = data.get("first").and_then(Value::as_str).unwrap_or_default();
            let last = data.get("last").and_then(Value::as_str).unwrap_or_default();
            Value::from(format!("{first} {last}"))
        })
        .url(format!("{}/profiles", server.uri()))
        .build();
    let model = schema.create(PropertyMap::new());

    let synced = Arc::new(AtomicBool::new(false));
    let synced_flag = Arc::clone(&synced);
    model
        .sync(
            &transport(),
            move |_| synced_flag.store(true, Ordering::SeqCst),
            || {},
        )
        .unwrap()
        .completed()
        .await;

    assert!(synced.load(Ordering::SeqCst), "mock did not match the request");
}

#[tokio::test]
async fn test_post_uses_the_post_method() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models"))
        .and(body_string("id=7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("created"))
        .mount(&server)
        .await;

    let schema = Schema::builder()
        .stored("id", 7)
        .url(format!("{}/models", server.uri()))
        .build();
    let model = schema.create(PropertyMap::new());

    let created = Arc::new(AtomicBool::new(false));
    let created_flag = Arc::clone(&created);
    model
        .post(
            &transport(),
            move |_| created_flag.store(true, Ordering::SeqCst),
            || {},
        )
        .unwrap()
        .completed()
        .await;

    assert!(created.load(Ordering::SeqCst));
}

// ── Failure routing ─────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_sync_fires_the_error_callback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let schema = Schema::builder()
        .stored("id", 1)
        .url(format!("{}/models", server.uri()))
        .build();
    let model = schema.create(PropertyMap::new());

    let failed = Arc::new(AtomicBool::new(false));
    let failed_flag = Arc::clone(&failed);
    model
        .sync(&transport(), |_| {}, move || {
            failed_flag.store(true, Ordering::SeqCst);
        })
        .unwrap()
        .completed()
        .await;

    assert!(failed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_session_expiry_during_sync_reaches_the_configured_hook() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let expirations = Arc::new(AtomicUsize::new(0));
    let hook_count = Arc::clone(&expirations);
    let config = TransportConfig::default().with_session_expired(move || {
        hook_count.fetch_add(1, Ordering::SeqCst);
    });
    let transport = Transport::new(&config).unwrap();

    let schema = Schema::builder()
        .stored("id", 1)
        .url(format!("{}/models", server.uri()))
        .build();
    let model = schema.create(PropertyMap::new());

    let success = Arc::new(AtomicBool::new(false));
    let error = Arc::new(AtomicBool::new(false));
    let success_flag = Arc::clone(&success);
    let error_flag = Arc::clone(&error);
    model
        .sync(
            &transport,
            move |_| success_flag.store(true, Ordering::SeqCst),
            move || error_flag.store(true, Ordering::SeqCst),
        )
        .unwrap()
        .completed()
        .await;

    assert_eq!(expirations.load(Ordering::SeqCst), 1);
    assert!(!success.load(Ordering::SeqCst), "success must not fire on 401");
    assert!(!error.load(Ordering::SeqCst), "error must not fire on 401");
}
