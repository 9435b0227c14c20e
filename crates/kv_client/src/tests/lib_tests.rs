use super::*;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

type SharedEntries = Arc<Mutex<BTreeMap<String, Value>>>;

#[derive(Deserialize)]
struct GetParams {
    key: String,
}

#[derive(Deserialize)]
struct PrefixParams {
    prefix: String,
}

async fn handle_get(
    State(entries): State<SharedEntries>,
    Query(params): Query<GetParams>,
) -> Json<GetResponse> {
    let value = entries.lock().await.get(&params.key).cloned();
    Json(GetResponse { value })
}

async fn handle_set(
    State(entries): State<SharedEntries>,
    Json(payload): Json<SetRequest>,
) -> StatusCode {
    entries.lock().await.insert(payload.key, payload.value);
    StatusCode::NO_CONTENT
}

async fn handle_prefix(
    State(entries): State<SharedEntries>,
    Query(params): Query<PrefixParams>,
) -> Json<Vec<KvRecord>> {
    let entries = entries.lock().await;
    let records = entries
        .range(params.prefix.clone()..)
        .take_while(|(key, _)| key.starts_with(&params.prefix))
        .map(|(key, value)| KvRecord {
            key: key.clone(),
            value: value.clone(),
        })
        .collect();
    Json(records)
}

async fn spawn_store_server() -> anyhow::Result<(String, SharedEntries)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let entries: SharedEntries = Arc::new(Mutex::new(BTreeMap::new()));
    let app = Router::new()
        .route("/kv/get", get(handle_get))
        .route("/kv/set", post(handle_set))
        .route("/kv/prefix", get(handle_prefix))
        .with_state(Arc::clone(&entries));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), entries))
}

/// Store that answers every prefix scan with a literal `null` body.
async fn spawn_nonconforming_server() -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new().route(
        "/kv/prefix",
        get(|| async { Json(serde_json::Value::Null) }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn http_client_round_trips_set_and_get() {
    let (server_url, _entries) = spawn_store_server().await.expect("spawn server");
    let client = HttpKvClient::new(server_url);

    client
        .set("demo:1", json!({"headline": "Demo A"}))
        .await
        .expect("set");

    let value = client.get("demo:1").await.expect("get");
    assert_eq!(value, Some(json!({"headline": "Demo A"})));
}

#[tokio::test]
async fn http_client_get_miss_is_none() {
    let (server_url, _entries) = spawn_store_server().await.expect("spawn server");
    let client = HttpKvClient::new(server_url);

    let value = client.get("demo:missing").await.expect("get");
    assert_eq!(value, None);
}

#[tokio::test]
async fn http_client_prefix_scan_is_scoped_and_ordered() {
    let (server_url, _entries) = spawn_store_server().await.expect("spawn server");
    let client = HttpKvClient::new(server_url);

    client.set("demo:2", json!({"headline": "B"})).await.expect("set");
    client.set("demo:1", json!({"headline": "A"})).await.expect("set");
    client
        .set("demo:1:feedback:5", json!("nice"))
        .await
        .expect("set");
    client.set("other:1", json!(1)).await.expect("set");

    let records = client.get_with_prefix("demo:1").await.expect("scan");
    let keys: Vec<_> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["demo:1", "demo:1:feedback:5"]);
}

#[tokio::test]
async fn http_client_empty_prefix_scan_is_empty_vec() {
    let (server_url, _entries) = spawn_store_server().await.expect("spawn server");
    let client = HttpKvClient::new(server_url);

    let records = client.get_with_prefix("demo:").await.expect("scan");
    assert!(records.is_empty());
}

#[tokio::test]
async fn http_client_normalizes_null_prefix_scan_body() {
    let server_url = spawn_nonconforming_server().await.expect("spawn server");
    let client = HttpKvClient::new(server_url);

    let records = client.get_with_prefix("demo:").await.expect("scan");
    assert!(records.is_empty());
}

#[tokio::test]
async fn http_client_surfaces_store_rejections() {
    let (server_url, _entries) = spawn_store_server().await.expect("spawn server");
    // Point at a route the store does not serve.
    let client = HttpKvClient::new(format!("{server_url}/nowhere"));

    let err = client.set("demo:1", json!({})).await.expect_err("404");
    assert!(err.to_string().contains("demo:1"));
}

#[tokio::test]
async fn memory_kv_overwrites_unconditionally() {
    let store = MemoryKv::new();
    store.set("demo:1", json!({"headline": "old"})).await.expect("set");
    store.set("demo:1", json!({"headline": "new"})).await.expect("set");

    let value = store.get("demo:1").await.expect("get");
    assert_eq!(value, Some(json!({"headline": "new"})));
}

#[tokio::test]
async fn memory_kv_prefix_scan_matches_contract() {
    let store = MemoryKv::new();
    store.set("demo:10", json!({"headline": "A"})).await.expect("set");
    store
        .set("demo:10:reaction:11", json!({"type": "smile"}))
        .await
        .expect("set");
    store.set("demo:20", json!({"headline": "B"})).await.expect("set");

    let records = store
        .get_with_prefix("demo:10:reaction:")
        .await
        .expect("scan");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, "demo:10:reaction:11");

    let none = store.get_with_prefix("demo:99").await.expect("scan");
    assert!(none.is_empty());
}
