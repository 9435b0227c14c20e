//! Client for the prefix-queryable key-value store backing DemoBoard.
//!
//! The store is an external collaborator; everything here speaks its
//! three-operation contract: point get, unconditional set, prefix scan.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::protocol::{GetResponse, KvRecord, SetRequest};
use tokio::sync::Mutex;

/// The Key-Value Client contract.
///
/// `get_with_prefix` returns the empty vec, never null, when nothing
/// matches; implementations over nonconforming stores normalize.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Unconditional overwrite; last write wins.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    async fn get_with_prefix(&self, prefix: &str) -> Result<Vec<KvRecord>>;
}

/// HTTP-backed store client.
///
/// Endpoints: `GET {base}/kv/get?key=`, `POST {base}/kv/set` with a
/// `{key, value}` body, `GET {base}/kv/prefix?prefix=`.
pub struct HttpKvClient {
    http: Client,
    base_url: String,
}

impl HttpKvClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl KvStore for HttpKvClient {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let response: GetResponse = self
            .http
            .get(format!("{}/kv/get", self.base_url))
            .query(&[("key", key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("malformed get response for key {key}"))?;
        Ok(response.value)
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.http
            .post(format!("{}/kv/set", self.base_url))
            .json(&SetRequest {
                key: key.to_string(),
                value,
            })
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("store rejected write for key {key}"))?;
        Ok(())
    }

    async fn get_with_prefix(&self, prefix: &str) -> Result<Vec<KvRecord>> {
        // Some stores answer a literal `null` instead of an empty array when
        // nothing matches; treat that as the empty scan it means.
        let records: Option<Vec<KvRecord>> = self
            .http
            .get(format!("{}/kv/prefix", self.base_url))
            .query(&[("prefix", prefix)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("malformed prefix scan response for prefix {prefix}"))?;
        Ok(records.unwrap_or_default())
    }
}

/// In-memory store used by tests and offline runs. Scan order is key order.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_with_prefix(&self, prefix: &str) -> Result<Vec<KvRecord>> {
        let entries = self.entries.lock().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| KvRecord {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
