//! In-memory doubles shared across unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::persistence::LocalPersistence;
use crate::remote::{JsonMap, RecordKind, RemoteStore};

/// Build a payload carrying a single `name` field.
pub fn named_payload(name: &str) -> JsonMap {
    let mut payload = JsonMap::new();
    payload.insert("name".to_string(), serde_json::Value::String(name.into()));
    payload
}

/// Scriptable remote store recording every call.
pub struct MockRemote {
    fail_all: AtomicBool,
    fail_names: Mutex<Vec<String>>,
    next_id: AtomicU64,
    create_attempts: Mutex<Vec<(RecordKind, JsonMap)>>,
    updates: Mutex<Vec<(RecordKind, String, JsonMap)>>,
    deletes: Mutex<Vec<(RecordKind, String)>>,
    query_results: Mutex<Vec<JsonMap>>,
}

impl MockRemote {
    pub fn new() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            fail_all: AtomicBool::new(false),
            fail_names: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            create_attempts: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            query_results: Mutex::new(Vec::new()),
        })
    }

    /// A remote that rejects every create
    pub fn failing() -> std::sync::Arc<Self> {
        let remote = Self::new();
        remote.fail_all.store(true, Ordering::SeqCst);
        remote
    }

    /// Reject creates whose payload `name` matches
    pub fn fail_name(&self, name: &str) {
        self.fail_names.lock().unwrap().push(name.to_string());
    }

    pub fn clear_failures(&self) {
        self.fail_all.store(false, Ordering::SeqCst);
        self.fail_names.lock().unwrap().clear();
    }

    /// Every create attempt, including rejected ones, in call order
    pub fn create_attempts(&self) -> Vec<(RecordKind, JsonMap)> {
        self.create_attempts.lock().unwrap().clone()
    }

    /// `name` field of every create attempt, in call order
    pub fn attempted_names(&self) -> Vec<String> {
        self.create_attempts()
            .into_iter()
            .filter_map(|(_, payload)| {
                payload
                    .get("name")
                    .and_then(|v| v.as_str())
                    .map(ToString::to_string)
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(RecordKind, String, JsonMap)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<(RecordKind, String)> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn set_query_results(&self, rows: Vec<JsonMap>) {
        *self.query_results.lock().unwrap() = rows;
    }

    fn should_fail(&self, payload: &JsonMap) -> bool {
        if self.fail_all.load(Ordering::SeqCst) {
            return true;
        }
        let Some(name) = payload.get("name").and_then(|v| v.as_str()) else {
            return false;
        };
        self.fail_names.lock().unwrap().iter().any(|n| n == name)
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn create(&self, kind: RecordKind, payload: &JsonMap) -> Result<String> {
        self.create_attempts
            .lock()
            .unwrap()
            .push((kind, payload.clone()));
        if self.should_fail(payload) {
            return Err(Error::Remote("injected failure".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(format!("remote-{id}"))
    }

    async fn update(&self, kind: RecordKind, id: &str, payload: &JsonMap) -> Result<()> {
        self.updates
            .lock()
            .unwrap()
            .push((kind, id.to_string(), payload.clone()));
        Ok(())
    }

    async fn delete(&self, kind: RecordKind, id: &str) -> Result<()> {
        self.deletes.lock().unwrap().push((kind, id.to_string()));
        Ok(())
    }

    async fn query(
        &self,
        _kind: RecordKind,
        _field: &str,
        _value: &serde_json::Value,
    ) -> Result<Vec<JsonMap>> {
        Ok(self.query_results.lock().unwrap().clone())
    }
}

/// Persistence backend that is permanently unavailable.
pub struct FailingPersistence;

#[async_trait]
impl LocalPersistence for FailingPersistence {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Err(Error::Persistence("storage unavailable".to_string()))
    }

    async fn set(&self, _key: &str, _value: &[u8]) -> Result<()> {
        Err(Error::Persistence("storage unavailable".to_string()))
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Err(Error::Persistence("storage unavailable".to_string()))
    }
}
