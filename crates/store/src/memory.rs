//! In-memory document store
//!
//! Backs offline dry runs of the ingestion service and every test that needs
//! a store. Failures and latency can be injected.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::document::{DocumentStore, ReadingDocument, StoreError};

/// Store keeping documents in an ordered map
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<String, ReadingDocument>>,
    failing_puts: AtomicU32,
    unavailable: AtomicBool,
    put_delay: Mutex<Option<Duration>>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with documents, as left behind by an earlier run
    pub fn with_documents<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = (String, ReadingDocument)>,
    {
        let store = Self::new();
        if let Ok(mut map) = store.documents.lock() {
            map.extend(documents);
        }
        store
    }

    /// Make the next `count` puts fail with a quota error
    pub fn fail_next_puts(&self, count: u32) {
        self.failing_puts.store(count, Ordering::SeqCst);
    }

    /// Make every call fail as if the store were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every put, to exercise caller timeouts
    pub fn set_put_delay(&self, delay: Option<Duration>) {
        if let Ok(mut slot) = self.put_delay.lock() {
            *slot = delay;
        }
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.lock().map(|map| map.len()).unwrap_or(0)
    }

    /// True when no document is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the document under `key`
    pub fn get(&self, key: &str) -> Option<ReadingDocument> {
        self.documents
            .lock()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    /// All keys in ascending order
    pub fn keys(&self) -> Vec<String> {
        self.documents
            .lock()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }

    fn take_injected_failure(&self) -> bool {
        self.failing_puts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn lock_poisoned() -> StoreError {
        StoreError::Unavailable("memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query_max(&self, field: &str) -> Result<Option<ReadingDocument>, StoreError> {
        self.check_available()?;

        let map = self.documents.lock().map_err(|_| Self::lock_poisoned())?;
        let mut best: Option<(&ReadingDocument, f64)> = None;
        for doc in map.values() {
            let value = doc
                .numeric_field(field)
                .ok_or_else(|| StoreError::UnsupportedField(field.to_string()))?;
            if best.map_or(true, |(_, current)| value > current) {
                best = Some((doc, value));
            }
        }
        Ok(best.map(|(doc, _)| doc.clone()))
    }

    async fn put(&self, key: &str, document: &ReadingDocument) -> Result<(), StoreError> {
        let delay = *self.put_delay.lock().map_err(|_| Self::lock_poisoned())?;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.check_available()?;
        if self.take_injected_failure() {
            return Err(StoreError::Status {
                code: 429,
                body: "injected quota failure".to_string(),
            });
        }

        let mut stored = document.clone();
        stored.timestamp = Some(Utc::now());

        let mut map = self.documents.lock().map_err(|_| Self::lock_poisoned())?;
        if map.insert(key.to_string(), stored).is_some() {
            debug!(key, "overwrote existing document");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(sequence: u64) -> ReadingDocument {
        ReadingDocument {
            sequence,
            source_identifier: "127.0.0.1".to_string(),
            rain: 1.0,
            soil: 50.0,
            temp: 25.0,
            plant_health: 80.0,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_empty_store_has_no_max() {
        let store = MemoryStore::new();
        assert!(store.query_max("sequence").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_max_orders_numerically() {
        // Key order and sequence order disagree here on purpose
        let store = MemoryStore::with_documents(vec![
            ("b".to_string(), doc(9)),
            ("a".to_string(), doc(120)),
            ("c".to_string(), doc(15)),
        ]);
        let max = store.query_max("sequence").await.unwrap().unwrap();
        assert_eq!(max.sequence, 120);
    }

    #[tokio::test]
    async fn test_put_assigns_timestamp_and_upserts() {
        let store = MemoryStore::new();
        store.put("data_000001", &doc(1)).await.unwrap();
        store.put("data_000001", &doc(1)).await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("data_000001").unwrap().timestamp.is_some());
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let store = MemoryStore::new();
        store.fail_next_puts(1);
        assert!(matches!(
            store.put("k1", &doc(1)).await,
            Err(StoreError::Status { code: 429, .. })
        ));
        assert!(store.put("k2", &doc(2)).await.is_ok());
        assert_eq!(store.keys(), vec!["k2".to_string()]);
    }

    #[tokio::test]
    async fn test_unavailable_store_errors() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.query_max("sequence").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.put("k", &doc(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_unsupported_field() {
        let store = MemoryStore::with_documents(vec![("k".to_string(), doc(1))]);
        assert!(matches!(
            store.query_max("sourceIdentifier").await,
            Err(StoreError::UnsupportedField(_))
        ));
    }
}
