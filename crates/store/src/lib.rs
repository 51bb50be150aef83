//! Durable document store for AgroSense readings
//!
//! The ingestion loop only depends on the [`DocumentStore`] capability:
//! - [`FirestoreStore`] persists to Firestore over its REST API
//! - [`MemoryStore`] keeps documents in process, for dry runs and tests

#![warn(missing_docs)]

pub mod document;
pub mod firestore;
pub mod memory;

pub use document::{DocumentStore, ReadingDocument, StoreError, SEQUENCE_FIELD, TIMESTAMP_FIELD};
pub use firestore::{FirestoreConfig, FirestoreStore};
pub use memory::MemoryStore;
