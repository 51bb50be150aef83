//! Firestore REST adapter
//!
//! Talks to the Firestore v1 REST API (or the local emulator) with `reqwest`.
//! Credentials are provisioned outside this crate and passed in as a bearer
//! token.
//!
//! - `put` issues a `:commit` with a single `update` write, which upserts the
//!   document, plus a `REQUEST_TIME` transform so the server stamps `timestamp`.
//! - `query_max` issues a `:runQuery` ordered descending, limit 1.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::document::{DocumentStore, ReadingDocument, StoreError, TIMESTAMP_FIELD};

const PRODUCTION_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

/// Connection settings for [`FirestoreStore`]
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// GCP project id
    pub project_id: String,
    /// Database id, usually `(default)`
    pub database: String,
    /// Collection holding the readings
    pub collection: String,
    /// OAuth2 bearer token; not needed against the emulator
    pub access_token: Option<String>,
    /// `host:port` of a Firestore emulator
    pub emulator_host: Option<String>,
    /// Upper bound for every HTTP call
    pub timeout: Duration,
}

/// Document store backed by Firestore
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: Client,
    config: FirestoreConfig,
}

impl FirestoreStore {
    /// Build the HTTP client with the configured timeout
    pub fn new(config: FirestoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        match &self.config.emulator_host {
            Some(host) => format!("http://{}/v1", host),
            None => PRODUCTION_ENDPOINT.to_string(),
        }
    }

    /// Resource name of the documents root
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.config.project_id, self.config.database
        )
    }

    /// Full resource name of the document under `key`
    pub fn document_name(&self, key: &str) -> String {
        format!("{}/{}/{}", self.documents_root(), self.config.collection, key)
    }

    fn post(&self, method: &str) -> RequestBuilder {
        let url = format!("{}/{}:{}", self.endpoint(), self.documents_root(), method);
        let request = self.client.post(url);
        match (&self.config.access_token, &self.config.emulator_host) {
            (Some(token), None) => request.bearer_auth(token),
            _ => request,
        }
    }

    async fn send(&self, request: RequestBuilder, body: Value) -> Result<Value, StoreError> {
        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                code: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn map_transport(&self, error: reqwest::Error) -> StoreError {
        if error.is_timeout() {
            StoreError::Timeout(self.config.timeout)
        } else {
            StoreError::Transport(error.to_string())
        }
    }

    /// Body of the `:commit` request for one upsert
    pub fn commit_body(&self, key: &str, document: &ReadingDocument) -> Value {
        json!({
            "writes": [{
                "update": {
                    "name": self.document_name(key),
                    "fields": encode_fields(document),
                },
                "updateTransforms": [{
                    "fieldPath": TIMESTAMP_FIELD,
                    "setToServerValue": "REQUEST_TIME",
                }],
            }]
        })
    }

    /// Body of the `:runQuery` request for the max of `field`
    pub fn max_query_body(&self, field: &str) -> Value {
        json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.config.collection }],
                "orderBy": [{
                    "field": { "fieldPath": field },
                    "direction": "DESCENDING",
                }],
                "limit": 1,
            }
        })
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn query_max(&self, field: &str) -> Result<Option<ReadingDocument>, StoreError> {
        let response = self
            .send(self.post("runQuery"), self.max_query_body(field))
            .await?;
        decode_query_response(&response)
    }

    async fn put(&self, key: &str, document: &ReadingDocument) -> Result<(), StoreError> {
        let response = self
            .send(self.post("commit"), self.commit_body(key, document))
            .await?;
        debug!(key, commit_time = ?response.get("commitTime"), "firestore commit");
        Ok(())
    }
}

/// Encode a document into Firestore typed `fields`; `timestamp` is left to the server
pub fn encode_fields(document: &ReadingDocument) -> Value {
    json!({
        "sequence": { "integerValue": document.sequence.to_string() },
        "sourceIdentifier": { "stringValue": document.source_identifier },
        "rain": { "doubleValue": document.rain },
        "soil": { "doubleValue": document.soil },
        "temp": { "doubleValue": document.temp },
        "plant_health": { "doubleValue": document.plant_health },
    })
}

/// Decode the streamed `:runQuery` response array.
///
/// An empty collection yields elements carrying only `readTime`.
pub fn decode_query_response(response: &Value) -> Result<Option<ReadingDocument>, StoreError> {
    let results = response
        .as_array()
        .ok_or_else(|| StoreError::Decode("runQuery response is not an array".to_string()))?;

    results
        .iter()
        .find_map(|entry| entry.get("document"))
        .map(decode_document)
        .transpose()
}

/// Decode a single Firestore document resource
pub fn decode_document(document: &Value) -> Result<ReadingDocument, StoreError> {
    let empty = Map::new();
    let fields = document
        .get("fields")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let sequence = fields
        .get("sequence")
        .and_then(integer_value)
        .ok_or_else(|| StoreError::Decode("document has no integer 'sequence'".to_string()))?;
    let sequence = u64::try_from(sequence)
        .map_err(|_| StoreError::Decode(format!("negative sequence {}", sequence)))?;

    let number = |name: &str| fields.get(name).and_then(double_value).unwrap_or(0.0);

    Ok(ReadingDocument {
        sequence,
        source_identifier: fields
            .get("sourceIdentifier")
            .and_then(|v| v.get("stringValue"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        rain: number("rain"),
        soil: number("soil"),
        temp: number("temp"),
        plant_health: number("plant_health"),
        timestamp: fields.get(TIMESTAMP_FIELD).and_then(timestamp_value),
    })
}

fn integer_value(value: &Value) -> Option<i64> {
    if let Some(raw) = value.get("integerValue") {
        // int64 travels as a JSON string
        return match raw {
            Value::String(s) => s.parse().ok(),
            other => other.as_i64(),
        };
    }
    value
        .get("doubleValue")
        .and_then(Value::as_f64)
        .filter(|f| f.fract() == 0.0)
        .map(|f| f as i64)
}

fn double_value(value: &Value) -> Option<f64> {
    value
        .get("doubleValue")
        .and_then(Value::as_f64)
        .or_else(|| integer_value(value).map(|i| i as f64))
}

fn timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    value
        .get("timestampValue")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
