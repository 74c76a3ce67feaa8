use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Transport-level store failures. Absence of a document is never an
/// error: `get` returns `Ok(None)` so callers can tell "not there" apart
/// from "couldn't ask".
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("document store operation timed out")]
    Timeout,
    #[error("stored document is malformed: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout)
    }
}

/// A single field change within a document update.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Set(Value),
    Delete,
}

/// One document's worth of field changes, for cross-document batches.
#[derive(Debug, Clone)]
pub struct DocumentMutation {
    pub collection: String,
    pub id: String,
    pub fields: Vec<(String, FieldUpdate)>,
}

/// The keyed document store the engine runs against. Field paths are
/// dot-separated ("picks.gw3"); all field changes within one `update`
/// call apply atomically, which is what lets release-and-pick delete the
/// old slot and write the new one without an observable gap.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError>;

    /// Updating a missing document creates it.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Vec<(String, FieldUpdate)>,
    ) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Apply mutations across several documents atomically.
    async fn batch(&self, mutations: Vec<DocumentMutation>) -> Result<(), StoreError>;
}
