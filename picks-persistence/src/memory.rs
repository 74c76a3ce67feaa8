use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::store::{DocumentMutation, DocumentStore, FieldUpdate, StoreError};

type Documents = HashMap<(String, String), Value>;

/// In-memory document store used by tests and local development.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<Documents>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a transport outage; every operation fails until cleared.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("store is offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn key(collection: &str, id: &str) -> (String, String) {
        (collection.to_string(), id.to_string())
    }
}

/// Walk a dotted path, creating intermediate objects for sets and leaving
/// the document untouched for deletes of missing branches.
fn apply_field(doc: &mut Value, path: &str, update: &FieldUpdate) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let leaf = segments.pop().expect("field path is never empty");

    if !doc.is_object() {
        *doc = Value::Object(Map::new());
    }
    let mut current = doc;
    for segment in segments {
        let object = current.as_object_mut().expect("checked above");
        let entry = object
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = entry;
    }

    let object = current.as_object_mut().expect("checked above");
    match update {
        FieldUpdate::Set(value) => {
            object.insert(leaf.to_string(), value.clone());
        }
        FieldUpdate::Delete => {
            object.remove(leaf);
        }
    }
}

fn apply_mutation(docs: &mut Documents, mutation: &DocumentMutation) {
    let key = MemoryStore::key(&mutation.collection, &mutation.id);
    let doc = docs.entry(key).or_insert_with(|| Value::Object(Map::new()));
    for (path, update) in &mutation.fields {
        apply_field(doc, path, update);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.check_online()?;
        let docs = self.docs.read().await;
        Ok(docs.get(&Self::key(collection, id)).cloned())
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        self.check_online()?;
        let mut docs = self.docs.write().await;
        docs.insert(Self::key(collection, id), data);
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Vec<(String, FieldUpdate)>,
    ) -> Result<(), StoreError> {
        self.check_online()?;
        let mut docs = self.docs.write().await;
        apply_mutation(
            &mut docs,
            &DocumentMutation {
                collection: collection.to_string(),
                id: id.to_string(),
                fields,
            },
        );
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check_online()?;
        let mut docs = self.docs.write().await;
        docs.remove(&Self::key(collection, id));
        Ok(())
    }

    async fn batch(&self, mutations: Vec<DocumentMutation>) -> Result<(), StoreError> {
        self.check_online()?;
        // one write guard across the whole batch keeps it atomic
        let mut docs = self.docs.write().await;
        for mutation in &mutations {
            apply_mutation(&mut docs, mutation);
        }
        Ok(())
    }
}
