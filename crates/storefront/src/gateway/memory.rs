//! In-process document store.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use tg_store_core::RecordId;

use super::{Document, DocumentStore, Fields, GatewayError, Query};

type Collections = HashMap<String, BTreeMap<RecordId, Fields>>;

/// [`DocumentStore`] holding everything in memory.
///
/// Ids are random UUIDs. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<Mutex<Collections>>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a document under a caller-chosen id.
    pub fn insert(&self, collection: &str, id: impl Into<RecordId>, fields: Fields) {
        self.lock()
            .entry(collection.to_string())
            .or_default()
            .insert(id.into(), fields);
    }

    /// Every document in a collection, in id order.
    #[must_use]
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.lock().get(collection).map_or(0, BTreeMap::len)
    }

    /// Whether a collection has no documents.
    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create(&self, collection: &str, fields: Fields) -> Result<RecordId, GatewayError> {
        let id = RecordId::new(Uuid::new_v4().to_string());
        self.insert(collection, id.clone(), fields);
        debug!(collection, id = %id, "Document created");
        Ok(id)
    }

    async fn get(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> Result<Option<Document>, GatewayError> {
        Ok(self
            .lock()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.clone(),
                fields: fields.clone(),
            }))
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, GatewayError> {
        Ok(query.apply(self.documents(collection)))
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        fields: Fields,
    ) -> Result<(), GatewayError> {
        let mut collections = self.lock();
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| GatewayError::Api {
                status: 404,
                message: Some(format!("No document {id} in {collection}")),
            })?;
        existing.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), GatewayError> {
        if let Some(docs) = self.lock().get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};
    use testresult::TestResult;

    use super::*;

    fn fields(value: &Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get() -> TestResult {
        let store = InMemoryDocumentStore::new();
        let id = store.create("carts", fields(&json!({"quantity": 1}))).await?;

        let doc = store.get("carts", &id).await?.unwrap();
        assert_eq!(doc.field("quantity"), &json!(1));
        assert!(store.get("carts", &RecordId::new("missing")).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_merges_fields() -> TestResult {
        let store = InMemoryDocumentStore::new();
        store.insert("carts", "r1", fields(&json!({"name": "Widget", "quantity": 1})));

        store
            .update("carts", &RecordId::new("r1"), fields(&json!({"quantity": 4})))
            .await?;

        let doc = store.get("carts", &RecordId::new("r1")).await?.unwrap();
        assert_eq!(doc.field("name"), &json!("Widget"));
        assert_eq!(doc.field("quantity"), &json!(4));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let err = store
            .update("carts", &RecordId::new("nope"), Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_query_filters_and_orders() -> TestResult {
        let store = InMemoryDocumentStore::new();
        store.insert("carts", "a", fields(&json!({"userId": "1", "name": "Pear"})));
        store.insert("carts", "b", fields(&json!({"userId": "2", "name": "Apple"})));
        store.insert("carts", "c", fields(&json!({"userId": "1", "name": "Fig"})));

        let docs = store
            .query("carts", &Query::new().where_eq("userId", "1").order_by("name"))
            .await?;
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() -> TestResult {
        let store = InMemoryDocumentStore::new();
        store.insert("carts", "a", Fields::new());
        store.delete("carts", &RecordId::new("a")).await?;
        store.delete("carts", &RecordId::new("a")).await?;
        assert!(store.is_empty("carts"));
        Ok(())
    }
}
