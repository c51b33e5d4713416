use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use orgboard_core::{Document, StoreError};
use serde_json::Value;
use uuid::Uuid;

use crate::store::{order_documents, DocumentStore, SortDirection};

/// In-process document store backing tests and local development.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn with_id(id: &str, fields: &Document) -> Document {
    let mut doc = fields.clone();
    doc.insert("id".to_string(), Value::String(id.to_string()));
    doc
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, fields: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn scan_all(
        &self,
        collection: &str,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.lock().unwrap();
        let mut rows: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.iter().map(|(id, fields)| with_id(id, fields)).collect())
            .unwrap_or_default();
        order_documents(&mut rows, order_by, direction);
        Ok(rows)
    }

    async fn scan_where(
        &self,
        collection: &str,
        field: &str,
        equals: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.lock().unwrap();
        let rows = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| {
                        fields.get(field).and_then(Value::as_str) == Some(equals)
                    })
                    .map(|(id, fields)| with_id(id, fields))
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.lock().unwrap();
        let fields = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or(StoreError::NotFound)?;
        for (key, value) in patch {
            // The store owns the id; a patched one must not shadow it.
            if key == "id" {
                continue;
            }
            fields.insert(key, value);
        }
        Ok(with_id(id, fields))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().unwrap();
        collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(pairs: &[(&str, &str)]) -> Document {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[tokio::test]
    async fn scan_all_orders_by_field_with_id_tiebreak() {
        let store = MemoryDocumentStore::new();
        let a = store
            .insert("things", doc(&[("created_at", "2024-01-02")]))
            .await
            .unwrap();
        let b = store
            .insert("things", doc(&[("created_at", "2024-01-01")]))
            .await
            .unwrap();
        let c = store
            .insert("things", doc(&[("created_at", "2024-01-02")]))
            .await
            .unwrap();

        let rows = store
            .scan_all("things", "created_at", SortDirection::Descending)
            .await
            .unwrap();
        let ids: Vec<&str> = rows
            .iter()
            .map(|d| d.get("id").and_then(Value::as_str).unwrap())
            .collect();

        // The two 2024-01-02 documents come first, ordered by id ascending.
        let mut newest = [a.as_str(), c.as_str()];
        newest.sort();
        assert_eq!(ids, vec![newest[0], newest[1], b.as_str()]);
    }

    #[tokio::test]
    async fn scan_where_filters_on_equality() {
        let store = MemoryDocumentStore::new();
        store
            .insert("things", doc(&[("owner_id", "u1"), ("name", "first")]))
            .await
            .unwrap();
        store
            .insert("things", doc(&[("owner_id", "u2"), ("name", "second")]))
            .await
            .unwrap();

        let rows = store.scan_where("things", "owner_id", "u1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name").and_then(Value::as_str), Some("first"));
    }

    #[tokio::test]
    async fn update_merges_and_returns_the_full_document() {
        let store = MemoryDocumentStore::new();
        let id = store
            .insert("things", doc(&[("name", "before"), ("kept", "yes")]))
            .await
            .unwrap();

        let merged = store
            .update("things", &id, doc(&[("name", "after")]))
            .await
            .unwrap();
        assert_eq!(merged.get("name").and_then(Value::as_str), Some("after"));
        assert_eq!(merged.get("kept").and_then(Value::as_str), Some("yes"));
        assert_eq!(merged.get("id").and_then(Value::as_str), Some(id.as_str()));
    }

    #[tokio::test]
    async fn update_ignores_a_patched_id() {
        let store = MemoryDocumentStore::new();
        let id = store
            .insert("things", doc(&[("name", "before")]))
            .await
            .unwrap();

        let merged = store
            .update("things", &id, doc(&[("id", "spoofed"), ("name", "after")]))
            .await
            .unwrap();
        assert_eq!(merged.get("id").and_then(Value::as_str), Some(id.as_str()));

        // The spoofed id never reaches the stored body.
        let rows = store.scan_where("things", "id", "spoofed").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn update_with_an_empty_patch_is_a_no_op_merge() {
        let store = MemoryDocumentStore::new();
        let id = store
            .insert("things", doc(&[("name", "kept")]))
            .await
            .unwrap();

        let merged = store.update("things", &id, Document::new()).await.unwrap();
        assert_eq!(merged.get("name").and_then(Value::as_str), Some("kept"));
    }

    #[tokio::test]
    async fn missing_ids_are_reported_as_not_found() {
        let store = MemoryDocumentStore::new();
        assert!(matches!(
            store.update("things", "nope", Document::new()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.delete("things", "nope").await,
            Err(StoreError::NotFound)
        ));
    }
}
