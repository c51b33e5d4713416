use async_trait::async_trait;
use orgboard_core::{Document, StoreError};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Abstract document database, one namespace per named collection.
///
/// Documents returned by scans carry their store-assigned id under the
/// `"id"` key. Ordered scans break ties on equal keys by id ascending so
/// repeated reads are deterministic.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert with a generated id; returns the id.
    async fn insert(&self, collection: &str, fields: Document) -> Result<String, StoreError>;

    async fn scan_all(
        &self,
        collection: &str,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, StoreError>;

    /// Equality-filtered scan; result order is unspecified.
    async fn scan_where(
        &self,
        collection: &str,
        field: &str,
        equals: &str,
    ) -> Result<Vec<Document>, StoreError>;

    /// Partial merge into an existing document; returns the merged result.
    /// Fails with `StoreError::NotFound` for a missing id.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<Document, StoreError>;

    /// Fails with `StoreError::NotFound` for a missing id, never silently.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// Shared ordering used by store implementations: by `order_by` in the
/// requested direction, then by id ascending for equal keys.
pub(crate) fn order_documents(rows: &mut [Document], order_by: &str, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ka = sort_key(a, order_by);
        let kb = sort_key(b, order_by);
        let ordering = match direction {
            SortDirection::Ascending => ka.cmp(&kb),
            SortDirection::Descending => kb.cmp(&ka),
        };
        ordering.then_with(|| id_of(a).cmp(id_of(b)))
    });
}

fn sort_key(doc: &Document, field: &str) -> String {
    match doc.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn id_of(doc: &Document) -> &str {
    doc.get("id").and_then(Value::as_str).unwrap_or_default()
}
