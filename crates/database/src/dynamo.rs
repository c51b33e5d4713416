use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoClient;
use orgboard_core::{Document, StoreError};
use serde_json::Value;
use uuid::Uuid;

use crate::store::{order_documents, DocumentStore, SortDirection};

/// Single-table DynamoDB document store: PK is the collection name, SK the
/// document id. DynamoDB only orders within a partition by sort key, so
/// ordered scans sort client-side after fetching the partition.
pub struct DynamoDocumentStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoDocumentStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub async fn from_env(table_name: impl Into<String>) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(DynamoClient::new(&config), table_name)
    }

    async fn query_partition(
        &self,
        collection: &str,
        filter: Option<(&str, &str)>,
    ) -> Result<Vec<Document>, StoreError> {
        let mut rows = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;
        loop {
            let mut request = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("PK = :pk")
                .expression_attribute_values(":pk", AttributeValue::S(collection.to_string()));
            if let Some((field, equals)) = filter {
                request = request
                    .filter_expression("#field = :value")
                    .expression_attribute_names("#field", field)
                    .expression_attribute_values(":value", AttributeValue::S(equals.to_string()));
            }
            if let Some(key) = start_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let response = request
                .send()
                .await
                .map_err(|e| map_dynamo_error(format!("{:?}", e)))?;
            rows.extend(response.items().iter().map(document_from_item));

            match response.last_evaluated_key() {
                Some(key) => start_key = Some(key.clone()),
                None => break,
            }
        }
        Ok(rows)
    }
}

fn map_dynamo_error(message: String) -> StoreError {
    tracing::error!("DynamoDB error: {}", message);
    if message.contains("ConditionalCheckFailedException") {
        StoreError::NotFound
    } else if message.contains("AccessDeniedException") {
        StoreError::PermissionDenied
    } else {
        StoreError::Transient(message)
    }
}

fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(key, value)| (key.clone(), to_attribute(value)))
                .collect(),
        ),
    }
}

fn from_attribute(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => {
            if let Ok(integer) = n.parse::<i64>() {
                Value::Number(integer.into())
            } else {
                n.parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(items) => Value::Array(items.iter().map(from_attribute).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), from_attribute(value)))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn document_from_item(item: &HashMap<String, AttributeValue>) -> Document {
    let mut doc = Document::new();
    for (key, value) in item {
        if key == "PK" || key == "SK" {
            continue;
        }
        doc.insert(key.clone(), from_attribute(value));
    }
    if let Some(AttributeValue::S(id)) = item.get("SK") {
        doc.insert("id".to_string(), Value::String(id.clone()));
    }
    doc
}

#[async_trait]
impl DocumentStore for DynamoDocumentStore {
    async fn insert(&self, collection: &str, fields: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(collection.to_string()))
            .item("SK", AttributeValue::S(id.clone()));
        for (key, value) in &fields {
            request = request.item(key, to_attribute(value));
        }
        request
            .send()
            .await
            .map_err(|e| map_dynamo_error(format!("{:?}", e)))?;
        Ok(id)
    }

    async fn scan_all(
        &self,
        collection: &str,
        order_by: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, StoreError> {
        let mut rows = self.query_partition(collection, None).await?;
        order_documents(&mut rows, order_by, direction);
        Ok(rows)
    }

    async fn scan_where(
        &self,
        collection: &str,
        field: &str,
        equals: &str,
    ) -> Result<Vec<Document>, StoreError> {
        self.query_partition(collection, Some((field, equals))).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<Document, StoreError> {
        // An empty patch would render an invalid `SET` expression; treat it
        // as a no-op merge returning the current document.
        if patch.is_empty() {
            let response = self
                .client
                .get_item()
                .table_name(&self.table_name)
                .key("PK", AttributeValue::S(collection.to_string()))
                .key("SK", AttributeValue::S(id.to_string()))
                .send()
                .await
                .map_err(|e| map_dynamo_error(format!("{:?}", e)))?;
            return match response.item() {
                Some(item) => Ok(document_from_item(item)),
                None => Err(StoreError::NotFound),
            };
        }

        let mut assignments = Vec::with_capacity(patch.len());
        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(collection.to_string()))
            .key("SK", AttributeValue::S(id.to_string()))
            .condition_expression("attribute_exists(SK)")
            .return_values(ReturnValue::AllNew);
        for (index, (key, value)) in patch.iter().enumerate() {
            let name = format!("#f{}", index);
            let placeholder = format!(":v{}", index);
            assignments.push(format!("{} = {}", name, placeholder));
            request = request
                .expression_attribute_names(name, key)
                .expression_attribute_values(placeholder, to_attribute(value));
        }
        let response = request
            .update_expression(format!("SET {}", assignments.join(", ")))
            .send()
            .await
            .map_err(|e| map_dynamo_error(format!("{:?}", e)))?;

        match response.attributes() {
            Some(item) => Ok(document_from_item(item)),
            None => Err(StoreError::Transient(
                "update returned no attributes".to_string(),
            )),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(collection.to_string()))
            .key("SK", AttributeValue::S(id.to_string()))
            .condition_expression("attribute_exists(SK)")
            .send()
            .await
            .map_err(|e| map_dynamo_error(format!("{:?}", e)))?;
        Ok(())
    }
}
