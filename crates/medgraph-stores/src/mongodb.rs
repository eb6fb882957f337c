//! MongoDB document store implementation.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, info};

use medgraph_core::error::{MedGraphError, MedGraphResult};
use medgraph_core::traits::DocumentStore;
use medgraph_core::types::{fields, BatchOutcome, Document, EntitySchema, UpsertInstruction, WriteFailure};
use medgraph_core::StoreConfig;

use mongodb::{
    bson::{doc, Bson, DateTime as BsonDateTime, Document as BsonDocument},
    options::{ClientOptions, IndexOptions, ReplaceOptions},
    Client, Collection, Database, IndexModel,
};

/// MongoDB-backed canonical store.
pub struct MongoDocumentStore {
    client: Client,
    database: String,
}

impl MongoDocumentStore {
    /// Connect to the store described by `config`.
    pub async fn new(config: &StoreConfig) -> MedGraphResult<Self> {
        let mut client_options = ClientOptions::parse(&config.url)
            .await
            .map_err(|e| MedGraphError::store_connection(format!("Failed to parse MongoDB URL: {}", e)))?;
        client_options.app_name = Some("medgraph".to_string());

        let client = Client::with_options(client_options)
            .map_err(|e| MedGraphError::store_connection(format!("Failed to create MongoDB client: {}", e)))?;

        Ok(Self {
            client,
            database: config.database.clone(),
        })
    }

    /// Round-trip to the server.
    pub async fn ping(&self) -> MedGraphResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| MedGraphError::store_connection(format!("MongoDB is not reachable: {}", e)))?;
        Ok(())
    }

    fn db(&self) -> Database {
        self.client.database(&self.database)
    }

    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.db().collection(name)
    }
}

/// Match filter on the key fields.
fn key_filter(instruction: &UpsertInstruction) -> BsonDocument {
    instruction
        .key
        .fields()
        .into_iter()
        .map(|(field, value)| (field.to_string(), Bson::String(value.to_string())))
        .collect()
}

/// Translate an instruction into update operators. Empty operators are omitted.
fn update_document(instruction: &UpsertInstruction) -> BsonDocument {
    let timestamp = Bson::DateTime(BsonDateTime::from_millis(instruction.timestamp.timestamp_millis()));

    let mut set = BsonDocument::new();
    set.insert(fields::TYPE, instruction.label.as_str());
    set.insert(fields::UPDATED, timestamp.clone());
    for (name, value) in &instruction.set {
        set.insert(name.as_str(), json_to_bson(value.clone()));
    }

    let mut on_insert = BsonDocument::new();
    on_insert.insert(fields::CREATED, timestamp);

    let mut update = doc! {
        "$set": set,
        "$setOnInsert": on_insert,
    };

    if !instruction.add_to_set.is_empty() {
        let add: BsonDocument = instruction
            .add_to_set
            .iter()
            .map(|(name, values)| {
                let each: Vec<Bson> = values.iter().cloned().map(json_to_bson).collect();
                (name.clone(), Bson::Document(doc! { "$each": each }))
            })
            .collect();
        update.insert("$addToSet", add);
    }

    for (operator, values) in [("$max", &instruction.max), ("$min", &instruction.min)] {
        if values.is_empty() {
            continue;
        }
        let reduced: BsonDocument = values
            .iter()
            .map(|(name, value)| (name.clone(), json_to_bson(value.clone())))
            .collect();
        update.insert(operator, reduced);
    }

    update
}

fn count_field(response: &BsonDocument, field: &str) -> u64 {
    match response.get(field) {
        Some(Bson::Int32(n)) => *n as u64,
        Some(Bson::Int64(n)) => *n as u64,
        Some(Bson::Double(n)) => *n as u64,
        _ => 0,
    }
}

/// `{ field: { $in: ids } }`
fn in_filter(field: &str, ids: &[String]) -> BsonDocument {
    let mut values = BsonDocument::new();
    values.insert("$in", ids.to_vec());
    let mut filter = BsonDocument::new();
    filter.insert(field, values);
    filter
}

/// Read the reply of an `update` command.
fn parse_update_reply(response: &BsonDocument) -> MedGraphResult<BatchOutcome> {
    if let Ok(concern) = response.get_document("writeConcernError") {
        return Err(MedGraphError::store_write(format!(
            "Write concern failed: {}",
            concern.get_str("errmsg").unwrap_or("unknown")
        )));
    }

    let upserted = response
        .get_array("upserted")
        .map(|a| a.len() as u64)
        .unwrap_or(0);
    let n = count_field(response, "n");

    let write_errors = response
        .get_array("writeErrors")
        .map(|errors| {
            errors
                .iter()
                .filter_map(Bson::as_document)
                .map(|e| WriteFailure {
                    index: count_field(e, "index") as usize,
                    message: e.get_str("errmsg").unwrap_or("unknown write error").to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(BatchOutcome {
        matched: n.saturating_sub(upserted),
        modified: count_field(response, "nModified"),
        upserted,
        write_errors,
    })
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn ensure_indexes(&self, schema: &EntitySchema) -> MedGraphResult<()> {
        let collection = self.collection(schema.collection);

        let mut keys = BsonDocument::new();
        for field in schema.key_fields() {
            keys.insert(*field, 1);
        }
        let unique = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection
            .create_index(unique, None)
            .await
            .map_err(|e| MedGraphError::store_with_source(format!("Failed to create key index on {}", schema.collection), e))?;

        for field in schema.indexes {
            let mut keys = BsonDocument::new();
            keys.insert(*field, 1);
            let model = IndexModel::builder().keys(keys).build();
            collection
                .create_index(model, None)
                .await
                .map_err(|e| MedGraphError::store_with_source(format!("Failed to create index {}.{}", schema.collection, field), e))?;
        }

        debug!(collection = schema.collection, "Indexes created");
        Ok(())
    }

    async fn apply_batch(
        &self,
        collection: &str,
        instructions: &[UpsertInstruction],
    ) -> MedGraphResult<BatchOutcome> {
        if instructions.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let updates: Vec<BsonDocument> = instructions
            .iter()
            .map(|i| {
                doc! {
                    "q": key_filter(i),
                    "u": update_document(i),
                    "upsert": true,
                }
            })
            .collect();

        let response = self
            .db()
            .run_command(
                doc! {
                    "update": collection,
                    "updates": updates,
                    "ordered": false,
                },
                None,
            )
            .await
            .map_err(|e| MedGraphError::store_with_source(format!("Bulk upsert into {} failed", collection), e))?;

        parse_update_reply(&response)
    }

    async fn list_collections(&self) -> MedGraphResult<Vec<String>> {
        let mut names = self
            .db()
            .list_collection_names(None)
            .await
            .map_err(|e| MedGraphError::store_with_source("Failed to list collections", e))?;
        names.sort();
        Ok(names)
    }

    async fn find_all(&self, collection: &str) -> MedGraphResult<Vec<Document>> {
        let mut cursor = self
            .collection(collection)
            .find(None, None)
            .await
            .map_err(|e| MedGraphError::store_with_source(format!("Failed to read {}", collection), e))?;

        let mut documents = Vec::new();
        while cursor
            .advance()
            .await
            .map_err(|e| MedGraphError::store_with_source("Cursor error", e))?
        {
            let doc = cursor
                .deserialize_current()
                .map_err(|e| MedGraphError::store_with_source("Failed to deserialize", e))?;
            documents.push(doc.into_iter().map(|(k, v)| (k, bson_to_json(v))).collect());
        }
        Ok(documents)
    }

    async fn count(&self, collection: &str) -> MedGraphResult<u64> {
        self.collection(collection)
            .count_documents(doc! {}, None)
            .await
            .map_err(|e| MedGraphError::store_with_source(format!("Failed to count {}", collection), e))
    }

    async fn distinct_strings(&self, collection: &str, field: &str) -> MedGraphResult<HashSet<String>> {
        let values = self
            .collection(collection)
            .distinct(field, None, None)
            .await
            .map_err(|e| MedGraphError::store_with_source(format!("Failed to read distinct {}.{}", collection, field), e))?;
        Ok(values
            .into_iter()
            .filter_map(|v| match v {
                Bson::String(s) => Some(s),
                _ => None,
            })
            .collect())
    }

    async fn drop_collection(&self, collection: &str) -> MedGraphResult<()> {
        self.collection(collection)
            .drop(None)
            .await
            .map_err(|e| MedGraphError::store_with_source(format!("Failed to drop {}", collection), e))?;
        info!(collection, "Collection dropped");
        Ok(())
    }

    async fn delete_by_ids(&self, collection: &str, field: &str, ids: &[String]) -> MedGraphResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = self
            .collection(collection)
            .delete_many(in_filter(field, ids), None)
            .await
            .map_err(|e| MedGraphError::store_with_source(format!("Failed to delete from {}", collection), e))?;
        debug!(collection, deleted = result.deleted_count, "Documents deleted");
        Ok(result.deleted_count)
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
    ) -> MedGraphResult<()> {
        let filter = object_to_bson(filter);
        let replacement = object_to_bson(replacement);
        self.collection(collection)
            .replace_one(filter, replacement, ReplaceOptions::builder().upsert(true).build())
            .await
            .map_err(|e| MedGraphError::store_with_source(format!("Failed to replace document in {}", collection), e))?;
        Ok(())
    }
}

fn object_to_bson(map: Document) -> BsonDocument {
    map.into_iter().map(|(k, v)| (k, json_to_bson(v))).collect()
}

fn json_to_bson(value: serde_json::Value) -> Bson {
    match value {
        serde_json::Value::Null => Bson::Null,
        serde_json::Value::Bool(b) => Bson::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else if let Some(f) = n.as_f64() {
                Bson::Double(f)
            } else {
                Bson::Null
            }
        }
        serde_json::Value::String(s) => Bson::String(s),
        serde_json::Value::Array(arr) => Bson::Array(arr.into_iter().map(json_to_bson).collect()),
        serde_json::Value::Object(obj) => Bson::Document(object_to_bson(obj)),
    }
}

fn bson_to_json(value: Bson) -> serde_json::Value {
    match value {
        Bson::Null | Bson::Undefined => serde_json::Value::Null,
        Bson::Boolean(b) => serde_json::Value::Bool(b),
        Bson::Int32(i) => serde_json::Value::Number(i.into()),
        Bson::Int64(i) => serde_json::Value::Number(i.into()),
        Bson::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Bson::String(s) => serde_json::Value::String(s),
        Bson::Array(arr) => serde_json::Value::Array(arr.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => {
            serde_json::Value::Object(doc.into_iter().map(|(k, v)| (k, bson_to_json(v))).collect())
        }
        Bson::ObjectId(oid) => serde_json::Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(serde_json::Value::String)
            .unwrap_or(serde_json::Value::Null),
        _ => serde_json::Value::Null,
    }
}
