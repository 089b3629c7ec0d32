// CRUD + query operations over the in-memory document tree.
//
// These are plain, synchronous, lock-free functions: the only
// synchronization in the store is the single mutex guarding the tree
// (see `interface_adapters::state::DocumentStore`), so the use cases
// here never need to know about async or locking at all.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::{Collection, Document, StoreError};

pub type Collections = HashMap<Collection, HashMap<String, Document>>;

pub fn empty_collections() -> Collections {
    Collection::ALL
        .into_iter()
        .map(|c| (c, HashMap::new()))
        .collect()
}

pub fn create(
    collections: &mut Collections,
    collection: Collection,
    mut data: Document,
) -> Result<Document, StoreError> {
    let id = Uuid::new_v4().to_string();
    data.insert("id".to_string(), Value::String(id.clone()));
    data.insert("createdAt".to_string(), json!(Utc::now().to_rfc3339()));

    if collection.is_identity_collection() {
        data.entry("lastLoginAt".to_string()).or_insert(Value::Null);
        data.insert("online".to_string(), Value::Bool(false));
    }

    let bucket = collections
        .get_mut(&collection)
        .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
    bucket.insert(id, data.clone());
    Ok(data)
}

pub fn read(
    collections: &Collections,
    collection: Collection,
    id: &str,
) -> Result<Document, StoreError> {
    let bucket = collections
        .get(&collection)
        .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
    bucket.get(id).cloned().ok_or(StoreError::NotFound)
}

pub fn update(
    collections: &mut Collections,
    collection: Collection,
    id: &str,
    mut patch: Document,
) -> Result<Document, StoreError> {
    // `id` in the patch is dropped: the record's identity never changes.
    patch.remove("id");

    let bucket = collections
        .get_mut(&collection)
        .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
    let existing = bucket.get_mut(id).ok_or(StoreError::NotFound)?;
    for (key, value) in patch {
        existing.insert(key, value);
    }
    Ok(existing.clone())
}

pub fn delete(
    collections: &mut Collections,
    collection: Collection,
    id: &str,
) -> Result<Document, StoreError> {
    let bucket = collections
        .get_mut(&collection)
        .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
    bucket.remove(id).ok_or(StoreError::NotFound)?;
    Ok(json_record(id, true))
}

pub fn query(
    collections: &Collections,
    collection: Collection,
    filter: &Document,
) -> Result<Vec<Document>, StoreError> {
    let bucket = collections
        .get(&collection)
        .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

    let matches = bucket
        .values()
        .filter(|record| filter.iter().all(|(k, v)| record.get(k) == Some(v)))
        .cloned()
        .collect();
    Ok(matches)
}

fn json_record(id: &str, deleted: bool) -> Document {
    let mut map = Document::new();
    map.insert("id".to_string(), Value::String(id.to_string()));
    map.insert("deleted".to_string(), Value::Bool(deleted));
    map
}
