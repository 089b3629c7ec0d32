// Maps one `protocol::Request` onto a `DocumentStore` operation and
// back onto a `protocol::Response`.
//
// The generic envelope carries `{action, data}` uniformly across
// every peer link; for the store, `action` is one of
// create|read|update|delete|query and `data` additionally carries the
// collection name plus whatever that operation needs.

use protocol::{Request, Response};
use serde::Deserialize;
use serde_json::json;

use crate::domain::{Collection, Document, StoreError};
use crate::interface_adapters::state::DocumentStore;

#[derive(Debug, Deserialize)]
struct StorePayload {
    collection: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    data: Document,
    #[serde(default)]
    filter: Document,
}

pub async fn dispatch(store: &DocumentStore, request: Request) -> Response {
    let payload: StorePayload = match serde_json::from_value(request.data) {
        Ok(payload) => payload,
        Err(e) => return Response::error(format!("invalid request payload: {e}")),
    };

    let collection = match Collection::parse(&payload.collection) {
        Some(collection) => collection,
        None => return Response::error(format!("unknown collection: {}", payload.collection)),
    };

    let result = match request.action.as_str() {
        "create" => store.create(collection, payload.data).await.map(|r| json!(r)),
        "read" => match payload.id {
            Some(id) => store.read(collection, &id).await.map(|r| json!(r)),
            None => return Response::error("id is required"),
        },
        "update" => match payload.id {
            Some(id) => store
                .update(collection, &id, payload.data)
                .await
                .map(|r| json!(r)),
            None => return Response::error("id is required"),
        },
        "delete" => match payload.id {
            Some(id) => store.delete(collection, &id).await.map(|r| json!(r)),
            None => return Response::error("id is required"),
        },
        "query" => store
            .query(collection, &payload.filter)
            .await
            .map(|records| json!(records)),
        other => return Response::error(format!("unrecognised action: {other}")),
    };

    match result {
        Ok(data) => Response::ok(data),
        Err(StoreError::NotFound) => Response::error("record not found"),
        Err(StoreError::UnknownCollection(name)) => {
            Response::error(format!("unknown collection: {name}"))
        }
        Err(StoreError::Persist(e)) => Response::error(format!("storage failure: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Status;
    use serde_json::json;

    async fn test_store() -> DocumentStore {
        let dir = tempfile::tempdir().unwrap();
        DocumentStore::load(dir.path().join("store.json")).await.unwrap()
    }

    #[tokio::test]
    async fn create_then_read_round_trips_through_dispatch() {
        let store = test_store().await;
        let create_req = Request {
            action: "create".to_string(),
            data: json!({"collection": "Player", "data": {"name": "alice"}}),
        };
        let created = dispatch(&store, create_req).await;
        assert_eq!(created.status, Status::Success);
        let id = created.data.unwrap()["id"].as_str().unwrap().to_string();

        let read_req = Request {
            action: "read".to_string(),
            data: json!({"collection": "Player", "id": id}),
        };
        let read = dispatch(&store, read_req).await;
        assert_eq!(read.data.unwrap()["name"], json!("alice"));
    }

    #[tokio::test]
    async fn read_on_an_unknown_collection_errors() {
        let store = test_store().await;
        let req = Request {
            action: "read".to_string(),
            data: json!({"collection": "Nope", "id": "x"}),
        };
        let resp = dispatch(&store, req).await;
        assert_eq!(resp.status, Status::Error);
    }

    #[tokio::test]
    async fn unrecognised_action_yields_an_error_frame() {
        let store = test_store().await;
        let req = Request {
            action: "drop-table".to_string(),
            data: json!({"collection": "Player"}),
        };
        let resp = dispatch(&store, req).await;
        assert_eq!(resp.status, Status::Error);
    }
}
