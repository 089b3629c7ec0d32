// Concrete `StorePort` over a single persistent TCP connection to the
// store. Requests never pipeline (protocol invariant: strictly
// request/response per connection), so one `Mutex<TcpStream>` per
// client is enough.

use async_trait::async_trait;
use protocol::{ProtocolError, Request, Response, Status, read_frame, write_frame};
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::domain::{Document, StoreClientError, StorePort};

pub struct StoreClient {
    conn: Mutex<TcpStream>,
}

impl StoreClient {
    pub async fn connect(addr: &str) -> std::io::Result<Self> {
        let conn = TcpStream::connect(addr).await?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    async fn call(&self, action: &str, data: serde_json::Value) -> Result<Response, StoreClientError> {
        let mut conn = self.conn.lock().await;
        let request = Request {
            action: action.to_string(),
            data,
        };
        write_frame(&mut *conn, &request)
            .await
            .map_err(|e| StoreClientError::Transport(e.to_string()))?;
        match read_frame(&mut *conn).await {
            Ok(response) => Ok(response),
            Err(ProtocolError::ConnectionClosed) => {
                Err(StoreClientError::Transport("store connection closed".to_string()))
            }
            Err(e) => Err(StoreClientError::Transport(e.to_string())),
        }
    }
}

fn into_document(value: serde_json::Value) -> Document {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Document::new(),
    }
}

fn unwrap_response(response: Response) -> Result<serde_json::Value, StoreClientError> {
    match response.status {
        Status::Success => Ok(response.data.unwrap_or(serde_json::Value::Null)),
        Status::Error => {
            let message = response.error_msg.unwrap_or_default();
            if message.contains("not found") {
                Err(StoreClientError::NotFound)
            } else {
                Err(StoreClientError::Upstream(message))
            }
        }
    }
}

#[async_trait]
impl StorePort for StoreClient {
    async fn create(&self, collection: &str, data: Document) -> Result<Document, StoreClientError> {
        let response = self.call("create", json!({"collection": collection, "data": data})).await?;
        Ok(into_document(unwrap_response(response)?))
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Document, StoreClientError> {
        let response = self.call("read", json!({"collection": collection, "id": id})).await?;
        Ok(into_document(unwrap_response(response)?))
    }

    async fn update(&self, collection: &str, id: &str, data: Document) -> Result<Document, StoreClientError> {
        let response = self
            .call("update", json!({"collection": collection, "id": id, "data": data}))
            .await?;
        Ok(into_document(unwrap_response(response)?))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<Document, StoreClientError> {
        let response = self.call("delete", json!({"collection": collection, "id": id})).await?;
        Ok(into_document(unwrap_response(response)?))
    }

    async fn query(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreClientError> {
        let response = self
            .call("query", json!({"collection": collection, "filter": filter}))
            .await?;
        let value = unwrap_response(response)?;
        let records = value
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(into_document)
            .collect();
        Ok(records)
    }
}
