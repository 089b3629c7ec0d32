// Generic envelope shapes shared by every action on every peer link.
//
// `Request`/`Response` model the strict request/response exchange used
// by every connection. `PushFrame` models the one exception: the room
// server's unsolicited `snapshot`/`state_update`/`game_start`/
// `game_over` pushes, which carry a `type` tag but no enclosing
// request/response wrapper.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{"action": "...", "data": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub action: String,
    #[serde(default = "default_data")]
    pub data: Value,
}

fn default_data() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// `{"status": "success"|"error", "data"?: {...}, "errorMsg"?: "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "errorMsg")]
    pub error_msg: Option<String>,
}

impl Response {
    pub fn ok(data: Value) -> Self {
        Self {
            status: Status::Success,
            data: Some(data),
            error_msg: None,
        }
    }

    pub fn ok_empty() -> Self {
        Self {
            status: Status::Success,
            data: None,
            error_msg: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            data: None,
            error_msg: Some(message.into()),
        }
    }
}

/// Marker trait for room→client unsolicited push types, which are
/// serialized directly (no request/response wrapper) as
/// `{"type": "...", ...fields}` via each variant's own `#[serde(tag =
/// "type")]` enum.
pub trait PushFrame: Serialize {}
