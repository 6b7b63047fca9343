use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub seq: u64,
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(flatten)]
    pub content: ApiMessageContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiMessageContent {
    Request {
        method: String,
        path: String,
        body: Option<Value>,
    },
    Response {
        request_seq: u64,
        status: u16,
        body: Value,
    },
}

/// A decoded request, detached from its envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: &str, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: method.to_string(),
            path: path.into(),
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}
