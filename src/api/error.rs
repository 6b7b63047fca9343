use serde_json::json;
use thiserror::Error;

use super::protocol::ApiResponse;
use crate::store::StoreError;

/// Request failures, each carrying its HTTP-style status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("bad request")]
    BadRequest,
    #[error("resource not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("unprocessable")]
    Unprocessable,
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest => 400,
            ApiError::NotFound => 404,
            ApiError::MethodNotAllowed => 405,
            ApiError::Unprocessable => 422,
        }
    }

    pub fn into_response(self) -> ApiResponse {
        let status = self.status();
        ApiResponse {
            status,
            body: json!({
                "success": false,
                "error": status,
                "message": self.to_string(),
            }),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::warn!("Store operation failed: {}", err);
        ApiError::Unprocessable
    }
}
