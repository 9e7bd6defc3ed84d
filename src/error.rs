//! Error types for the cache server
//!
//! Provides unified error handling using thiserror. Cache reads and writes
//! never fail; these errors only come from snapshot persistence and the
//! admin surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache server.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Snapshot file could not be opened, written or renamed
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache contents could not be encoded into a snapshot
    #[error("Snapshot encode error: {0}")]
    Encode(String),

    /// Snapshot bytes could not be decoded
    #[error("Snapshot decode error: {0}")]
    Decode(String),
}

impl CacheError {
    /// True when the error means "there is no snapshot yet".
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::Io(err) if err.kind() == std::io::ErrorKind::NotFound)
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Io(_) | CacheError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;
