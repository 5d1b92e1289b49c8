//! Protocol codec
//!
//! JSON encoding and decoding for request and response bodies.
//!
//! Decoding failures are the caller's fault (`InvalidInput`, 400).
//! Encoding failures are ours (`Serialization`, 500).

use bytes::Bytes;
use serde::Serialize;

use crate::error::{Result, TodoError};
use crate::model::Todo;

/// Maximum accepted request body size (1 MB)
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

// =============================================================================
// Request Decoding
// =============================================================================

/// Decode a todo (create candidate or update diff) from a request body
///
/// Missing and `null` fields take their defaults; unknown fields are ignored.
pub fn decode_todo(body: &[u8]) -> Result<Todo> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(TodoError::InvalidInput("empty request body".to_string()));
    }
    if body.len() > MAX_BODY_SIZE {
        return Err(TodoError::InvalidInput(format!(
            "request body exceeds {} bytes",
            MAX_BODY_SIZE
        )));
    }
    serde_json::from_slice(body)
        .map_err(|e| TodoError::InvalidInput(format!("malformed todo: {}", e)))
}

// =============================================================================
// Response Encoding
// =============================================================================

/// Encode a single todo
pub fn encode_todo(todo: &Todo) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(todo)?))
}

/// Encode a list of todos as a JSON array
pub fn encode_todos(todos: &[Todo]) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(todos)?))
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Encode an error message as `{"error": message}`
pub fn encode_error(message: &str) -> Bytes {
    // Serializing a struct of one string cannot fail.
    serde_json::to_vec(&ErrorBody { error: message })
        .map(Bytes::from)
        .unwrap_or_else(|_| Bytes::from_static(b"{\"error\":\"internal error\"}"))
}
