//! Protocol Module
//!
//! Maps HTTP requests onto store operations and store results back onto
//! HTTP responses.
//!
//! ## Routes
//! ```text
//! GET    /api/todos                          list
//! POST   /api/todos                          create
//! GET    /api/todos/{id}                     get
//! PUT    /api/todos/{id}                     update
//! DELETE /api/todos/{id}                     delete
//! POST   /api/todos/{id}/toggle_completed    toggle
//! ```
//!
//! ## Bodies
//! Todos travel as JSON objects:
//! `{"id", "title", "day", "month", "year", "completed", "description"}`.
//! Errors travel as `{"error": "<message>"}`.
//!
//! ## Status Codes
//! - 200: OK
//! - 400: malformed id or body
//! - 404: unknown path or no such todo
//! - 405: known path, unsupported method
//! - 500: storage fault

mod route;
mod response;
mod codec;

pub use route::{parse_id, Route, RouteError, API_PREFIX};
pub use response::{Response, INTERNAL_ERROR};
pub use codec::{decode_todo, encode_error, encode_todo, encode_todos, MAX_BODY_SIZE};
