//! Response definitions
//!
//! Represents responses to clients.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::StatusCode;

use super::codec::encode_error;
use super::route::RouteError;
use crate::error::{ErrorKind, TodoError};

const APPLICATION_JSON: &str = "application/json";

/// Body message for every 500 response
pub const INTERNAL_ERROR: &str = "internal error";

/// A response to send to client
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code
    pub status: StatusCode,

    /// JSON payload (a todo, a list of todos, or an error object)
    pub body: Bytes,

    /// Value for the `Allow` header on 405 responses
    pub allow: Option<&'static str>,
}

impl Response {
    /// Create a 200 response with a JSON payload
    pub fn ok(body: Bytes) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            allow: None,
        }
    }

    /// Create a JSON error response with the given status
    pub fn with_error(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: encode_error(message),
            allow: None,
        }
    }

    /// Create a 400 response
    pub fn bad_request(message: &str) -> Self {
        Self::with_error(StatusCode::BAD_REQUEST, message)
    }

    /// Create a 404 response
    pub fn not_found(message: &str) -> Self {
        Self::with_error(StatusCode::NOT_FOUND, message)
    }

    /// Create a 405 response listing the allowed methods
    pub fn method_not_allowed(allow: &'static str) -> Self {
        Self {
            allow: Some(allow),
            ..Self::with_error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
        }
    }

    /// Create a 500 response
    pub fn error(message: &str) -> Self {
        Self::with_error(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a store or codec error onto its status code
    ///
    /// 500 bodies carry only a generic message; the caller logs the cause.
    pub fn from_error(err: &TodoError) -> Self {
        match err.kind() {
            ErrorKind::InvalidInput => Self::bad_request(&err.to_string()),
            ErrorKind::NotFound => Self::not_found(&err.to_string()),
            ErrorKind::StorageFault => Self::error(INTERNAL_ERROR),
        }
    }

    /// Map a routing failure onto its status code
    pub fn from_route_error(err: &RouteError) -> Self {
        match err {
            RouteError::NotFound(_) => Self::not_found(&err.to_string()),
            RouteError::MethodNotAllowed { allow } => Self::method_not_allowed(*allow),
            RouteError::InvalidId(_) => Self::bad_request(&err.to_string()),
        }
    }

    /// Convert into a hyper response
    pub fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
        let mut response = hyper::Response::new(Full::new(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        if let Some(allow) = self.allow {
            headers.insert(ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}
