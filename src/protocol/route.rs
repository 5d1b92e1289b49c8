//! Route definitions
//!
//! Parses a request method and path into the operation it names.

use hyper::Method;
use thiserror::Error;

/// Path prefix shared by every route
pub const API_PREFIX: &str = "/api/todos";

/// An operation requested over HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// GET /api/todos
    ListTodos,

    /// GET /api/todos/{id}
    GetTodo { id: i64 },

    /// POST /api/todos
    CreateTodo,

    /// PUT /api/todos/{id}
    UpdateTodo { id: i64 },

    /// DELETE /api/todos/{id}
    DeleteTodo { id: i64 },

    /// POST /api/todos/{id}/toggle_completed
    ToggleCompleted { id: i64 },
}

/// Why a request did not resolve to a route
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no route for {0}")]
    NotFound(String),

    #[error("method not allowed")]
    MethodNotAllowed { allow: &'static str },

    #[error("invalid todo id '{0}'")]
    InvalidId(String),
}

/// Which resource a path points at, before the method is considered
enum Resource<'a> {
    Collection,
    Item(&'a str),
    Toggle(&'a str),
}

impl Route {
    /// Resolve a method and path
    ///
    /// The path is matched before the id is parsed, so an unknown method on
    /// `/api/todos/abc` is a 405 rather than a 400.
    pub fn parse(method: &Method, path: &str) -> Result<Route, RouteError> {
        let resource =
            Self::resource(path).ok_or_else(|| RouteError::NotFound(path.to_string()))?;

        match resource {
            Resource::Collection => match *method {
                Method::GET => Ok(Route::ListTodos),
                Method::POST => Ok(Route::CreateTodo),
                _ => Err(RouteError::MethodNotAllowed { allow: "GET, POST" }),
            },
            Resource::Item(raw) => {
                let route: fn(i64) -> Route = match *method {
                    Method::GET => |id| Route::GetTodo { id },
                    Method::PUT => |id| Route::UpdateTodo { id },
                    Method::DELETE => |id| Route::DeleteTodo { id },
                    _ => {
                        return Err(RouteError::MethodNotAllowed {
                            allow: "GET, PUT, DELETE",
                        })
                    }
                };
                Ok(route(parse_id(raw)?))
            }
            Resource::Toggle(raw) => match *method {
                Method::POST => Ok(Route::ToggleCompleted { id: parse_id(raw)? }),
                _ => Err(RouteError::MethodNotAllowed { allow: "POST" }),
            },
        }
    }

    fn resource(path: &str) -> Option<Resource<'_>> {
        let rest = path.strip_prefix(API_PREFIX)?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        if rest.is_empty() {
            return Some(Resource::Collection);
        }

        let mut segments = rest.strip_prefix('/')?.split('/');
        let id = segments.next().filter(|s| !s.is_empty())?;
        match (segments.next(), segments.next()) {
            (None, _) => Some(Resource::Item(id)),
            (Some("toggle_completed"), None) => Some(Resource::Toggle(id)),
            _ => None,
        }
    }

    /// Operation name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Route::ListTodos => "list",
            Route::GetTodo { .. } => "get",
            Route::CreateTodo => "create",
            Route::UpdateTodo { .. } => "update",
            Route::DeleteTodo { .. } => "delete",
            Route::ToggleCompleted { .. } => "toggle_completed",
        }
    }
}

/// Parse a base-10 64-bit todo id
pub fn parse_id(raw: &str) -> Result<i64, RouteError> {
    raw.parse::<i64>().map_err(|_| RouteError::InvalidId(raw.to_string()))
}
