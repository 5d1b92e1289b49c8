//! Connection Handler
//!
//! Handles individual client connections.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Method;
use hyper_util::rt::{TokioIo, TokioTimer};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::time::Instant;

use crate::error::{ErrorKind, Result};
use crate::model::Todo;
use crate::protocol::{decode_todo, encode_todo, encode_todos, Response, Route, MAX_BODY_SIZE};
use crate::store::TodoStore;

/// Handles a single client connection
pub struct Connection {
    /// Accepted TCP stream
    stream: TcpStream,

    /// Store every request on this connection is executed against
    store: Arc<dyn TodoStore>,

    /// Peer address for logging
    peer_addr: String,

    /// Header read and keep-alive idle limit; None waits forever
    read_timeout: Option<Duration>,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, store: Arc<dyn TodoStore>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            store,
            peer_addr,
            read_timeout: None,
        })
    }

    /// Configure the read timeout (milliseconds, 0 disables it)
    ///
    /// Bounds how long a client may take to send request headers and how
    /// long a keep-alive connection may sit idle between requests.
    pub fn set_read_timeout(&mut self, read_ms: u64) {
        self.read_timeout = (read_ms > 0).then(|| Duration::from_millis(read_ms));
    }

    /// Serve HTTP/1 requests until the client closes the connection or
    /// stays idle past the read timeout
    pub async fn handle(self) -> Result<()> {
        let Connection {
            stream,
            store,
            peer_addr,
            read_timeout,
        } = self;
        tracing::debug!("Connection established from {}", peer_addr);

        // None while a request is being served
        let idle_since = Arc::new(Mutex::new(Some(Instant::now())));

        let service_idle = Arc::clone(&idle_since);
        let service_peer = peer_addr.clone();
        let service = service_fn(move |req: hyper::Request<Incoming>| {
            let store = Arc::clone(&store);
            let idle_since = Arc::clone(&service_idle);
            let peer_addr = service_peer.clone();
            async move {
                *idle_since.lock() = None;
                let response = handle_request(store.as_ref(), req, &peer_addr).await;
                *idle_since.lock() = Some(Instant::now());
                Ok::<_, Infallible>(response.into_hyper())
            }
        });

        let mut builder = http1::Builder::new();
        builder.timer(TokioTimer::new());
        if let Some(timeout) = read_timeout {
            builder.header_read_timeout(timeout);
        }
        let conn = builder.serve_connection(TokioIo::new(stream), service);
        tokio::pin!(conn);

        let result = match read_timeout {
            None => conn.as_mut().await,
            Some(timeout) => loop {
                let wake = match *idle_since.lock() {
                    Some(since) => since + timeout,
                    None => Instant::now() + timeout,
                };
                tokio::select! {
                    result = conn.as_mut() => break result,
                    _ = tokio::time::sleep_until(wake) => {
                        let expired = matches!(
                            *idle_since.lock(),
                            Some(since) if since.elapsed() >= timeout
                        );
                        if expired {
                            tracing::debug!("Closing idle connection from {}", peer_addr);
                            conn.as_mut().graceful_shutdown();
                            break conn.as_mut().await;
                        }
                    }
                }
            },
        };

        match result {
            Ok(()) => {
                tracing::debug!("Client {} disconnected", peer_addr);
                Ok(())
            }
            Err(e) if e.is_incomplete_message() => {
                tracing::debug!("Client {} closed mid-request", peer_addr);
                Ok(())
            }
            Err(e) if e.is_timeout() => {
                tracing::debug!("Read timeout for client {}", peer_addr);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Error serving {}: {}", peer_addr, e);
                Err(e.into())
            }
        }
    }
}

async fn handle_request(
    store: &dyn TodoStore,
    req: hyper::Request<Incoming>,
    peer_addr: &str,
) -> Response {
    let (parts, body) = req.into_parts();

    let body = match Limited::new(body, MAX_BODY_SIZE).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            tracing::debug!("Unreadable body from {}: {}", peer_addr, e);
            return Response::bad_request(&format!("unreadable request body: {}", e));
        }
    };

    let response = dispatch(store, &parts.method, parts.uri.path(), &body).await;
    tracing::debug!(
        "{} {} from {} -> {}",
        parts.method,
        parts.uri.path(),
        peer_addr,
        response.status.as_u16()
    );
    response
}

/// Route a request to the store and build its response
///
/// Transport-free: the connection handler calls this once per request with
/// the fully read body.
pub async fn dispatch(
    store: &dyn TodoStore,
    method: &Method,
    path: &str,
    body: &[u8],
) -> Response {
    let route = match Route::parse(method, path) {
        Ok(route) => route,
        Err(e) => return Response::from_route_error(&e),
    };

    match execute_route(store, route, body).await {
        Ok(payload) => Response::ok(payload),
        Err(e) => {
            if e.kind() == ErrorKind::StorageFault {
                tracing::warn!("{} on {} backend failed: {}", route.name(), store.backend(), e);
            }
            Response::from_error(&e)
        }
    }
}

/// Execute a route and encode its result
async fn execute_route(store: &dyn TodoStore, route: Route, body: &[u8]) -> Result<Bytes> {
    let todo: Todo = match route {
        Route::ListTodos => return encode_todos(&store.list().await?),
        Route::GetTodo { id } => store.get(id).await?,
        Route::CreateTodo => store.create(decode_todo(body)?).await?,
        Route::UpdateTodo { id } => store.update(id, decode_todo(body)?).await?,
        Route::DeleteTodo { id } => store.delete(id).await?,
        Route::ToggleCompleted { id } => store.toggle_completed(id).await?,
    };
    encode_todo(&todo)
}
