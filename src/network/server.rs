//! HTTP Server
//!
//! Accepts connections and serves each one on its own task.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{watch, Semaphore};

use super::connection::Connection;
use crate::config::Config;
use crate::error::{Result, TodoError};
use crate::store::TodoStore;

/// Pause after a failed accept (e.g. out of file descriptors)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// HTTP server for the todo API
pub struct Server {
    config: Config,

    /// Shared by every connection task
    store: Arc<dyn TodoStore>,

    /// Bound by `bind`, or lazily by `run`
    listener: Option<TcpListener>,

    /// Caps in-flight connections at `config.max_connections`
    connections: Arc<Semaphore>,

    /// Flips to true once shutdown is requested
    shutdown: Arc<watch::Sender<bool>>,
}

/// Cloneable handle that stops a running server
#[derive(Clone)]
pub struct ShutdownHandle {
    shutdown: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Stop accepting new connections
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

impl Server {
    /// Create a new server with the given config and store
    pub fn new(config: Config, store: Arc<dyn TodoStore>) -> Self {
        let permits = config.max_connections.min(Semaphore::MAX_PERMITS);
        let connections = Arc::new(Semaphore::new(permits));
        let (shutdown, _) = watch::channel(false);

        Self {
            config,
            store,
            listener: None,
            connections,
            shutdown: Arc::new(shutdown),
        }
    }

    /// Bind the listen address and return the actual bound address
    ///
    /// Binding to port 0 picks a free port.
    pub async fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }

        let listener = TcpListener::bind(self.config.listen_addr).await?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Address the server is bound to, if bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Start the server; returns once shutdown is requested
    pub async fn run(&mut self) -> Result<()> {
        let addr = self.bind().await?;
        let listener = self
            .listener
            .take()
            .ok_or_else(|| TodoError::Config("listener not bound".to_string()))?;

        tracing::info!(
            "Listening on http://{} ({} backend, max {} connections)",
            addr,
            self.store.backend(),
            self.config.max_connections
        );

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            let permit = tokio::select! {
                permit = Arc::clone(&self.connections).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                _ = wait_for_shutdown(&mut shutdown_rx) => break,
            };

            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                },
                _ = wait_for_shutdown(&mut shutdown_rx) => break,
            };

            let store = Arc::clone(&self.store);
            let read_timeout_ms = self.config.read_timeout_ms;
            tokio::spawn(async move {
                let _permit = permit;
                let mut connection = match Connection::new(stream, store) {
                    Ok(connection) => connection,
                    Err(e) => {
                        tracing::warn!("Failed to set up connection from {}: {}", peer, e);
                        return;
                    }
                };
                connection.set_read_timeout(read_timeout_ms);
                // Connection::handle logs its own failures
                let _ = connection.handle().await;
            });
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// A handle that can stop the server from another task
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shutdown: Arc::clone(&self.shutdown),
        }
    }
}

async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}
