//! Configuration for the todo service
//!
//! Centralized configuration with sensible defaults. The server binary fills
//! it from command-line flags and environment variables, then calls
//! [`Config::validate`] before anything is opened or bound.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use tokio::sync::Semaphore;

use crate::error::{Result, TodoError};

/// Main configuration for a todo service instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// HTTP listen address
    pub listen_addr: SocketAddr,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds): bounds both a request's
    /// header read and keep-alive idle time. 0 disables it.
    pub read_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Which store implementation backs the API
    pub backend: Backend,

    /// PostgreSQL connection parameters (required for `Backend::Postgres`)
    pub database: Option<DatabaseConfig>,

    /// Max pooled PostgreSQL connections
    pub pool_size: u32,

    /// Start the in-memory store with the sample todos
    pub seed_demo: bool,
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Durable relational store
    Postgres,

    /// Process-local store guarded by a single lock
    Memory,
}

impl FromStr for Backend {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Backend::Postgres),
            "memory" | "mem" => Ok(Backend::Memory),
            other => Err(TodoError::Config(format!("unknown backend '{}'", other))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Postgres => f.write_str("postgres"),
            Backend::Memory => f.write_str("memory"),
        }
    }
}

/// PostgreSQL connection parameters
#[derive(Clone, Default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    /// libpq-style SSL mode: disable, allow, prefer, require, verify-ca, verify-full
    pub ssl_mode: String,
}

// Keeps the password out of logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl DatabaseConfig {
    /// Check that every parameter is present
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("host", &self.host),
            ("database", &self.database),
            ("user", &self.user),
            ("password", &self.password),
            ("ssl_mode", &self.ssl_mode),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(TodoError::Config(format!("database {} is required", name)));
            }
        }
        if self.port == 0 {
            return Err(TodoError::Config("database port is required".to_string()));
        }
        self.ssl_mode()?;
        Ok(())
    }

    /// Parse the configured SSL mode
    pub fn ssl_mode(&self) -> Result<PgSslMode> {
        PgSslMode::from_str(&self.ssl_mode)
            .map_err(|_| TodoError::Config(format!("invalid ssl mode '{}'", self.ssl_mode)))
    }

    /// Build sqlx connection options from these parameters
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
            .ssl_mode(self.ssl_mode()?))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_connections: 1024,
            read_timeout_ms: 5000,
            backend: Backend::Postgres,
            database: None,
            pool_size: 5,
            seed_demo: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(TodoError::Config("max_connections must be positive".to_string()));
        }
        if self.max_connections > Semaphore::MAX_PERMITS {
            return Err(TodoError::Config(format!(
                "max_connections must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }
        match self.backend {
            Backend::Postgres => {
                let database = self.database.as_ref().ok_or_else(|| {
                    TodoError::Config("postgres backend needs database parameters".to_string())
                })?;
                if self.pool_size == 0 {
                    return Err(TodoError::Config("pool_size must be positive".to_string()));
                }
                database.validate()
            }
            Backend::Memory => Ok(()),
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the HTTP listen address
    pub fn listen_addr(mut self, addr: SocketAddr) -> Self {
        self.config.listen_addr = addr;
        self
    }

    /// Listen on all interfaces at the given port
    pub fn port(mut self, port: u16) -> Self {
        self.config.listen_addr.set_port(port);
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds, 0 disables it)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the storage backend
    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the PostgreSQL connection parameters
    pub fn database(mut self, database: DatabaseConfig) -> Self {
        self.config.database = Some(database);
        self
    }

    /// Set the PostgreSQL pool size
    pub fn pool_size(mut self, size: u32) -> Self {
        self.config.pool_size = size;
        self
    }

    /// Seed the in-memory store with sample todos
    pub fn seed_demo(mut self, seed: bool) -> Self {
        self.config.seed_demo = seed;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
