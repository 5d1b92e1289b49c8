//! todo-service Server Binary
//!
//! Reads configuration from flags or the environment, opens the selected
//! store and starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use todo_service::network::Server;
use todo_service::{Backend, Config, DatabaseConfig, MemoryStore, PgStore, TodoStore};
use tracing_subscriber::{fmt, EnvFilter};

/// todo-service Server
#[derive(Parser, Debug)]
#[command(name = "todo-server")]
#[command(about = "HTTP CRUD service for todos")]
#[command(version)]
struct Args {
    /// HTTP listen port
    #[arg(short, long, env = "PORT")]
    port: u16,

    /// Storage backend (postgres or memory)
    #[arg(short, long, env = "TODO_BACKEND", default_value = "postgres")]
    backend: Backend,

    /// Maximum concurrent connections
    #[arg(short, long, env = "TODO_MAX_CONNECTIONS", default_value = "1024")]
    max_connections: usize,

    /// Header read and keep-alive idle timeout in milliseconds (0 disables)
    #[arg(long, env = "TODO_READ_TIMEOUT_MS", default_value = "5000")]
    read_timeout_ms: u64,

    /// PostgreSQL host
    #[arg(long, env = "PG_HOST")]
    pg_host: Option<String>,

    /// PostgreSQL port
    #[arg(long, env = "PG_PORT")]
    pg_port: Option<u16>,

    /// PostgreSQL database name
    #[arg(long, env = "PG_DATABASE")]
    pg_database: Option<String>,

    /// PostgreSQL user
    #[arg(long, env = "PG_USER")]
    pg_user: Option<String>,

    /// PostgreSQL password
    #[arg(long, env = "PG_PASSWORD", hide_env_values = true)]
    pg_password: Option<String>,

    /// PostgreSQL SSL mode (disable, prefer, require, ...)
    #[arg(long, env = "PG_SSLMODE")]
    pg_sslmode: Option<String>,

    /// Pooled PostgreSQL connections
    #[arg(long, env = "TODO_POOL_SIZE", default_value = "5")]
    pool_size: u32,

    /// Start the in-memory store with sample todos
    #[arg(long, env = "TODO_SEED_DEMO")]
    seed_demo: bool,
}

impl Args {
    /// Database parameters, or None when no PG_* setting was given at all
    ///
    /// Partially given parameters are kept so validation can name the missing one.
    fn database(&self) -> Option<DatabaseConfig> {
        if self.pg_host.is_none()
            && self.pg_port.is_none()
            && self.pg_database.is_none()
            && self.pg_user.is_none()
            && self.pg_password.is_none()
            && self.pg_sslmode.is_none()
        {
            return None;
        }
        Some(DatabaseConfig {
            host: self.pg_host.clone().unwrap_or_default(),
            port: self.pg_port.unwrap_or_default(),
            database: self.pg_database.clone().unwrap_or_default(),
            user: self.pg_user.clone().unwrap_or_default(),
            password: self.pg_password.clone().unwrap_or_default(),
            ssl_mode: self.pg_sslmode.clone().unwrap_or_default(),
        })
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,todo_service=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("todo-service v{}", todo_service::VERSION);

    // Build config from args
    let mut builder = Config::builder()
        .listen_addr(SocketAddr::from(([0, 0, 0, 0], args.port)))
        .backend(args.backend)
        .max_connections(args.max_connections)
        .read_timeout_ms(args.read_timeout_ms)
        .pool_size(args.pool_size)
        .seed_demo(args.seed_demo);
    if let Some(database) = args.database() {
        builder = builder.database(database);
    }
    let config = builder.build();

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let store = match open_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open {} store: {}", config.backend, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Store initialized ({} backend)", store.backend());

    let mut server = Server::new(config, store);

    // Stop accepting on Ctrl+C
    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, initiating shutdown...");
            shutdown.shutdown();
        }
    });

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// Open the configured store
async fn open_store(config: &Config) -> todo_service::Result<Arc<dyn TodoStore>> {
    match config.backend {
        Backend::Memory => {
            let store = if config.seed_demo {
                MemoryStore::demo()
            } else {
                MemoryStore::new()
            };
            Ok(Arc::new(store))
        }
        Backend::Postgres => {
            let database = config.database.as_ref().ok_or_else(|| {
                todo_service::TodoError::Config("missing database parameters".to_string())
            })?;
            let store = PgStore::connect(database, config.pool_size).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
    }
}
