//! # todo-service
//!
//! A small HTTP service exposing CRUD over a single "todo" entity, with two
//! interchangeable storage backends:
//! - PostgreSQL, one transaction per operation
//! - In-memory, one exclusive lock around a shared collection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HTTP Server                             │
//! │               (one task per connection)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Route + JSON codec                           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Arc<dyn TodoStore>
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   PgStore   │          │ MemoryStore │
//!   │ (txn / op)  │          │   (Mutex)   │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │ PostgreSQL  │
//!   │   (todos)   │
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod store;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, Result, TodoError};
pub use config::{Backend, Config, DatabaseConfig};
pub use model::Todo;
pub use store::{MemoryStore, PgStore, TodoStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of todo-service
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
