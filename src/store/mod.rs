//! Store Module
//!
//! The operation contract every todo backend implements, and the two
//! backends themselves.
//!
//! ## Implementations
//! - [`PgStore`]: one PostgreSQL transaction per operation; concurrency is
//!   left to the database's isolation level.
//! - [`MemoryStore`]: a `Vec<Todo>` and an id counter behind a single
//!   mutex; every operation holds the lock for its whole body.
//!
//! ## Contract
//! - `list` returns entities in ascending id order
//! - `get`/`update`/`delete`/`toggle_completed` fail with `NotFound`
//!   when no entity has the id
//! - `create` ignores the candidate's id and assigns the next one
//! - `update` changes only the text fields whose diff value is non-empty
//!   and never touches `completed`

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Todo;

/// CRUD + toggle over todo entities
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All entities ordered by ascending id
    async fn list(&self) -> Result<Vec<Todo>>;

    /// The entity with the given id
    async fn get(&self, id: i64) -> Result<Todo>;

    /// Store a new entity and return it with its assigned id
    async fn create(&self, todo: Todo) -> Result<Todo>;

    /// Apply a diff and return the fully updated entity
    async fn update(&self, id: i64, diff: Todo) -> Result<Todo>;

    /// Remove an entity and return its prior state
    async fn delete(&self, id: i64) -> Result<Todo>;

    /// Flip `completed` and return the updated entity
    async fn toggle_completed(&self, id: i64) -> Result<Todo>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}
