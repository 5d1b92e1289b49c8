//! PostgreSQL store
//!
//! Every operation runs in its own transaction. A `sqlx::Transaction` that
//! is dropped without `commit` rolls back, so any `?` between `begin` and
//! `commit` discards the partial work.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::TodoStore;
use crate::config::DatabaseConfig;
use crate::error::{Result, TodoError};
use crate::model::Todo;

/// Creates the `todos` table if it does not exist yet
pub const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS todos (
    id          BIGSERIAL PRIMARY KEY,
    title       TEXT NOT NULL DEFAULT '',
    day         TEXT NOT NULL DEFAULT '',
    month       TEXT NOT NULL DEFAULT '',
    year        TEXT NOT NULL DEFAULT '',
    completed   BOOLEAN NOT NULL DEFAULT false,
    description TEXT NOT NULL DEFAULT ''
)";

const LIST_SQL: &str = "SELECT id, title, day, month, year, completed, description
FROM todos
ORDER BY id ASC";

const GET_SQL: &str = "SELECT id, title, day, month, year, completed, description
FROM todos
WHERE id = $1";

const INSERT_SQL: &str = "INSERT INTO todos (title, day, month, year, completed, description)
VALUES ($1, $2, $3, $4, $5, $6)
RETURNING id, title, day, month, year, completed, description";

// Empty diff values keep the stored column.
const UPDATE_SQL: &str = "UPDATE todos SET
    title       = COALESCE(NULLIF($2, ''), title),
    day         = COALESCE(NULLIF($3, ''), day),
    month       = COALESCE(NULLIF($4, ''), month),
    year        = COALESCE(NULLIF($5, ''), year),
    description = COALESCE(NULLIF($6, ''), description)
WHERE id = $1
RETURNING id, title, day, month, year, completed, description";

const DELETE_SQL: &str = "DELETE FROM todos
WHERE id = $1
RETURNING id, title, day, month, year, completed, description";

const LOCK_COMPLETED_SQL: &str = "SELECT completed FROM todos WHERE id = $1 FOR UPDATE";

const SET_COMPLETED_SQL: &str = "UPDATE todos SET completed = $2
WHERE id = $1
RETURNING id, title, day, month, year, completed, description";

/// Relational todo store over a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from validated connection parameters
    pub async fn connect(database: &DatabaseConfig, pool_size: u32) -> Result<Self> {
        database.validate()?;
        let options = database.connect_options()?;

        tracing::info!(
            "Connecting to PostgreSQL at {}:{}/{}",
            database.host,
            database.port,
            database.database
        );

        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Open a pool from a connection URL
    pub async fn connect_url(url: &str, pool_size: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the `todos` table if needed
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn list(&self) -> Result<Vec<Todo>> {
        let mut tx = self.pool.begin().await?;
        let todos = sqlx::query_as::<_, Todo>(LIST_SQL)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(todos)
    }

    async fn get(&self, id: i64) -> Result<Todo> {
        let mut tx = self.pool.begin().await?;
        let todo = sqlx::query_as::<_, Todo>(GET_SQL)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        tx.commit().await?;
        Ok(todo)
    }

    async fn create(&self, todo: Todo) -> Result<Todo> {
        let mut tx = self.pool.begin().await?;
        let created = sqlx::query_as::<_, Todo>(INSERT_SQL)
            .bind(&todo.title)
            .bind(&todo.day)
            .bind(&todo.month)
            .bind(&todo.year)
            .bind(todo.completed)
            .bind(&todo.description)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(id = created.id, "created todo in postgres");
        Ok(created)
    }

    async fn update(&self, id: i64, diff: Todo) -> Result<Todo> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query_as::<_, Todo>(UPDATE_SQL)
            .bind(id)
            .bind(&diff.title)
            .bind(&diff.day)
            .bind(&diff.month)
            .bind(&diff.year)
            .bind(&diff.description)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<Todo> {
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query_as::<_, Todo>(DELETE_SQL)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn toggle_completed(&self, id: i64) -> Result<Todo> {
        let mut tx = self.pool.begin().await?;

        // Row lock holds off concurrent toggles until commit.
        let completed: bool = sqlx::query_scalar(LOCK_COMPLETED_SQL)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(TodoError::NotFound(id))?;

        let toggled = sqlx::query_as::<_, Todo>(SET_COMPLETED_SQL)
            .bind(id)
            .bind(!completed)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(toggled)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
