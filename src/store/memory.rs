//! In-memory store
//!
//! Vec-backed store with a single parking_lot Mutex for concurrency.
//!
//! ## Concurrency Model
//! - All six operations take the same exclusive lock, so they are
//!   linearizable with respect to each other
//! - The guard is scoped to the operation body and never held across an
//!   `.await`; hold time is one linear scan plus an O(1) change
//!
//! ## Ordering
//! Entities are appended in creation order and ids only grow, so the vec
//! is always sorted by id. Deletes shift the tail down but never renumber.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::TodoStore;
use crate::error::{Result, TodoError};
use crate::model::Todo;

/// Process-local todo store
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

struct MemoryState {
    /// Sorted by id (insertion order)
    todos: Vec<Todo>,

    /// Id handed to the next created todo
    next_id: i64,
}

impl MemoryState {
    fn position(&self, id: i64) -> Option<usize> {
        self.todos.iter().position(|t| t.id == id)
    }

    fn find_mut(&mut self, id: i64) -> Result<&mut Todo> {
        self.todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TodoError::NotFound(id))
    }
}

impl MemoryStore {
    /// Create an empty store; the first todo gets id 1
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                todos: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Create a store holding the given todos
    ///
    /// Todos are ordered by id and the counter continues after the largest.
    /// Ids must be positive and distinct.
    pub fn with_todos(mut todos: Vec<Todo>) -> Result<Self> {
        todos.sort_by_key(|t| t.id);

        if let Some(bad) = todos.iter().find(|t| t.id <= 0) {
            return Err(TodoError::InvalidInput(format!(
                "seed todo id must be positive, got {}",
                bad.id
            )));
        }
        if let Some(pair) = todos.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(TodoError::InvalidInput(format!(
                "duplicate seed todo id {}",
                pair[0].id
            )));
        }

        let next_id = match todos.last() {
            Some(last) => last.id.checked_add(1).ok_or_else(id_exhausted)?,
            None => 1,
        };

        Ok(Self {
            state: Mutex::new(MemoryState { todos, next_id }),
        })
    }

    /// A store holding three sample todos (ids 1 to 3)
    pub fn demo() -> Self {
        let mut todos = vec![
            Todo::new("Todo 1"),
            Todo::new("Todo 2").with_date("01", "01", "2018"),
            Todo::new("Todo 3"),
        ];
        for (todo, id) in todos.iter_mut().zip(1..) {
            todo.id = id;
        }
        Self {
            state: Mutex::new(MemoryState { todos, next_id: 4 }),
        }
    }

    /// Number of stored todos
    pub fn len(&self) -> usize {
        self.state.lock().todos.len()
    }

    /// Whether the store holds no todos
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn id_exhausted() -> TodoError {
    TodoError::Storage("todo id space exhausted".to_string())
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Todo>> {
        let state = self.state.lock();
        Ok(state.todos.clone())
    }

    async fn get(&self, id: i64) -> Result<Todo> {
        let state = self.state.lock();
        state
            .todos
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(TodoError::NotFound(id))
    }

    async fn create(&self, mut todo: Todo) -> Result<Todo> {
        let mut state = self.state.lock();

        todo.id = state.next_id;
        state.next_id = state.next_id.checked_add(1).ok_or_else(id_exhausted)?;
        state.todos.push(todo.clone());

        tracing::debug!(id = todo.id, "created todo in memory");
        Ok(todo)
    }

    async fn update(&self, id: i64, diff: Todo) -> Result<Todo> {
        let mut state = self.state.lock();
        let todo = state.find_mut(id)?;
        todo.apply_diff(&diff);
        Ok(todo.clone())
    }

    async fn delete(&self, id: i64) -> Result<Todo> {
        let mut state = self.state.lock();
        let index = state.position(id).ok_or(TodoError::NotFound(id))?;
        Ok(state.todos.remove(index))
    }

    async fn toggle_completed(&self, id: i64) -> Result<Todo> {
        let mut state = self.state.lock();
        let todo = state.find_mut(id)?;
        todo.toggle_completed();
        Ok(todo.clone())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
