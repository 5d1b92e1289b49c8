//! Tests for MemoryStore
//!
//! These tests verify:
//! - Basic CRUD + toggle operations
//! - Id assignment (monotonic, never reused)
//! - Diff semantics on update
//! - Ordering after deletes
//! - Seeded construction
//! - Concurrent access patterns

use std::collections::HashSet;
use std::sync::Arc;

use todo_service::{MemoryStore, Todo, TodoError, TodoStore};

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[tokio::test]
async fn test_new_store_is_empty() {
    let store = MemoryStore::new();

    assert!(store.is_empty());
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_assigns_first_id() {
    let store = MemoryStore::new();

    let created = store.create(Todo::new("Buy milk")).await.unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.title, "Buy milk");
    assert!(!created.completed);
    assert_eq!(created.description, "");
    assert_eq!(created.day, "");
}

#[tokio::test]
async fn test_create_ignores_candidate_id() {
    let store = MemoryStore::new();

    let candidate = Todo {
        id: 500,
        ..Todo::new("x")
    };
    let created = store.create(candidate).await.unwrap();

    assert_eq!(created.id, 1);
    assert!(matches!(store.get(500).await, Err(TodoError::NotFound(500))));
}

#[tokio::test]
async fn test_get_returns_created() {
    let store = MemoryStore::new();
    let created = store.create(Todo::new("a").with_description("b")).await.unwrap();

    assert_eq!(store.get(created.id).await.unwrap(), created);
}

#[tokio::test]
async fn test_get_nonexistent() {
    let store = MemoryStore::new();

    assert!(matches!(store.get(1).await, Err(TodoError::NotFound(1))));
}

#[tokio::test]
async fn test_delete_returns_prior_state() {
    let store = MemoryStore::new();
    let created = store.create(Todo::new("gone")).await.unwrap();
    store.toggle_completed(created.id).await.unwrap();

    let deleted = store.delete(created.id).await.unwrap();

    assert_eq!(deleted.title, "gone");
    assert!(deleted.completed);
    assert!(matches!(store.get(created.id).await, Err(TodoError::NotFound(_))));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_missing_id_operations_not_found() {
    let store = MemoryStore::new();
    store.create(Todo::new("only")).await.unwrap();

    assert!(matches!(store.update(9, Todo::new("x")).await, Err(TodoError::NotFound(9))));
    assert!(matches!(store.delete(9).await, Err(TodoError::NotFound(9))));
    assert!(matches!(store.toggle_completed(9).await, Err(TodoError::NotFound(9))));
    assert_eq!(store.len(), 1);
}

// =============================================================================
// Id Assignment Tests
// =============================================================================

#[tokio::test]
async fn test_ids_strictly_increase_after_deletes() {
    let store = MemoryStore::new();

    let a = store.create(Todo::new("a")).await.unwrap();
    let b = store.create(Todo::new("b")).await.unwrap();
    store.delete(b.id).await.unwrap();
    store.delete(a.id).await.unwrap();
    let c = store.create(Todo::new("c")).await.unwrap();

    assert_eq!((a.id, b.id, c.id), (1, 2, 3));
}

// =============================================================================
// Update Tests
// =============================================================================

#[tokio::test]
async fn test_update_applies_non_empty_fields_only() {
    let store = MemoryStore::new();
    let created = store
        .create(Todo::new("title").with_description("desc").with_date("1", "2", "2020"))
        .await
        .unwrap();

    let diff = Todo::new("").with_description("new desc").with_date("", "", "2021");
    let updated = store.update(created.id, diff).await.unwrap();

    assert_eq!(updated.title, "title");
    assert_eq!(updated.description, "new desc");
    assert_eq!(updated.day, "1");
    assert_eq!(updated.month, "2");
    assert_eq!(updated.year, "2021");
    assert_eq!(store.get(created.id).await.unwrap(), updated);
}

#[tokio::test]
async fn test_update_never_touches_completed() {
    let store = MemoryStore::new();
    let created = store.create(Todo::new("t")).await.unwrap();

    let updated = store.update(created.id, Todo::new("u")).await.unwrap();
    assert!(!updated.completed);

    store.toggle_completed(created.id).await.unwrap();
    let diff = Todo {
        completed: false,
        ..Todo::new("v")
    };
    let updated = store.update(created.id, diff).await.unwrap();
    assert!(updated.completed);
}

// =============================================================================
// Toggle Tests
// =============================================================================

#[tokio::test]
async fn test_toggle_twice_restores() {
    let store = MemoryStore::new();
    let created = store.create(Todo::new("t")).await.unwrap();

    assert!(store.toggle_completed(created.id).await.unwrap().completed);
    assert!(!store.toggle_completed(created.id).await.unwrap().completed);
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[tokio::test]
async fn test_list_ordered_by_id_after_deletes() {
    let store = MemoryStore::new();
    for title in ["a", "b", "c", "d"] {
        store.create(Todo::new(title)).await.unwrap();
    }
    store.delete(2).await.unwrap();
    store.create(Todo::new("e")).await.unwrap();
    store.delete(1).await.unwrap();

    let ids: Vec<i64> = store.list().await.unwrap().iter().map(|t| t.id).collect();

    assert_eq!(ids, vec![3, 4, 5]);
}

#[tokio::test]
async fn test_list_returns_copies() {
    let store = MemoryStore::new();
    let created = store.create(Todo::new("before")).await.unwrap();

    let snapshot = store.list().await.unwrap();
    store.update(created.id, Todo::new("after")).await.unwrap();
    store.toggle_completed(created.id).await.unwrap();

    assert_eq!(snapshot[0].title, "before");
    assert!(!snapshot[0].completed);
}

// =============================================================================
// Seeding Tests
// =============================================================================

#[tokio::test]
async fn test_demo_store() {
    let store = MemoryStore::demo();

    let todos = store.list().await.unwrap();
    assert_eq!(todos.len(), 3);
    assert_eq!(todos[1].title, "Todo 2");
    assert_eq!(todos[1].year, "2018");

    let created = store.create(Todo::new("next")).await.unwrap();
    assert_eq!(created.id, 4);
}

#[tokio::test]
async fn test_with_todos_sorts_and_continues_ids() {
    let seed = vec![
        Todo { id: 10, ..Todo::new("ten") },
        Todo { id: 3, ..Todo::new("three") },
    ];
    let store = MemoryStore::with_todos(seed).unwrap();

    let ids: Vec<i64> = store.list().await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![3, 10]);
    assert_eq!(store.create(Todo::new("x")).await.unwrap().id, 11);
}

#[test]
fn test_with_todos_rejects_bad_ids() {
    let duplicate = vec![Todo { id: 2, ..Todo::new("a") }, Todo { id: 2, ..Todo::new("b") }];
    assert!(matches!(
        MemoryStore::with_todos(duplicate),
        Err(TodoError::InvalidInput(_))
    ));

    let zero = vec![Todo::new("no id")];
    assert!(matches!(MemoryStore::with_todos(zero), Err(TodoError::InvalidInput(_))));
}

#[test]
fn test_with_todos_exhausted_id_space() {
    let seed = vec![Todo { id: i64::MAX, ..Todo::new("last") }];
    assert!(matches!(MemoryStore::with_todos(seed), Err(TodoError::Storage(_))));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_unique_ids() {
    let store = Arc::new(MemoryStore::new());
    let mut handles = Vec::new();

    for task in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let mut ids = Vec::new();
            for i in 0..50 {
                let todo = store.create(Todo::new(format!("{}-{}", task, i))).await.unwrap();
                ids.push(todo.id);
            }
            ids
        }));
    }

    let mut all = HashSet::new();
    for handle in handles {
        for id in handle.await.unwrap() {
            assert!(all.insert(id), "duplicate id {}", id);
        }
    }

    assert_eq!(all.len(), 400);
    assert_eq!(all.iter().max(), Some(&400));

    let ids: Vec<i64> = store.list().await.unwrap().iter().map(|t| t.id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_toggles_are_serialized() {
    let store = Arc::new(MemoryStore::new());
    let id = store.create(Todo::new("flip")).await.unwrap().id;

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.toggle_completed(id).await.unwrap() })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    // An even number of flips lands back where it started.
    assert!(!store.get(id).await.unwrap().completed);
}
