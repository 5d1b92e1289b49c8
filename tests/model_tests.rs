//! Tests for the Todo model
//!
//! These tests verify:
//! - JSON shape and defaults
//! - Null handling on decode
//! - Diff application rules
//! - Toggle behavior

use todo_service::Todo;

// =============================================================================
// JSON Tests
// =============================================================================

#[test]
fn test_serialize_field_names() {
    let todo = Todo {
        id: 7,
        ..Todo::new("Write report")
            .with_description("quarterly")
            .with_date("03", "11", "2024")
    };

    let value = serde_json::to_value(&todo).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "id": 7,
            "title": "Write report",
            "day": "03",
            "month": "11",
            "year": "2024",
            "completed": false,
            "description": "quarterly",
        })
    );
}

#[test]
fn test_missing_fields_default() {
    let todo: Todo = serde_json::from_str(r#"{"title": "Buy milk"}"#).unwrap();

    assert_eq!(todo, Todo::new("Buy milk"));
}

#[test]
fn test_null_fields_default() {
    let todo: Todo =
        serde_json::from_str(r#"{"title": null, "completed": null, "id": null}"#).unwrap();

    assert_eq!(todo, Todo::default());
}

#[test]
fn test_unknown_fields_ignored() {
    let todo: Todo = serde_json::from_str(r#"{"title": "a", "priority": 3}"#).unwrap();

    assert_eq!(todo.title, "a");
}

#[test]
fn test_wrong_type_rejected() {
    let result = serde_json::from_str::<Todo>(r#"{"title": 42}"#);

    assert!(result.is_err());
}

// =============================================================================
// Diff Tests
// =============================================================================

#[test]
fn test_apply_diff_replaces_non_empty_fields() {
    let mut todo = Todo::new("old").with_description("old desc").with_date("1", "2", "2000");
    let diff = Todo::new("new").with_date("", "12", "");

    todo.apply_diff(&diff);

    assert_eq!(todo.title, "new");
    assert_eq!(todo.description, "old desc");
    assert_eq!(todo.day, "1");
    assert_eq!(todo.month, "12");
    assert_eq!(todo.year, "2000");
}

#[test]
fn test_apply_empty_diff_changes_nothing() {
    let original = Todo::new("keep").with_description("me").with_date("1", "1", "1999");
    let mut todo = original.clone();

    todo.apply_diff(&Todo::default());

    assert_eq!(todo, original);
}

#[test]
fn test_apply_diff_ignores_id_and_completed() {
    let mut todo = Todo {
        id: 3,
        completed: true,
        ..Todo::new("x")
    };
    let diff = Todo {
        id: 99,
        completed: false,
        ..Todo::default()
    };

    todo.apply_diff(&diff);

    assert_eq!(todo.id, 3);
    assert!(todo.completed);
}

// =============================================================================
// Toggle Tests
// =============================================================================

#[test]
fn test_toggle_is_its_own_inverse() {
    let mut todo = Todo::new("flip");

    assert!(todo.toggle_completed());
    assert!(!todo.toggle_completed());
    assert!(!todo.completed);
}
