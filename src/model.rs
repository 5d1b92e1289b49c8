//! Todo entity
//!
//! The single record managed by the service. The same type is used for
//! stored entities, create candidates and update diffs: every field has a
//! plain default (empty string / false), so a field that is missing from a
//! request, `null`, or explicitly empty all mean the same thing.

use serde::{Deserialize, Deserializer, Serialize};

/// A todo item
///
/// `day`, `month` and `year` are free-form text, not a structured date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct Todo {
    /// Server-assigned, unique, never reused. Ignored on input.
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,

    #[serde(deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(deserialize_with = "null_as_default")]
    pub day: String,

    #[serde(deserialize_with = "null_as_default")]
    pub month: String,

    #[serde(deserialize_with = "null_as_default")]
    pub year: String,

    /// Only changed through the toggle operation
    #[serde(deserialize_with = "null_as_default")]
    pub completed: bool,

    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

impl Todo {
    /// Create an uncompleted todo with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_date(
        mut self,
        day: impl Into<String>,
        month: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        self.day = day.into();
        self.month = month.into();
        self.year = year.into();
        self
    }

    /// Overwrite each text field for which `diff` carries a non-empty value
    ///
    /// `id` and `completed` are never touched: a `false` in a diff cannot be
    /// told apart from "not supplied".
    pub fn apply_diff(&mut self, diff: &Todo) {
        merge_field(&mut self.title, &diff.title);
        merge_field(&mut self.description, &diff.description);
        merge_field(&mut self.day, &diff.day);
        merge_field(&mut self.month, &diff.month);
        merge_field(&mut self.year, &diff.year);
    }

    /// Flip the completed flag, returning the new value
    pub fn toggle_completed(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }
}

fn merge_field(current: &mut String, incoming: &str) {
    if !incoming.is_empty() {
        *current = incoming.to_string();
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
