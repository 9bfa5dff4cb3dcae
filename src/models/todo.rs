use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::dates;

/// Represents the priority of a todo.
/// Corresponds to the `todo_priority` SQL enum. Variants are ordered low to high.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type,
)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    Low,
    Medium,
    High,
}

/// Represents the status of a todo.
/// Corresponds to the `todo_status` SQL enum.
#[derive(
    Debug,
    Default,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    sqlx::Type,
)]
#[sqlx(type_name = "todo_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    /// Not finished yet. Assigned when a todo is created without a status.
    #[default]
    Pending,
    Done,
}

impl TodoPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoPriority::Low => "low",
            TodoPriority::Medium => "medium",
            TodoPriority::High => "high",
        }
    }
}

impl TodoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::Done => "done",
        }
    }
}

/// Payload for creating a todo.
///
/// Unknown fields are ignored. `userEmail` is never read from the body; the owner
/// always comes from the verified token.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    #[validate(length(min = 3, max = 100, message = "\"title\" must be between 3 and 100 characters"))]
    pub title: String,

    /// May be empty.
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "dates::deserialize_optional")]
    pub due_date: Option<DateTime<Utc>>,

    pub priority: TodoPriority,

    /// `null` or absent means the default status.
    #[serde(default)]
    pub status: Option<TodoStatus>,
}

/// Partial update of a todo. Only the fields that are present are written.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_not_empty", skip_on_field_errors = false))]
pub struct TodoChanges {
    #[validate(length(min = 3, max = 100, message = "\"title\" must be between 3 and 100 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    /// `Some(None)` clears the due date.
    #[serde(
        default,
        deserialize_with = "dates::deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,

    pub priority: Option<TodoPriority>,

    pub status: Option<TodoStatus>,
}

impl TodoChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }

    /// Applies the change set in place. Last write wins.
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(title) = &self.title {
            todo.title = title.clone();
        }
        if let Some(description) = &self.description {
            todo.description = Some(description.clone());
        }
        if let Some(due_date) = self.due_date {
            todo.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
        if let Some(status) = self.status {
            todo.status = status;
        }
    }
}

fn validate_not_empty(changes: &TodoChanges) -> Result<(), ValidationError> {
    if changes.is_empty() {
        let mut error = ValidationError::new("empty_update");
        error.message = Some("At least one field must be provided".into());
        return Err(error);
    }
    Ok(())
}

/// A todo as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Owner identity.
    pub user_email: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: TodoPriority,
    pub status: TodoStatus,
    /// Server-assigned, never updated.
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Creates a new `Todo` owned by `user_email`, stamping `id` and `created_at`.
    pub fn new(input: NewTodo, user_email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            user_email: user_email.into(),
            due_date: input.due_date,
            priority: input.priority,
            status: input.status.unwrap_or_default(),
            created_at: Utc::now(),
        }
    }
}
