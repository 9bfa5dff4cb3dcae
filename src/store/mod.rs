//! Storage abstraction.
//!
//! Handlers and the query engine only see the [`Store`] trait. `main` builds a
//! [`PgStore`] once at startup and injects it as `web::Data<dyn Store>`; the test-suite
//! injects a [`MemoryStore`] instead.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Todo, TodoChanges, User};
use crate::query::{SortSpec, TodoFilter};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Returns at most `limit` todos matching `filter`, ordered by `sort`, after skipping `skip`.
    async fn find_todos(
        &self,
        filter: &TodoFilter,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Todo>, AppError>;

    async fn count_todos(&self, filter: &TodoFilter) -> Result<u64, AppError>;

    async fn insert_todo(&self, todo: &Todo) -> Result<(), AppError>;

    /// Looks a todo up by id, restricted to `owner` when one is given.
    async fn get_todo(&self, id: Uuid, owner: Option<&str>) -> Result<Option<Todo>, AppError>;

    /// Applies `changes` and returns the updated todo, or `None` when no todo matched.
    async fn update_todo(
        &self,
        id: Uuid,
        owner: Option<&str>,
        changes: &TodoChanges,
    ) -> Result<Option<Todo>, AppError>;

    /// Returns the number of deleted todos (0 or 1). Deleting a missing id is not an error.
    async fn delete_todo(&self, id: Uuid, owner: Option<&str>) -> Result<u64, AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Fails with `BadRequest` when the email is already registered.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    async fn list_users(&self, email: Option<&str>) -> Result<Vec<User>, AppError>;
}

/// Everything the HTTP layer needs from storage.
pub trait Store: TodoStore + UserStore {}

impl<T: TodoStore + UserStore> Store for T {}

/// Runs a storage call under `timeout`, turning an elapsed deadline into a `DatabaseError`.
pub async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(timeout, call).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, AppError>(1)
        };
        match bounded(Duration::from_millis(10), slow).await {
            Err(AppError::DatabaseError(msg)) => assert!(msg.contains("timed out")),
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bounded_passes_results_through() {
        let fast = async { Ok::<_, AppError>(7) };
        assert_eq!(bounded(Duration::from_secs(1), fast).await.unwrap(), 7);

        let failing = async { Err::<u8, _>(AppError::NotFound("gone".into())) };
        assert!(matches!(
            bounded(Duration::from_secs(1), failing).await,
            Err(AppError::NotFound(_))
        ));
    }
}
