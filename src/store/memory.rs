use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Todo, TodoChanges, User};
use crate::query::{SortSpec, TodoFilter};
use crate::store::{TodoStore, UserStore};

/// In-process store with the same query semantics as [`crate::store::PgStore`].
#[derive(Default)]
pub struct MemoryStore {
    todos: RwLock<Vec<Todo>>,
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn visible(todo: &Todo, id: Uuid, owner: Option<&str>) -> bool {
    todo.id == id && owner.map_or(true, |owner| todo.user_email == owner)
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn find_todos(
        &self,
        filter: &TodoFilter,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Todo>, AppError> {
        let todos = self.todos.read().await;
        let mut matching: Vec<&Todo> = todos.iter().filter(|t| filter.matches(t)).collect();
        matching.sort_by(|a, b| sort.compare(a, b));

        Ok(matching
            .into_iter()
            .skip(to_usize(skip))
            .take(to_usize(limit))
            .cloned()
            .collect())
    }

    async fn count_todos(&self, filter: &TodoFilter) -> Result<u64, AppError> {
        let todos = self.todos.read().await;
        Ok(todos.iter().filter(|t| filter.matches(t)).count() as u64)
    }

    async fn insert_todo(&self, todo: &Todo) -> Result<(), AppError> {
        self.todos.write().await.push(todo.clone());
        Ok(())
    }

    async fn get_todo(&self, id: Uuid, owner: Option<&str>) -> Result<Option<Todo>, AppError> {
        let todos = self.todos.read().await;
        Ok(todos.iter().find(|t| visible(t, id, owner)).cloned())
    }

    async fn update_todo(
        &self,
        id: Uuid,
        owner: Option<&str>,
        changes: &TodoChanges,
    ) -> Result<Option<Todo>, AppError> {
        let mut todos = self.todos.write().await;
        Ok(todos.iter_mut().find(|t| visible(t, id, owner)).map(|todo| {
            changes.apply_to(todo);
            todo.clone()
        }))
    }

    async fn delete_todo(&self, id: Uuid, owner: Option<&str>) -> Result<u64, AppError> {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|t| !visible(t, id, owner));
        Ok((before - todos.len()) as u64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::BadRequest("Email already exists".into()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn list_users(&self, email: Option<&str>) -> Result<Vec<User>, AppError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| email.map_or(true, |email| u.email == email))
            .cloned()
            .collect())
    }
}
