use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Todo, TodoChanges, User};
use crate::query::{SortDirection, SortSpec, TodoFilter};
use crate::store::{TodoStore, UserStore};

const TODO_COLUMNS: &str =
    "id, title, description, user_email, due_date, priority, status, created_at";
const USER_COLUMNS: &str = "id, email, name, role, password_hash, created_at";

/// PostgreSQL unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// [`crate::store::Store`] backed by a shared `PgPool`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the pool. Called once by the process entry point.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(config.query.timeout)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("migration failed: {}", e)))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Appends ` WHERE ...` for every active predicate.
///
/// Status and priority are compared as text so that values outside the SQL enums
/// match nothing instead of failing the cast.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TodoFilter) {
    let mut conditions = 0;
    let mut next = || {
        conditions += 1;
        if conditions == 1 {
            " WHERE "
        } else {
            " AND "
        }
    };

    if let Some(owner) = &filter.owner {
        builder
            .push(next())
            .push("user_email = ")
            .push_bind(owner.clone());
    }
    if let Some(status) = &filter.status {
        builder
            .push(next())
            .push("status::text = ")
            .push_bind(status.clone());
    }
    if let Some(priority) = &filter.priority {
        builder
            .push(next())
            .push("priority::text = ")
            .push_bind(priority.clone());
    }
    if let Some(range) = &filter.due {
        builder
            .push(next())
            .push("due_date >= ")
            .push_bind(range.start)
            .push(" AND due_date <= ")
            .push_bind(range.end);
    }
}

/// Appends the ORDER BY clause. Column names come from the sort allow-list only.
/// Text columns sort under the "C" collation, null due dates rank lowest, and `id`
/// breaks ties.
fn push_order(builder: &mut QueryBuilder<'_, Postgres>, sort: &SortSpec) {
    let nulls = match sort.direction {
        SortDirection::Asc => "NULLS FIRST",
        SortDirection::Desc => "NULLS LAST",
    };
    let collate = sort
        .field
        .collation()
        .map(|name| format!(" COLLATE \"{}\"", name))
        .unwrap_or_default();
    builder.push(format!(
        " ORDER BY {}{} {} {}, id ASC",
        sort.field.column(),
        collate,
        sort.direction.sql(),
        nulls
    ));
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn select_todos<'a>(
    filter: &TodoFilter,
    sort: &SortSpec,
    skip: u64,
    limit: u64,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM todos", TODO_COLUMNS));
    push_filter(&mut builder, filter);
    push_order(&mut builder, sort);
    builder
        .push(" LIMIT ")
        .push_bind(to_i64(limit))
        .push(" OFFSET ")
        .push_bind(to_i64(skip));
    builder
}

fn count_todos_query<'a>(filter: &TodoFilter) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM todos");
    push_filter(&mut builder, filter);
    builder
}

#[async_trait]
impl TodoStore for PgStore {
    async fn find_todos(
        &self,
        filter: &TodoFilter,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Todo>, AppError> {
        let mut builder = select_todos(filter, sort, skip, limit);
        let todos = builder.build_query_as::<Todo>().fetch_all(&self.pool).await?;
        Ok(todos)
    }

    async fn count_todos(&self, filter: &TodoFilter) -> Result<u64, AppError> {
        let mut builder = count_todos_query(filter);
        let total: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(total.max(0) as u64)
    }

    async fn insert_todo(&self, todo: &Todo) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO todos (id, title, description, user_email, due_date, priority, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(todo.id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(&todo.user_email)
        .bind(todo.due_date)
        .bind(todo.priority)
        .bind(todo.status)
        .bind(todo.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_todo(&self, id: Uuid, owner: Option<&str>) -> Result<Option<Todo>, AppError> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE id = $1 AND ($2::text IS NULL OR user_email = $2)",
            TODO_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn update_todo(
        &self,
        id: Uuid,
        owner: Option<&str>,
        changes: &TodoChanges,
    ) -> Result<Option<Todo>, AppError> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "UPDATE todos
             SET title = COALESCE($1, title),
                 description = COALESCE($2, description),
                 priority = COALESCE($3, priority),
                 status = COALESCE($4, status),
                 due_date = CASE WHEN $5 THEN $6 ELSE due_date END
             WHERE id = $7 AND ($8::text IS NULL OR user_email = $8)
             RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.priority)
        .bind(changes.status)
        .bind(changes.due_date.is_some())
        .bind(changes.due_date.flatten())
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn delete_todo(&self, id: Uuid, owner: Option<&str>) -> Result<u64, AppError> {
        let result =
            sqlx::query("DELETE FROM todos WHERE id = $1 AND ($2::text IS NULL OR user_email = $2)")
                .bind(id)
                .bind(owner)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, name, role, password_hash, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.role)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(AppError::BadRequest("Email already exists".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_users(&self, email: Option<&str>) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE ($1::text IS NULL OR email = $1) ORDER BY created_at",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
