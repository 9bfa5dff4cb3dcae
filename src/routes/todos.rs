use crate::{
    auth::AuthenticatedUser,
    config::QuerySettings,
    error::AppError,
    models::{ApiResponse, NewTodo, Todo, TodoChanges},
    query::{self, ListParams, TodoQuery},
    store::{bounded, Store},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Lists every todo.
///
/// Open to any caller: no owner predicate and no role check.
///
/// ## Query Parameters:
/// - `status`, `priority` (optional): exact-match filters.
/// - `startDate`, `endDate` (optional): inclusive due-date range, applied only when both are set.
/// - `sortBy` (optional): one of `title`, `description`, `priority`, `status`, `dueDate`,
///   `createdAt`, `userEmail`. Defaults to `createdAt` newest first.
/// - `order` (optional): `desc` for descending, anything else ascending.
/// - `page`, `limit` (optional): 1-based page and page size (defaults 1 and 10).
///
/// ## Responses:
/// - `200 OK`: `{"success": true, "data": [...], "pagination": {...}}`
/// - `400 Bad Request`: unknown sort field or invalid date.
#[get("")]
pub async fn list_todos(
    store: web::Data<dyn Store>,
    settings: web::Data<QuerySettings>,
    params: web::Query<ListParams>,
) -> Result<impl Responder, AppError> {
    let query = TodoQuery::from_params(&params, None, settings.max_page_size)?;
    let page = query::execute(store.get_ref(), &query, &settings).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Lists the caller's todos. Same parameters and envelope as [`list_todos`].
#[get("/me")]
pub async fn list_my_todos(
    store: web::Data<dyn Store>,
    settings: web::Data<QuerySettings>,
    user: AuthenticatedUser,
    params: web::Query<ListParams>,
) -> Result<impl Responder, AppError> {
    let query = TodoQuery::from_params(&params, Some(user.email), settings.max_page_size)?;
    let page = query::execute(store.get_ref(), &query, &settings).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Creates a todo owned by the caller.
///
/// `status` defaults to `"pending"`; `id` and `createdAt` are assigned here.
///
/// ## Responses:
/// - `201 Created`: `{"success": true, "data": <todo>}`
/// - `400 Bad Request`: missing or invalid fields.
/// - `401 Unauthorized`: missing or invalid token.
#[post("")]
pub async fn create_todo(
    store: web::Data<dyn Store>,
    settings: web::Data<QuerySettings>,
    user: AuthenticatedUser,
    todo_data: web::Json<NewTodo>,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    let todo = Todo::new(todo_data.into_inner(), user.email);
    bounded(settings.timeout, store.insert_todo(&todo)).await?;

    log::info!("created todo {} for {}", todo.id, todo.user_email);
    Ok(HttpResponse::Created().json(ApiResponse::data(todo)))
}

/// Fetches one of the caller's todos. Todos owned by someone else are reported as missing.
#[get("/{id}")]
pub async fn get_todo(
    store: web::Data<dyn Store>,
    settings: web::Data<QuerySettings>,
    user: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let todo = bounded(
        settings.timeout,
        store.get_todo(todo_id.into_inner(), Some(user.email.as_str())),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(todo)))
}

/// Applies a partial update to one of the caller's todos.
///
/// ## Responses:
/// - `200 OK`: `{"success": true, "message": "Todo updated", "data": <todo>}`
/// - `400 Bad Request`: invalid or empty change set.
/// - `404 Not Found`: no todo with this id belongs to the caller.
#[put("/{id}")]
pub async fn update_todo(
    store: web::Data<dyn Store>,
    settings: web::Data<QuerySettings>,
    user: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
    changes: web::Json<TodoChanges>,
) -> Result<impl Responder, AppError> {
    changes.validate()?;
    let id = todo_id.into_inner();

    let todo = bounded(
        settings.timeout,
        store.update_todo(id, Some(user.email.as_str()), &changes),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;

    log::info!("updated todo {} for {}", id, user.email);
    Ok(HttpResponse::Ok().json(ApiResponse::data(todo).with_message("Todo updated")))
}

/// Deletes one of the caller's todos.
///
/// Idempotent: deleting a missing id succeeds with `deletedCount: 0`.
#[delete("/{id}")]
pub async fn delete_todo(
    store: web::Data<dyn Store>,
    settings: web::Data<QuerySettings>,
    user: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let id = todo_id.into_inner();
    let deleted = bounded(settings.timeout, store.delete_todo(id, Some(user.email.as_str()))).await?;

    log::info!("deleted {} todo(s) with id {} for {}", deleted, id, user.email);
    Ok(HttpResponse::Ok().json(ApiResponse::data(json!({ "deletedCount": deleted }))))
}
