#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{test, web, App};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};

use todoforge::auth::{AuthState, TokenIssuer};
use todoforge::config::QuerySettings;
use todoforge::models::{NewTodo, Todo, TodoPriority, TodoStatus};
use todoforge::routes;
use todoforge::store::{MemoryStore, Store, TodoStore};

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_PASSWORD: &str = "password123";

/// Builds the application around `store`, exactly as `main` does minus CORS and Postgres.
pub fn test_app(
    store: Arc<MemoryStore>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let store: web::Data<dyn Store> = web::Data::from(store as Arc<dyn Store>);
    App::new()
        .app_data(store)
        .app_data(web::Data::new(AuthState::new(
            TokenIssuer::new(TEST_SECRET, 24),
            4,
        )))
        .app_data(web::Data::new(QuerySettings::default()))
        .configure(routes::config)
}

/// Registers `email` and logs in, returning the bearer token.
pub async fn register_and_login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(&json!({ "name": "Test User", "email": email, "password": TEST_PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", email);

    let req = test::TestRequest::post()
        .uri("/api/users/login")
        .set_json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .to_request();
    let body: Value = test::call_and_read_body_json(app, req).await;
    body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Fixed point in time so seeded todos have a known creation order.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

/// Inserts a todo directly into the store, created `minutes` after [`base_time`].
pub async fn seed_todo(
    store: &MemoryStore,
    owner: &str,
    title: &str,
    priority: TodoPriority,
    status: TodoStatus,
    due_date: Option<DateTime<Utc>>,
    minutes: i64,
) -> Todo {
    let mut todo = Todo::new(
        NewTodo {
            title: title.to_string(),
            description: None,
            due_date,
            priority,
            status: Some(status),
        },
        owner,
    );
    todo.created_at = base_time() + Duration::minutes(minutes);
    store.insert_todo(&todo).await.unwrap();
    todo
}

pub fn titles(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("listing carries a data array")
        .iter()
        .map(|t| t["title"].as_str().unwrap_or_default().to_string())
        .collect()
}
