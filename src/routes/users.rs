use crate::{
    auth::{hash_password, verify_password, AuthState, LoginRequest, LoginResponse, UserSummary},
    config::QuerySettings,
    error::AppError,
    models::{ApiResponse, User, UserInput},
    store::{bounded, Store},
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Rejects an email that is already registered with `400`. The password is stored as
/// a bcrypt hash and the role is always `"user"`.
///
/// ## Responses:
/// - `201 Created`: `{"success": true, "insertedId": "<uuid>"}`
/// - `400 Bad Request`: invalid payload or duplicate email.
#[post("")]
pub async fn register(
    store: web::Data<dyn Store>,
    settings: web::Data<QuerySettings>,
    auth: web::Data<AuthState>,
    register_data: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let input = register_data.into_inner();

    let existing = bounded(settings.timeout, store.find_user_by_email(&input.email)).await?;
    if existing.is_some() {
        return Err(AppError::BadRequest("Email already exists".into()));
    }

    let password_hash = hash_password(&input.password, auth.bcrypt_cost)?;
    let user = User::new(input.email, input.name, password_hash);
    bounded(settings.timeout, store.insert_user(&user)).await?;

    log::info!("registered user {}", user.email);
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "insertedId": user.id
    })))
}

/// Login user
///
/// Checks the password against the stored hash and returns a bearer token.
/// Unknown emails and wrong passwords get the same `401` answer.
#[post("/login")]
pub async fn login(
    store: web::Data<dyn Store>,
    settings: web::Data<QuerySettings>,
    auth: web::Data<AuthState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let invalid = || AppError::Unauthorized("Invalid email or password".into());
    let user = bounded(settings.timeout, store.find_user_by_email(&login_data.email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&login_data.password, &user.password_hash)? {
        log::warn!("failed login for {}", user.email);
        return Err(invalid());
    }

    let token = auth.tokens.issue(&user.email, &user.role)?;
    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user: UserSummary {
            email: user.email,
            name: user.name,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub email: Option<String>,
}

/// List users, optionally narrowed to one `email`. Password hashes are never returned.
#[get("")]
pub async fn list_users(
    store: web::Data<dyn Store>,
    settings: web::Data<QuerySettings>,
    query: web::Query<UserListQuery>,
) -> Result<impl Responder, AppError> {
    let email = query.email.as_deref().filter(|e| !e.is_empty());
    let users = bounded(settings.timeout, store.list_users(email)).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(users)))
}
