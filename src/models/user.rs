use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// The only role handed out at registration.
pub const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    /// bcrypt hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, name: Option<String>, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            role: DEFAULT_ROLE.to_string(),
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Registration payload.
#[derive(Debug, Deserialize, Validate)]
pub struct UserInput {
    #[validate(length(min = 2, max = 50, message = "\"name\" must be between 2 and 50 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "\"email\" must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "\"password\" must be at least 6 characters"))]
    pub password: String, // This password field here is for input, it won't be stored directly in User model
}
