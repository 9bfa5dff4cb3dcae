pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::Config;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer};

/// Authentication services shared by the middleware and the user handlers.
pub struct AuthState {
    pub tokens: TokenIssuer,
    pub bcrypt_cost: u32,
}

impl AuthState {
    pub fn new(tokens: TokenIssuer, bcrypt_cost: u32) -> Self {
        Self {
            tokens,
            bcrypt_cost,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            TokenIssuer::new(&config.jwt_secret, config.token_ttl_hours),
            config.bcrypt_cost,
        )
    }
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Must be a valid email format.
    #[validate(email(message = "\"email\" must be a valid email"))]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6, message = "\"password\" must be at least 6 characters"))]
    pub password: String,
}

/// Public part of a user returned on login.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummary {
    pub email: String,
    pub name: Option<String>,
}

/// Response structure after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    /// Bearer token for the protected todo routes.
    pub token: String,
    pub user: UserSummary,
}
