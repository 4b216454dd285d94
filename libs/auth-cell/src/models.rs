use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::auth::UserRole;
use shared_models::error::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Self-service profile changes. Any other key in the body rejects the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AccountError> for AppError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::EmailTaken | AccountError::Validation(_) => {
                AppError::BadRequest(e.to_string())
            }
            AccountError::InvalidCredentials => AppError::Auth(e.to_string()),
            AccountError::UserNotFound => AppError::NotFound(e.to_string()),
            AccountError::Hashing(_) | AccountError::Token(_) => AppError::Internal(e.to_string()),
            AccountError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
