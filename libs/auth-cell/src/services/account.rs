use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::{urlencode, SupabaseClient};
use shared_models::auth::{AuthResponse, User};
use shared_utils::jwt::issue_token;

use crate::models::{
    AccountError, LoginRequest, RegisterRequest, UpdateProfileRequest, MIN_PASSWORD_LENGTH,
};
use crate::services::password::{hash_password, verify_password};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub struct AccountService {
    supabase: SupabaseClient,
    jwt_secret: String,
    jwt_ttl_days: i64,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            jwt_secret: config.jwt_secret.clone(),
            jwt_ttl_days: config.jwt_ttl_days,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AccountError> {
        let email = normalize_email(&request.email);
        let name = request.name.trim().to_string();
        debug!("Registering account for: {}", email);

        if name.is_empty() {
            return Err(AccountError::Validation("Name is required".to_string()));
        }
        if !is_valid_email(&email) {
            return Err(AccountError::Validation("Invalid email".to_string()));
        }
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        if self.find_by_email(&email).await?.is_some() {
            warn!("Registration rejected, email already registered: {}", email);
            return Err(AccountError::EmailTaken);
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| AccountError::Hashing(e.to_string()))?;

        let user_data = json!({
            "name": name,
            "email": email,
            "password_hash": password_hash,
            "role": request.role,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<User> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/users",
                Some(user_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let user = result
            .into_iter()
            .next()
            .ok_or_else(|| AccountError::DatabaseError("Failed to create user".to_string()))?;

        info!("User {} registered with role {}", user.id, user.role);
        self.respond_with_token(user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AccountError> {
        let email = normalize_email(&request.email);
        debug!("Login attempt for: {}", email);

        let user = match self.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("Login failed, unknown email: {}", email);
                return Err(AccountError::InvalidCredentials);
            }
        };

        let matches = verify_password(&request.password, &user.password_hash)
            .map_err(|e| AccountError::Hashing(e.to_string()))?;

        if !matches {
            warn!("Login failed, wrong password for user {}", user.id);
            return Err(AccountError::InvalidCredentials);
        }

        info!("User {} logged in", user.id);
        self.respond_with_token(user)
    }

    pub async fn update_profile(
        &self,
        user: &User,
        request: UpdateProfileRequest,
    ) -> Result<User, AccountError> {
        debug!("Updating profile for user: {}", user.id);

        if request.is_empty() {
            return Ok(user.clone());
        }

        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AccountError::Validation("Name is required".to_string()));
            }
            update_data.insert("name".to_string(), json!(name));
        }

        if let Some(email) = request.email {
            let email = normalize_email(&email);
            if !is_valid_email(&email) {
                return Err(AccountError::Validation("Invalid email".to_string()));
            }
            if email != user.email {
                if let Some(owner) = self.find_by_email(&email).await? {
                    if owner.id != user.id {
                        return Err(AccountError::EmailTaken);
                    }
                }
            }
            update_data.insert("email".to_string(), json!(email));
        }

        if let Some(password) = request.password {
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                return Err(AccountError::Validation(format!(
                    "Password must be at least {} characters",
                    MIN_PASSWORD_LENGTH
                )));
            }
            let password_hash =
                hash_password(&password).map_err(|e| AccountError::Hashing(e.to_string()))?;
            update_data.insert("password_hash".to_string(), json!(password_hash));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/users?id=eq.{}", user.id);
        let result: Vec<User> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(Value::Object(update_data)),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let updated = result.into_iter().next().ok_or(AccountError::UserNotFound)?;
        info!("Profile updated for user {}", updated.id);
        Ok(updated)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError> {
        self.supabase
            .get_user_by_email(email)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))
    }

    fn respond_with_token(&self, user: User) -> Result<AuthResponse, AccountError> {
        let token =
            issue_token(&user.id, &self.jwt_secret, self.jwt_ttl_days).map_err(AccountError::Token)?;
        Ok(AuthResponse { user, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn email_format_check() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada example.com"));
        assert!(!is_valid_email(""));
    }
}
