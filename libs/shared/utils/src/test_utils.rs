use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{JwtClaims, User, UserRole};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointing at a mock store, typically `MockServer::uri()`.
    pub fn with_store(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_ttl_days: shared_config::DEFAULT_JWT_TTL_DAYS,
            port: shared_config::DEFAULT_PORT,
            uploads_dir: "uploads".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", UserRole::Patient)
    }
}

impl TestUser {
    pub fn new(email: &str, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: format!("Test {}", role),
            email: email.to_string(),
            role,
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, UserRole::Doctor)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, UserRole::Patient)
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, UserRole::Admin)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            password_hash: String::new(),
            role: self.role,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let claims = JwtClaims {
            sub: user.id.to_string(),
            iat: now.timestamp() as u64,
            exp: exp.timestamp().max(0) as u64,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("HS256 signing with an in-memory key cannot fail")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn user_response(user: &TestUser) -> serde_json::Value {
        Self::user_response_with_hash(user, "")
    }

    pub fn user_response_with_hash(user: &TestUser, password_hash: &str) -> serde_json::Value {
        json!({
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "password_hash": password_hash,
            "role": user.role,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn doctor_response(id: &Uuid, user_id: &Uuid, specialization: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "specialization": specialization,
            "qualifications": ["MBBS"],
            "experience": 10,
            "available_days": ["Monday", "Wednesday"],
            "available_time_slots": ["09:00-12:00"],
            "consultation_fee": 150.0,
            "rating": 0.0,
            "total_ratings": 0,
            "languages": ["English"],
            "about": "Experienced physician",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "user": { "name": "Dr. Test", "email": "doctor@example.com" }
        })
    }

    pub fn service_response(id: &Uuid, name: &str, category: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "description": "A clinic service",
            "category": category,
            "price": 50.0,
            "duration": 30,
            "image": null,
            "is_available": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(
        id: &Uuid,
        patient_id: &Uuid,
        doctor_id: &Uuid,
        date: NaiveDate,
        time: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "date": date,
            "time": time,
            "reason": "Check-up",
            "status": status,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_service_key, "test-service-key");
        assert_eq!(app_config.jwt_ttl_days, 7);
        assert!(app_config.is_configured());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::doctor("doc@example.com");
        assert_eq!(user.email, "doc@example.com");
        assert_eq!(user.role, UserRole::Doctor);

        let user_model = user.to_user();
        assert_eq!(user_model.email, user.email);
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn user_response_parses_as_user() {
        let user = TestUser::admin("admin@example.com");
        let parsed: User = serde_json::from_value(MockSupabaseResponses::user_response(&user)).unwrap();
        assert!(parsed.is_admin());
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(1));
        assert_eq!(token.split('.').count(), 3);
    }
}
