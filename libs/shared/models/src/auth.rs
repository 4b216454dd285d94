use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Patient,
    Doctor,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Patient => "patient",
            UserRole::Doctor => "doctor",
            UserRole::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

/// A row of the `users` table. The password hash is read from the store but
/// never written back out in responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    #[serde(default)]
    pub role: UserRole,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Embedded projection of a user attached to doctor and appointment rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn password_hash_is_not_serialized() {
        let user: User = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "name": "Ada",
            "email": "ada@example.com",
            "password_hash": "$argon2id$v=19$...",
            "role": "doctor",
            "created_at": null,
            "updated_at": null
        }))
        .unwrap();

        assert_eq!(user.role, UserRole::Doctor);
        let out = serde_json::to_value(&user).unwrap();
        assert!(out.get("password_hash").is_none());
        assert_eq!(out["role"], "doctor");
    }

    #[test]
    fn role_defaults_to_patient() {
        assert_eq!(UserRole::default(), UserRole::Patient);
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }
}
