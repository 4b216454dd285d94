use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::auth::UserSummary;
use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailableDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// A row of the `doctors` table, optionally with the owning user's
/// name and email embedded under `user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialization: String,
    #[serde(default)]
    pub qualifications: Vec<String>,
    pub experience: i32,
    #[serde(default)]
    pub available_days: Vec<AvailableDay>,
    #[serde(default)]
    pub available_time_slots: Vec<String>,
    pub consultation_fee: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub total_ratings: i32,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub about: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub user_id: Uuid,
    pub specialization: String,
    #[serde(default)]
    pub qualifications: Vec<String>,
    pub experience: i32,
    #[serde(default)]
    pub available_days: Vec<AvailableDay>,
    #[serde(default)]
    pub available_time_slots: Vec<String>,
    pub consultation_fee: f64,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub about: String,
}

/// Partial profile update. Keys outside this set fail deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDoctorRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifications: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_days: Option<Vec<AvailableDay>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_time_slots: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultation_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateDoctorRequest {
    pub rating: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct DoctorListQuery {
    pub specialization: Option<String>,
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Invalid user or role")]
    InvalidUser,

    #[error("Doctor profile already exists")]
    ProfileExists,

    #[error("Access denied")]
    NotOwner,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for DoctorError {
    fn from(e: anyhow::Error) -> Self {
        DoctorError::DatabaseError(e.to_string())
    }
}

impl From<DoctorError> for AppError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::NotFound => AppError::NotFound(e.to_string()),
            DoctorError::InvalidUser | DoctorError::ProfileExists => {
                AppError::BadRequest(e.to_string())
            }
            DoctorError::NotOwner => AppError::Forbidden(e.to_string()),
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
