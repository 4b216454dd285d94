use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

fn default_available() -> bool {
    true
}

/// A bookable clinic offering, stored in the `services` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicService {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    /// Minutes.
    pub duration: i32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub duration: i32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateServiceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Service not found")]
    NotFound,

    #[error("Service name already exists")]
    DuplicateName,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for CatalogError {
    fn from(e: anyhow::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound => AppError::NotFound(e.to_string()),
            CatalogError::DuplicateName | CatalogError::Validation(_) => {
                AppError::BadRequest(e.to_string())
            }
            CatalogError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
