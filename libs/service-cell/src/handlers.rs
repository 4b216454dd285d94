use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::extractor::{AppJson, AppPath, AppQuery};

use crate::models::{ClinicService, CreateServiceRequest, ServiceListQuery, UpdateServiceRequest};
use crate::services::ServiceCatalog;

pub async fn list_services(
    State(state): State<Arc<AppConfig>>,
    AppQuery(query): AppQuery<ServiceListQuery>,
) -> Result<Json<Vec<ClinicService>>, AppError> {
    let catalog = ServiceCatalog::new(&state);
    let services = catalog.list_services(query.category.as_deref()).await?;

    Ok(Json(services))
}

pub async fn get_service(
    State(state): State<Arc<AppConfig>>,
    AppPath(service_id): AppPath<Uuid>,
) -> Result<Json<ClinicService>, AppError> {
    let catalog = ServiceCatalog::new(&state);
    let service = catalog.get_service(&service_id).await?;

    Ok(Json(service))
}

pub async fn create_service(
    State(state): State<Arc<AppConfig>>,
    AppJson(request): AppJson<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ClinicService>), AppError> {
    let catalog = ServiceCatalog::new(&state);
    let service = catalog.create_service(request).await?;

    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update_service(
    State(state): State<Arc<AppConfig>>,
    AppPath(service_id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateServiceRequest>,
) -> Result<Json<ClinicService>, AppError> {
    let catalog = ServiceCatalog::new(&state);
    let service = catalog.update_service(&service_id, request).await?;

    Ok(Json(service))
}

pub async fn delete_service(
    State(state): State<Arc<AppConfig>>,
    AppPath(service_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let catalog = ServiceCatalog::new(&state);
    catalog.delete_service(&service_id).await?;

    Ok(Json(json!({ "message": "Service deleted successfully" })))
}
