use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::{AppJson, AppPath, AppQuery};

use crate::models::{
    CreateDoctorRequest, Doctor, DoctorListQuery, RateDoctorRequest, UpdateDoctorRequest,
};
use crate::services::DoctorService;

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    AppQuery(query): AppQuery<DoctorListQuery>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctors = doctor_service
        .list_doctors(query.specialization.as_deref())
        .await?;

    Ok(Json(doctors))
}

pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    AppPath(doctor_id): AppPath<Uuid>,
) -> Result<Json<Doctor>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctor = doctor_service.get_doctor(&doctor_id).await?;

    Ok(Json(doctor))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

pub async fn create_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    AppJson(request): AppJson<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Doctor>), AppError> {
    debug!("Admin {} creating doctor profile", user.id);

    let doctor_service = DoctorService::new(&state);
    let doctor = doctor_service.create_doctor(request).await?;

    Ok((StatusCode::CREATED, Json(doctor)))
}

pub async fn update_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    AppPath(doctor_id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateDoctorRequest>,
) -> Result<Json<Doctor>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctor = doctor_service
        .update_doctor(&user, &doctor_id, request)
        .await?;

    Ok(Json(doctor))
}

pub async fn rate_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    AppPath(doctor_id): AppPath<Uuid>,
    AppJson(request): AppJson<RateDoctorRequest>,
) -> Result<Json<Doctor>, AppError> {
    debug!("User {} rating doctor {}", user.id, doctor_id);

    let doctor_service = DoctorService::new(&state);
    let doctor = doctor_service.rate_doctor(&doctor_id, request.rating).await?;

    Ok(Json(doctor))
}
