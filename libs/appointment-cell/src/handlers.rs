use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::{AppJson, AppPath, AppQuery};

use crate::models::{Appointment, CreateAppointmentRequest, SlotQuery, UpdateAppointmentRequest};
use crate::services::AppointmentBookingService;

pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    AppJson(request): AppJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service.book_appointment(&user, request).await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    let appointments = booking_service.list_appointments(&user).await?;

    Ok(Json(appointments))
}

pub async fn update_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    AppPath(appointment_id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service
        .update_status(&user, &appointment_id, request.status)
        .await?;

    Ok(Json(appointment))
}

pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    AppQuery(query): AppQuery<SlotQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    let slots = booking_service
        .available_slots(&query.doctor_id, query.date)
        .await?;

    Ok(Json(slots))
}
