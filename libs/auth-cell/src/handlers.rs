use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{AuthResponse, User};
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;

use crate::models::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::services::AccountService;

pub async fn register(
    State(config): State<Arc<AppConfig>>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let account_service = AccountService::new(&config);
    let response = account_service.register(request).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(config): State<Arc<AppConfig>>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let account_service = AccountService::new(&config);
    let response = account_service.login(request).await?;

    Ok(Json(response))
}

pub async fn get_profile(Extension(user): Extension<User>) -> Result<Json<User>, AppError> {
    debug!("Getting profile for user: {}", user.id);
    Ok(Json(user))
}

pub async fn update_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    AppJson(request): AppJson<UpdateProfileRequest>,
) -> Result<Json<User>, AppError> {
    let account_service = AccountService::new(&config);
    let updated = account_service.update_profile(&user, request).await?;

    Ok(Json(updated))
}
