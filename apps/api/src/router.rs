use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use doctor_cell::router::doctor_routes;
use service_cell::router::service_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Easter Healing Clinic API is running!" }))
        .nest("/api/auth", auth_routes(state.clone()))
        .nest("/api/doctors", doctor_routes(state.clone()))
        .nest("/api/services", service_routes(state.clone()))
        .nest("/api/appointments", appointment_routes(state.clone()))
        .nest_service("/uploads", ServeDir::new(&state.uploads_dir))
}
