use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::{auth_middleware, require_admin};

use crate::handlers;

pub fn service_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::list_services))
        .route("/{service_id}", get(handlers::get_service));

    // Catalogue changes are admin only
    let admin_routes = Router::new()
        .route("/", post(handlers::create_service))
        .route(
            "/{service_id}",
            patch(handlers::update_service).delete(handlers::delete_service),
        )
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state)
}
