use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequest, FromRequestParts, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::jwt::validate_token;

pub const UNAUTHENTICATED: &str = "Please authenticate";
pub const ACCESS_DENIED: &str = "Access denied";

/// JSON body extractor whose rejections render as `{ "error": ... }` with 400.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query-string extractor with the same rejection shape as [`AppJson`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Path extractor with the same rejection shape as [`AppJson`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

// Verifies the bearer token, loads the user it names and attaches it to the request.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| {
            debug!("Missing or malformed authorization header");
            AppError::Auth(UNAUTHENTICATED.to_string())
        })?;

    let claims = validate_token(auth.token(), &config.jwt_secret).map_err(|e| {
        debug!("Rejected token: {}", e);
        AppError::Auth(UNAUTHENTICATED.to_string())
    })?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Auth(UNAUTHENTICATED.to_string()))?;

    let client = SupabaseClient::new(&config);
    let user = client
        .get_user(&user_id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| {
            warn!("Token subject {} no longer exists", user_id);
            AppError::Auth(UNAUTHENTICATED.to_string())
        })?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

// Second stage gate: must run after auth_middleware.
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let user = extract_user(&request)?;

    if !user.is_admin() {
        warn!("User {} with role {} denied admin route", user.id, user.role);
        return Err(AppError::Forbidden(ACCESS_DENIED.to_string()));
    }

    Ok(next.run(request).await)
}

// Function to extract user from request extensions
pub fn extract_user<B>(request: &Request<B>) -> Result<User, AppError> {
    request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| AppError::Auth(UNAUTHENTICATED.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        middleware,
        routing::get,
        Extension, Router,
    };
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

    async fn whoami(Extension(user): Extension<User>) -> String {
        user.email
    }

    fn app(config: Arc<AppConfig>) -> Router {
        let admin = Router::new()
            .route("/admin", get(whoami))
            .layer(middleware::from_fn(require_admin));

        Router::new()
            .route("/me", get(whoami))
            .merge(admin)
            .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
            .with_state(config)
    }

    async fn call(app: Router, uri: &str, token: Option<&str>) -> StatusCode {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    async fn mount_user(server: &MockServer, user: &TestUser) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .and(query_param("id", format!("eq.{}", user.id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([MockSupabaseResponses::user_response(user)])),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        let config = TestConfig::default().to_arc();
        assert_eq!(call(app(config), "/me", None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_token_is_unauthenticated() {
        let config = TestConfig::default();
        let user = TestUser::patient("p@example.com");
        let token = JwtTestUtils::create_expired_token(&user, &config.jwt_secret);
        assert_eq!(
            call(app(config.to_arc()), "/me", Some(&token)).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn unknown_subject_is_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let config = TestConfig::with_store(&server.uri());
        let user = TestUser::patient("ghost@example.com");
        let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);
        assert_eq!(
            call(app(config.to_arc()), "/me", Some(&token)).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn valid_token_attaches_user() {
        let server = MockServer::start().await;
        let config = TestConfig::with_store(&server.uri());
        let user = TestUser::patient("p@example.com");
        mount_user(&server, &user).await;

        let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);
        assert_eq!(
            call(app(config.to_arc()), "/me", Some(&token)).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn admin_gate_rejects_patient_and_admits_admin() {
        let server = MockServer::start().await;
        let config = TestConfig::with_store(&server.uri());
        let patient = TestUser::patient("p@example.com");
        let admin = TestUser::admin("a@example.com");
        mount_user(&server, &patient).await;
        mount_user(&server, &admin).await;

        let patient_token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, None);
        let admin_token = JwtTestUtils::create_test_token(&admin, &config.jwt_secret, None);

        assert_eq!(
            call(app(config.to_arc()), "/admin", Some(&patient_token)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            call(app(config.to_arc()), "/admin", Some(&admin_token)).await,
            StatusCode::OK
        );
    }

    #[test]
    fn extract_user_without_gate_fails() {
        let request = Request::builder().body(Body::empty()).unwrap();
        let err = extract_user(&request).unwrap_err();
        assert_matches::assert_matches!(err, AppError::Auth(_));
    }
}
