use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::router::auth_routes;
use auth_cell::services::password::hash_password;
use shared_utils::jwt::validate_token;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

fn create_test_app(config: &TestConfig) -> Router {
    auth_routes(config.to_arc())
}

async fn send(app: Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn mount_user_by_id(server: &MockServer, user: &TestUser) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([MockSupabaseResponses::user_response(user)])),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_register_success_returns_user_and_token() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store(&mock_server.uri());
    let user = TestUser::patient("new@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.new@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({ "email": "new@example.com", "role": "patient" })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([MockSupabaseResponses::user_response_with_hash(&user, "$argon2id$stub")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        create_test_app(&config),
        "POST",
        "/register",
        None,
        Some(json!({ "name": "New Patient", "email": " New@Example.com ", "password": "hunter22" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "new@example.com");
    assert!(body["user"].get("password_hash").is_none());

    let claims = validate_token(body["token"].as_str().unwrap(), &config.jwt_secret).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
}

#[tokio::test]
async fn test_register_twice_with_same_email_is_rejected() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store(&mock_server.uri());
    let user = TestUser::patient("dup@example.com");

    // First lookup finds nothing, every later lookup finds the stored row.
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.dup@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.dup@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockSupabaseResponses::user_response(&user)])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([MockSupabaseResponses::user_response(&user)])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = json!({ "name": "Dup", "email": "dup@example.com", "password": "hunter22" });

    let (first, _) = send(create_test_app(&config), "POST", "/register", None, Some(request.clone())).await;
    let (second, body) = send(create_test_app(&config), "POST", "/register", None, Some(request)).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn test_register_rejects_malformed_email() {
    let config = TestConfig::default();
    let (status, _) = send(
        create_test_app(&config),
        "POST",
        "/register",
        None,
        Some(json!({ "name": "X", "email": "not-an-email", "password": "hunter22" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_success() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store(&mock_server.uri());
    let user = TestUser::doctor("doc@example.com");
    let hash = hash_password("right-password").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.doc@example.com"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([MockSupabaseResponses::user_response_with_hash(&user, &hash)])),
        )
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        create_test_app(&config),
        "POST",
        "/login",
        None,
        Some(json!({ "email": "doc@example.com", "password": "right-password" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "doctor");
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_both_unauthorized() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store(&mock_server.uri());
    let user = TestUser::patient("known@example.com");
    let hash = hash_password("right-password").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.known@example.com"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([MockSupabaseResponses::user_response_with_hash(&user, &hash)])),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let (wrong_password, wrong_body) = send(
        create_test_app(&config),
        "POST",
        "/login",
        None,
        Some(json!({ "email": "known@example.com", "password": "wrong-password" })),
    )
    .await;
    let (unknown_email, unknown_body) = send(
        create_test_app(&config),
        "POST",
        "/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "wrong-password" })),
    )
    .await;

    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_get_profile_requires_token() {
    let config = TestConfig::default();
    let (status, body) = send(create_test_app(&config), "GET", "/profile", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Please authenticate");
}

#[tokio::test]
async fn test_get_profile_returns_authenticated_user() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store(&mock_server.uri());
    let user = TestUser::patient("me@example.com");
    mount_user_by_id(&mock_server, &user).await;

    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);
    let (status, body) = send(create_test_app(&config), "GET", "/profile", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user.id.to_string());
    assert_eq!(body["email"], "me@example.com");
}

#[tokio::test]
async fn test_update_profile_rejects_fields_outside_allow_list() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store(&mock_server.uri());
    let user = TestUser::patient("me@example.com");
    mount_user_by_id(&mock_server, &user).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);
    let (status, _) = send(
        create_test_app(&config),
        "PATCH",
        "/profile",
        Some(&token),
        Some(json!({ "name": "Renamed", "role": "admin" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_profile_applies_allowed_fields() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store(&mock_server.uri());
    let user = TestUser::patient("me@example.com");
    mount_user_by_id(&mock_server, &user).await;

    let mut renamed = MockSupabaseResponses::user_response(&user);
    renamed["name"] = json!("Renamed");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .and(body_partial_json(json!({ "name": "Renamed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([renamed])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);
    let (status, body) = send(
        create_test_app(&config),
        "PATCH",
        "/profile",
        Some(&token),
        Some(json!({ "name": "Renamed" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");
}

#[tokio::test]
async fn test_update_profile_to_email_owned_by_another_user_is_rejected() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_store(&mock_server.uri());
    let user = TestUser::patient("me@example.com");
    let other = TestUser::patient("taken@example.com");
    mount_user_by_id(&mock_server, &user).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.taken@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockSupabaseResponses::user_response(&other)])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);
    let (status, body) = send(
        create_test_app(&config),
        "PATCH",
        "/profile",
        Some(&token),
        Some(json!({ "email": "Taken@Example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");
}
