//! Router-level tests. These requests are all rejected before any query runs,
//! so the lazily connected pool never opens a connection.

use axum::{
    body::Body,
    extract::FromRef,
    http::{header, Method, Request, StatusCode},
    Router,
};
use laporan::{app::build_app, auth::jwt::JwtKeys, state::AppState, users::Role};
use serde_json::Value;
use tower::ServiceExt;

fn app_and_keys() -> (Router, JwtKeys) {
    let state = AppState::fake();
    let keys = JwtKeys::from_ref(&state);
    (build_app(state), keys)
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn error_code(res: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), 64 * 1024).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    json["error"]["code"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = app_and_keys();
    let res = app
        .oneshot(request(Method::GET, "/api/v1/health", None, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (app, _) = app_and_keys();
    let res = app
        .oneshot(request(Method::GET, "/api/v1/reports/mine", None, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(res).await, "UNAUTHORIZED");
}

#[tokio::test]
async fn refresh_token_cannot_be_used_as_access_token() {
    let (app, keys) = app_and_keys();
    let token = keys.sign_refresh(1, Role::Admin).unwrap();
    let res = app
        .oneshot(request(Method::GET, "/api/v1/reports", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reporter_cannot_reach_admin_routes() {
    let (app, keys) = app_and_keys();
    let token = keys.sign_access(5, Role::Reporter).unwrap();

    for (method, uri, body) in [
        (Method::GET, "/api/v1/reports", None),
        (Method::GET, "/api/v1/users", None),
        (Method::GET, "/api/v1/dashboard/admin", None),
        (Method::GET, "/api/v1/export/reports", None),
        (
            Method::PATCH,
            "/api/v1/reports/1/status",
            Some(r#"{"status":"proses"}"#),
        ),
        (
            Method::POST,
            "/api/v1/reports/1/progress",
            Some(r#"{"note":"dicek"}"#),
        ),
        (Method::POST, "/api/v1/categories", Some(r#"{"name":"Sarpras"}"#)),
    ] {
        let res = app
            .clone()
            .oneshot(request(method.clone(), uri, Some(&token), body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn create_report_validates_npsn() {
    let (app, keys) = app_and_keys();
    let token = keys.sign_access(5, Role::Reporter).unwrap();
    let body = r#"{
        "npsn": "1234",
        "school_name": "SDN 1 Sukamaju",
        "category_id": 1,
        "issue_description": "Data siswa tidak muncul di aplikasi"
    }"#;
    let res = app
        .oneshot(request(Method::POST, "/api/v1/reports", Some(&token), Some(body)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "VALIDATION_ERROR");
}

#[tokio::test]
async fn create_report_validates_description_length() {
    let (app, keys) = app_and_keys();
    let token = keys.sign_access(5, Role::Reporter).unwrap();
    let body = r#"{
        "npsn": "12345678",
        "school_name": "SDN 1 Sukamaju",
        "category_id": 1,
        "issue_description": "rusak",
        "nisn": "0012345678"
    }"#;
    let res = app
        .oneshot(request(Method::POST, "/api/v1/reports", Some(&token), Some(body)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_report_validates_nisn() {
    let (app, keys) = app_and_keys();
    let token = keys.sign_access(5, Role::Reporter).unwrap();
    let res = app
        .oneshot(request(
            Method::PATCH,
            "/api/v1/reports/1",
            Some(&token),
            Some(r#"{"nisn":"12345"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_status_value_is_rejected() {
    let (app, keys) = app_and_keys();
    let token = keys.sign_access(1, Role::Admin).unwrap();
    let res = app
        .oneshot(request(
            Method::PATCH,
            "/api/v1/reports/1/status",
            Some(&token),
            Some(r#"{"status":"closed"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn report_filters_reject_malformed_dates() {
    let (app, keys) = app_and_keys();
    let token = keys.sign_access(1, Role::Reporter).unwrap();
    let res = app
        .oneshot(request(
            Method::GET,
            "/api/v1/reports/mine?date_from=01-02-2024",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "VALIDATION_ERROR");
}

#[tokio::test]
async fn change_password_enforces_minimum_length() {
    let (app, keys) = app_and_keys();
    let token = keys.sign_access(5, Role::Reporter).unwrap();
    let res = app
        .oneshot(request(
            Method::POST,
            "/api/v1/auth/password",
            Some(&token),
            Some(r#"{"current_password":"whatever1","new_password":"short"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
