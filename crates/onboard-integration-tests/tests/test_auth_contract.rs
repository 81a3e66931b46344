//! Bearer-token roles across the full router.
//!
//! `seller:{secret}` may drive sessions and the catalog, `reviewer:{secret}`
//! (or the bare secret) may also use the admin console. Health checks and
//! `/metrics` never require a token.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use zeroize::Zeroizing;

use onboard_api::state::{AppConfig, AppState, Gateways};
use onboard_client::mock::{MockBankDirectory, MockOtpGateway, MockSellerService};
use onboard_state::testing::complete_record;

const SECRET: &str = "integration-secret";

fn secured_app() -> (axum::Router, String) {
    let sellers = Arc::new(MockSellerService::new());
    let id = sellers.seed(complete_record().to_application()).unwrap();
    let gateways = Gateways::mock(
        Arc::new(MockOtpGateway::new()),
        Arc::new(MockBankDirectory::new()),
        sellers,
    );
    let config = AppConfig {
        auth_token: Some(Zeroizing::new(SECRET.to_string())),
        ..AppConfig::default()
    };
    (onboard_api::app(AppState::new(config, Some(gateways))), id.to_string())
}

async fn call(app: &axum::Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder
        .body(match body {
            Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
            None => Body::empty(),
        })
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn missing_or_wrong_token_is_401() {
    let (app, _) = secured_app();
    let (status, body) = call(&app, "POST", "/v1/sessions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = call(&app, "POST", "/v1/sessions", Some("seller:wrong"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let secret = format!("auditor:{SECRET}");
    let (status, _) = call(&app, "POST", "/v1/sessions", Some(&secret), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn seller_token_drives_sessions_but_not_admin() {
    let (app, application_id) = secured_app();
    let seller = format!("seller:{SECRET}");

    let (status, body) = call(&app, "POST", "/v1/sessions", Some(&seller), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = body["session_id"].as_str().unwrap().to_string();
    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/v1/sessions/{session_id}/fields"),
        Some(&seller),
        Some(json!({ "company_name": "Acme Pharma Pvt Ltd" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, "GET", &format!("/v1/admin/sellers/{application_id}"), Some(&seller), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn reviewer_and_bare_secret_reach_admin() {
    let (app, application_id) = secured_app();
    let uri = format!("/v1/admin/sellers/{application_id}");

    let reviewer = format!("reviewer:{SECRET}");
    let (status, body) = call(&app, "GET", &uri, Some(&reviewer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["application_id"], application_id.as_str());

    let (status, _) = call(&app, "GET", &uri, Some(SECRET), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_and_metrics_skip_auth() {
    let (app, _) = secured_app();
    let (status, _) = call(&app, "GET", "/health/liveness", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "GET", "/health/readiness", None, None).await;
    assert_eq!(status, StatusCode::OK);

    // No recorder is installed here, so the route answers but cannot render.
    let (status, _) = call(&app, "GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = call(&app, "GET", "/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = call(&app, "GET", "/openapi.json", Some(SECRET), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/v1/sessions"].is_object());
}
