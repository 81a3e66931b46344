//! Contract tests for OtpClient.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST | `/otp/api/v1/send` | `send_*` |
//! | POST | `/otp/api/v1/verify` | `verify_*` |

use onboard_client::{OnboardApiConfig, OnboardClient};
use onboard_core::{Channel, VerifyOutcome};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> OnboardClient {
    let config = OnboardApiConfig::single_host(mock_server.uri().parse().unwrap(), "test-token");
    OnboardClient::new(config).unwrap()
}

#[tokio::test]
async fn send_posts_channel_and_destination_with_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/otp/api/v1/send"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(serde_json::json!({
            "channel": "mobile",
            "destination": "9876543210"
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    client
        .otp()
        .send(Channel::Mobile, "9876543210")
        .await
        .unwrap();
}

#[tokio::test]
async fn send_failure_carries_service_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/otp/api/v1/send"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(serde_json::json!({"message": "SMS gateway is down"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .otp()
        .send(Channel::Mobile, "9876543210")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.service_message().as_deref(), Some("SMS gateway is down"));
}

#[tokio::test]
async fn verify_true_is_verified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/otp/api/v1/verify"))
        .and(body_json(serde_json::json!({
            "channel": "email",
            "destination": "ops@acme.in",
            "code": "123456"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"verified": true})))
        .mount(&mock_server)
        .await;

    let outcome = test_client(&mock_server)
        .otp()
        .verify(Channel::Email, "ops@acme.in", "123456")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Verified);
}

#[tokio::test]
async fn verify_false_is_mismatch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/otp/api/v1/verify"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"verified": false})),
        )
        .mount(&mock_server)
        .await;

    let outcome = test_client(&mock_server)
        .otp()
        .verify(Channel::Email, "ops@acme.in", "000000")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Mismatch);
}

#[tokio::test]
async fn verify_client_error_is_mismatch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/otp/api/v1/verify"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid code"}"#))
        .mount(&mock_server)
        .await;

    let outcome = test_client(&mock_server)
        .otp()
        .verify(Channel::Mobile, "9876543210", "999999")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Mismatch);
}

#[tokio::test]
async fn verify_rate_limit_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/otp/api/v1/verify"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(serde_json::json!({"message": "Too many attempts"})),
        )
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .otp()
        .verify(Channel::Mobile, "9876543210", "999999")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(429));
    assert_eq!(err.service_message().as_deref(), Some("Too many attempts"));
}

#[tokio::test]
async fn verify_server_error_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/otp/api/v1/verify"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .otp()
        .verify(Channel::Email, "ops@acme.in", "123456")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.service_message(), None);
}
