//! Contract tests for BankClient.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET | `/ifsc/api/v1/{code}` | `lookup_*` |

use onboard_client::{OnboardApiConfig, OnboardClient};
use onboard_core::Ifsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> OnboardClient {
    let config = OnboardApiConfig::single_host(mock_server.uri().parse().unwrap(), "test-token");
    OnboardClient::new(config).unwrap()
}

#[tokio::test]
async fn lookup_maps_camel_case_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ifsc/api/v1/SBIN0005943"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bankName": "State Bank of India",
            "branch": "Koramangala",
            "state": "Karnataka",
            "district": "Bengaluru Urban",
            "micr": "560002057"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ifsc = Ifsc::new("SBIN0005943").unwrap();
    let details = test_client(&mock_server)
        .bank()
        .lookup(&ifsc)
        .await
        .unwrap()
        .expect("known IFSC");
    assert_eq!(details.bank_name, "State Bank of India");
    assert_eq!(details.branch, "Koramangala");
    assert_eq!(details.state, "Karnataka");
    assert_eq!(details.district, "Bengaluru Urban");
}

#[tokio::test]
async fn lookup_accepts_uppercase_directory_keys() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ifsc/api/v1/HDFC0000240"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "BANK": "HDFC Bank",
            "BRANCH": "Andheri East",
            "STATE": "Maharashtra",
            "DISTRICT": "Mumbai"
        })))
        .mount(&mock_server)
        .await;

    let details = test_client(&mock_server)
        .bank()
        .lookup(&Ifsc::new("HDFC0000240").unwrap())
        .await
        .unwrap()
        .expect("known IFSC");
    assert_eq!(details.bank_name, "HDFC Bank");
    assert_eq!(details.district, "Mumbai");
}

#[tokio::test]
async fn lookup_404_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ifsc/api/v1/ABCD0123456"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let result = test_client(&mock_server)
        .bank()
        .lookup(&Ifsc::new("ABCD0123456").unwrap())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn lookup_server_error_is_reported_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ifsc/api/v1/SBIN0005943"))
        .respond_with(ResponseTemplate::new(500).set_body_string("directory crashed"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .bank()
        .lookup(&Ifsc::new("SBIN0005943").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn lookup_recovers_from_a_bad_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ifsc/api/v1/SBIN0005943"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ifsc/api/v1/SBIN0005943"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bankName": "State Bank of India",
            "branch": "Kasba",
            "state": "West Bengal",
            "district": "Kolkata"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let details = test_client(&mock_server)
        .bank()
        .lookup(&Ifsc::new("SBIN0005943").unwrap())
        .await
        .unwrap()
        .expect("known IFSC");
    assert_eq!(details.bank_name, "State Bank of India");
}

#[tokio::test]
async fn lookup_malformed_body_is_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ifsc/api/v1/SBIN0005943"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .bank()
        .lookup(&Ifsc::new("SBIN0005943").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        onboard_client::ClientError::Deserialization { .. }
    ));
}
