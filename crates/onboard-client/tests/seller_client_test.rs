//! Contract tests for SellerClient.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST | `/seller/api/v1/applications` | `submit_*` |
//! | GET | `/seller/api/v1/applications/{id}` | `fetch_detail_*` |
//! | POST | `/seller/api/v1/applications/{id}/review` | `submit_review_*` |
//! | POST | `/seller/api/v1/sellers/{id}/products` | `create_product_*` |

use onboard_client::{OnboardApiConfig, OnboardClient};
use onboard_core::{
    ApplicationId, BankAccount, CompanyDetails, CoordinatorDetails, DocumentSet, NewProduct,
    ProductType, ReviewDecision, SellerApplication,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> OnboardClient {
    let config = OnboardApiConfig::single_host(mock_server.uri().parse().unwrap(), "test-token");
    OnboardClient::new(config).unwrap()
}

fn application() -> SellerApplication {
    SellerApplication {
        company: CompanyDetails {
            company_name: "Acme Pharma".into(),
            ..Default::default()
        },
        coordinator: CoordinatorDetails::default(),
        documents: DocumentSet::default(),
        bank: BankAccount::default(),
        terms_accepted: true,
    }
}

#[tokio::test]
async fn submit_returns_receipt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/seller/api/v1/applications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "applicationId": "APP-2042",
            "submittedAt": "2026-03-01T09:30:00Z"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let receipt = test_client(&mock_server)
        .sellers()
        .submit(&application())
        .await
        .unwrap();
    assert_eq!(receipt.application_id.as_str(), "APP-2042");
    assert_eq!(receipt.submitted_at.to_rfc3339(), "2026-03-01T09:30:00+00:00");
}

#[tokio::test]
async fn submit_rejection_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/seller/api/v1/applications"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(serde_json::json!({"message": "GSTIN already registered"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .sellers()
        .submit(&application())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(
        err.service_message().as_deref(),
        Some("GSTIN already registered")
    );
}

#[tokio::test]
async fn submit_blank_application_id_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/seller/api/v1/applications"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({"applicationId": "  "})),
        )
        .mount(&mock_server)
        .await;

    assert!(test_client(&mock_server)
        .sellers()
        .submit(&application())
        .await
        .is_err());
}

#[tokio::test]
async fn fetch_detail_parses_documents() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/seller/api/v1/applications/APP-2042"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "application_id": "APP-2042",
            "company_name": "Acme Pharma",
            "gstin": "27AAPFU0939F1ZV",
            "product_types": ["Drugs"],
            "documents": [
                {
                    "item_id": "gst_certificate",
                    "label": "GST certificate",
                    "file": {"id": "f-1", "name": "gst.pdf"}
                }
            ],
            "status": "pending_review"
        })))
        .mount(&mock_server)
        .await;

    let id = ApplicationId::new("APP-2042").unwrap();
    let detail = test_client(&mock_server)
        .sellers()
        .fetch_detail(&id)
        .await
        .unwrap()
        .expect("application exists");
    assert_eq!(detail.company_name, "Acme Pharma");
    assert_eq!(detail.product_types, vec![ProductType::new("Drugs").unwrap()]);
    assert_eq!(detail.documents.len(), 1);
    assert_eq!(detail.documents[0].file.name, "gst.pdf");
    assert_eq!(detail.status.as_deref(), Some("pending_review"));
}

#[tokio::test]
async fn fetch_detail_404_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/seller/api/v1/applications/APP-404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let id = ApplicationId::new("APP-404").unwrap();
    assert!(test_client(&mock_server)
        .sellers()
        .fetch_detail(&id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn submit_review_sends_decision_and_comment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/seller/api/v1/applications/APP-2042/review"))
        .and(body_json(serde_json::json!({
            "decision": "correction",
            "comment": "Drug license is expired"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let id = ApplicationId::new("APP-2042").unwrap();
    test_client(&mock_server)
        .sellers()
        .submit_review(&id, ReviewDecision::Correction, "Drug license is expired")
        .await
        .unwrap();
}

#[tokio::test]
async fn submit_review_omits_empty_comment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/seller/api/v1/applications/APP-2042/review"))
        .and(body_json(serde_json::json!({"decision": "accept"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let id = ApplicationId::new("APP-2042").unwrap();
    test_client(&mock_server)
        .sellers()
        .submit_review(&id, ReviewDecision::Accept, "")
        .await
        .unwrap();
}

#[tokio::test]
async fn create_product_returns_product_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/seller/api/v1/sellers/APP-2042/products"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({"productId": "PRD-77"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let product = NewProduct {
        name: "Paracetamol 500mg".into(),
        product_type: ProductType::new("Drugs").unwrap(),
        manufacturer: "Acme Pharma".into(),
        pack_size: "10 x 10 tablets".into(),
        hsn_code: "30049099".into(),
        mrp_paise: 3550,
        prescription_required: false,
    };
    let id = ApplicationId::new("APP-2042").unwrap();
    let created = test_client(&mock_server)
        .sellers()
        .create_product(&id, &product)
        .await
        .unwrap();
    assert_eq!(created.product_id, "PRD-77");
}
