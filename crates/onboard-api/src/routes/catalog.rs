//! # Product Catalog Entry
//!
//! `POST /v1/sellers/{seller_id}/products`: validate a product draft
//! against the seller's approved product types and forward it to the
//! catalog collaborator.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use onboard_core::ApplicationId;
use onboard_state::ProductDraft;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::orchestration::{call_collaborator, collaborator_error};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    /// Name, product type, manufacturer, pack size, HSN code, MRP in
    /// rupees and the prescription flag.
    #[schema(value_type = Object)]
    #[serde(flatten)]
    pub draft: ProductDraft,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateProductResponse {
    pub product_id: String,
    pub seller_id: String,
    pub mrp_paise: u64,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/sellers/{seller_id}/products", post(create_product))
}

/// POST /v1/sellers/{seller_id}/products
#[utoipa::path(
    post,
    path = "/v1/sellers/{seller_id}/products",
    params(("seller_id" = String, Path, description = "Application ID of the onboarded seller")),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product listed", body = CreateProductResponse),
        (status = 404, description = "Unknown seller", body = crate::error::ErrorBody),
        (status = 422, description = "Draft failed validation", body = crate::error::ErrorBody),
        (status = 503, description = "Catalog service unavailable", body = crate::error::ErrorBody),
        (status = 504, description = "Catalog service timed out", body = crate::error::ErrorBody),
    ),
    tag = "catalog"
)]
async fn create_product(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(seller_id): Path<String>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateProductResponse>), AppError> {
    require_role(&caller, Role::Seller)?;
    let seller = ApplicationId::new(seller_id)?;
    let draft = extract_json(body)?.draft;
    state.gateways()?;

    let target = seller.clone();
    let detail = call_collaborator(&state, "fetch_seller_detail", move |g| async move {
        g.review.fetch_seller_detail(&target).await
    })
    .await
    .map_err(collaborator_error)?
    .ok_or_else(|| AppError::NotFound(format!("seller {seller} not found")))?;

    let product = draft.validate(&detail.product_types)?;
    let mrp_paise = product.mrp_paise;
    let target = seller.clone();
    let created = call_collaborator(&state, "create_product", move |g| async move {
        g.catalog.create_product(&target, &product).await
    })
    .await
    .map_err(collaborator_error)?;

    tracing::info!(seller_id = %seller, product_id = %created.product_id, "product listed");
    Ok((
        StatusCode::CREATED,
        Json(CreateProductResponse {
            product_id: created.product_id,
            seller_id: seller.to_string(),
            mrp_paise,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use axum::Extension;
    use http_body_util::BodyExt;
    use onboard_client::mock::{MockBankDirectory, MockOtpGateway, MockSellerService};
    use onboard_state::testing::complete_record;
    use tower::ServiceExt;

    use crate::auth::AuthConfig;
    use crate::state::{AppConfig, Gateways};

    fn setup() -> (Router, Arc<MockSellerService>, ApplicationId, String) {
        let sellers = Arc::new(MockSellerService::new());
        let application = complete_record().to_application();
        let approved = application
            .documents
            .product_types
            .iter()
            .next()
            .map(|pt| pt.to_string())
            .unwrap();
        let id = sellers.seed(application).unwrap();
        let gateways = Gateways::mock(
            Arc::new(MockOtpGateway::new()),
            Arc::new(MockBankDirectory::new()),
            sellers.clone(),
        );
        let app = router()
            .layer(axum::middleware::from_fn(crate::auth::auth_middleware))
            .layer(Extension(AuthConfig { token: None }))
            .with_state(AppState::new(AppConfig::default(), Some(gateways)));
        (app, sellers, id, approved)
    }

    fn draft(product_type: &str, mrp: &str) -> serde_json::Value {
        serde_json::json!({
            "name": "Paracetamol 500mg",
            "product_type": product_type,
            "manufacturer": "Acme Pharma",
            "pack_size": "10 tablets",
            "hsn_code": "30049099",
            "mrp": mrp,
            "prescription_required": false,
        })
    }

    async fn post(app: &Router, uri: String, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn valid_draft_is_listed() {
        let (app, sellers, id, approved) = setup();
        let (status, body) = post(&app, format!("/v1/sellers/{id}/products"), draft(&approved, "149.50")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["mrp_paise"], 14950);
        assert_eq!(sellers.products().len(), 1);
    }

    #[tokio::test]
    async fn unapproved_type_is_422_with_field() {
        let (app, sellers, id, _) = setup();
        let (status, body) = post(&app, format!("/v1/sellers/{id}/products"), draft("Veterinary", "10")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"]["field"], "product_type");
        assert!(sellers.products().is_empty());
    }

    #[tokio::test]
    async fn catalog_rejection_is_503_with_message() {
        let (app, sellers, id, approved) = setup();
        sellers.reject_next("Catalog is frozen for maintenance");
        let (status, body) = post(&app, format!("/v1/sellers/{id}/products"), draft(&approved, "12")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["message"], "Catalog is frozen for maintenance");
    }

    #[tokio::test]
    async fn unknown_seller_is_404() {
        let (app, _, _, approved) = setup();
        let (status, _) = post(&app, "/v1/sellers/APP-0/products".to_string(), draft(&approved, "12")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
