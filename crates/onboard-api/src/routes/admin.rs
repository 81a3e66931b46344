//! # Admin Review Console
//!
//! Reviewer-only endpoints over a submitted application. The first `GET`
//! fetches the application from the seller service and opens a checklist
//! with one line item per uploaded document; later requests work on that
//! checklist.
//!
//! ## Endpoints
//!
//! - `GET  /v1/admin/sellers/{id}`: open or read the checklist
//! - `PUT  /v1/admin/sellers/{id}/items/{item_id}`: mark a document
//! - `POST /v1/admin/sellers/{id}/decision`: accept, reject or send back

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use onboard_core::{ApplicationId, ReviewDecision};
use onboard_state::{ReviewChecklist, ReviewOutcome};

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::orchestration::{call_collaborator, collaborator_error, run_review_decision};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub application_id: String,
    /// True when every item is verified and no decision is pending.
    pub can_accept: bool,
    #[schema(value_type = Object)]
    pub checklist: ReviewChecklist,
}

impl ReviewResponse {
    fn new(id: &ApplicationId, checklist: ReviewChecklist) -> Self {
        Self {
            application_id: id.to_string(),
            can_accept: checklist.can_accept(),
            checklist,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DecisionResponse {
    /// `recorded`, `failed` or `stale`.
    pub outcome: String,
    #[serde(flatten)]
    pub review: ReviewResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkItemRequest {
    pub verified: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecisionRequest {
    /// `accept`, `reject` or `correction`.
    #[schema(value_type = String)]
    pub decision: ReviewDecision,
    /// Required for `reject` and `correction`.
    #[serde(default)]
    pub comment: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/sellers/{id}", get(get_review))
        .route("/v1/admin/sellers/{id}/items/{item_id}", put(mark_item))
        .route("/v1/admin/sellers/{id}/decision", post(decide))
}

fn application_id(caller: &CallerIdentity, raw: String) -> Result<ApplicationId, AppError> {
    require_role(caller, Role::Reviewer)?;
    Ok(ApplicationId::new(raw)?)
}

fn checklist_of(state: &AppState, id: &ApplicationId) -> Result<ReviewChecklist, AppError> {
    state
        .reviews
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("no review open for {id}")))
}

/// GET /v1/admin/sellers/{id}
#[utoipa::path(
    get,
    path = "/v1/admin/sellers/{id}",
    params(("id" = String, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Review checklist", body = ReviewResponse),
        (status = 404, description = "Unknown application", body = crate::error::ErrorBody),
        (status = 503, description = "Seller service unavailable", body = crate::error::ErrorBody),
        (status = 504, description = "Seller service timed out", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
async fn get_review(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ReviewResponse>, AppError> {
    let id = application_id(&caller, id)?;
    if let Some(checklist) = state.reviews.get(&id) {
        return Ok(Json(ReviewResponse::new(&id, checklist)));
    }

    state.gateways()?;
    let target = id.clone();
    let detail = call_collaborator(&state, "fetch_seller_detail", move |g| async move {
        g.review.fetch_seller_detail(&target).await
    })
    .await
    .map_err(collaborator_error)?
    .ok_or_else(|| AppError::NotFound(format!("application {id} not found")))?;

    tracing::info!(application_id = %id, documents = detail.documents.len(), "review opened");
    let checklist = state
        .reviews
        .get_or_insert(id.clone(), ReviewChecklist::from_detail(detail));
    Ok(Json(ReviewResponse::new(&id, checklist)))
}

/// PUT /v1/admin/sellers/{id}/items/{item_id}
#[utoipa::path(
    put,
    path = "/v1/admin/sellers/{id}/items/{item_id}",
    params(
        ("id" = String, Path, description = "Application ID"),
        ("item_id" = String, Path, description = "Checklist item, e.g. gst_certificate"),
    ),
    request_body = MarkItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ReviewResponse),
        (status = 404, description = "No open review or unknown item", body = crate::error::ErrorBody),
        (status = 409, description = "Review closed or decision pending", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
async fn mark_item(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, item_id)): Path<(String, String)>,
    body: Result<Json<MarkItemRequest>, JsonRejection>,
) -> Result<Json<ReviewResponse>, AppError> {
    let id = application_id(&caller, id)?;
    let verified = extract_json(body)?.verified;
    state
        .reviews
        .update(&id, |checklist| checklist.mark(&item_id, verified))
        .ok_or_else(|| AppError::NotFound(format!("no review open for {id}")))??;
    Ok(Json(ReviewResponse::new(&id, checklist_of(&state, &id)?)))
}

/// POST /v1/admin/sellers/{id}/decision
///
/// A collaborator failure reopens the checklist with a message rather
/// than failing the request.
#[utoipa::path(
    post,
    path = "/v1/admin/sellers/{id}/decision",
    params(("id" = String, Path, description = "Application ID")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision attempted", body = DecisionResponse),
        (status = 409, description = "Review closed or decision pending", body = crate::error::ErrorBody),
        (status = 422, description = "Unverified items or missing comment", body = crate::error::ErrorBody),
        (status = 503, description = "Seller service not configured", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
async fn decide(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
    body: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<DecisionResponse>, AppError> {
    let id = application_id(&caller, id)?;
    let req = extract_json(body)?;
    state.gateways()?;

    let ticket = state
        .reviews
        .update(&id, |checklist| checklist.decide(req.decision, &req.comment))
        .ok_or_else(|| AppError::NotFound(format!("no review open for {id}")))??;
    let outcome = match run_review_decision(&state, &id, ticket).await? {
        ReviewOutcome::Recorded(_) => "recorded",
        ReviewOutcome::Failed(_) => "failed",
        ReviewOutcome::Stale => "stale",
    };

    Ok(Json(DecisionResponse {
        outcome: outcome.to_string(),
        review: ReviewResponse::new(&id, checklist_of(&state, &id)?),
    }))
}
