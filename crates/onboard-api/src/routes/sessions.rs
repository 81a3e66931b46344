//! # Onboarding Session API
//!
//! Server-side wizard sessions. Every route answers with the full
//! [`SessionView`] so a client can re-render from a single response.
//!
//! ## Endpoints
//!
//! - `POST   /v1/sessions`: start a session
//! - `GET    /v1/sessions/{id}`: current view
//! - `DELETE /v1/sessions/{id}`: discard the session
//! - `PATCH  /v1/sessions/{id}/fields`: batch of text fields
//! - `PUT    /v1/sessions/{id}/business-type`
//! - `PUT    /v1/sessions/{id}/terms`
//! - `POST   /v1/sessions/{id}/product-types/toggle`
//! - `PUT    /v1/sessions/{id}/licenses`
//! - `PUT    /v1/sessions/{id}/files/{slot}`, `DELETE` to clear
//! - `PUT    /v1/sessions/{id}/ifsc`: set the code and look it up
//! - `POST   /v1/sessions/{id}/continue`, `/back`, `/jump`
//! - `POST   /v1/sessions/{id}/ui/menu`: toggle a dropdown

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use onboard_core::{BusinessType, FileHandle, ProductType, SellerApplication, SessionId};
use onboard_state::{
    Advance, BankTicket, Field, FileSlot, Menu, OnboardingSession, SessionError, SessionView,
    SubmissionTicket, ValidationFailure, WizardStep,
};

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::orchestration::{run_bank_lookup, run_submission};
use crate::state::{AppState, SessionEntry};

// ── DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub session_id: Uuid,
    /// Wizard state, record, OTP channels, bank lookup and UI state.
    #[schema(value_type = Object)]
    pub view: SessionView,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BusinessTypeRequest {
    /// `None` clears the selection.
    pub business_type: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TermsRequest {
    pub accepted: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductTypeRequest {
    pub product_type: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FileRequest {
    /// Identifier issued by the upload service.
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LicenseRequest {
    pub product_type: String,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub file: Option<FileRequest>,
    /// Clear the uploaded license document.
    #[serde(default)]
    pub remove_file: bool,
}

impl Validate for LicenseRequest {
    fn validate(&self) -> Result<(), String> {
        if self.file.is_some() && self.remove_file {
            return Err("file and remove_file are mutually exclusive".into());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IfscRequest {
    pub ifsc: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct JumpRequest {
    /// Step number, 1 to 5.
    pub step: u8,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuRequest {
    /// `business_type` or `product_types`.
    #[schema(value_type = String)]
    pub menu: Menu,
}

// ── Helpers ─────────────────────────────────────────────────────────

pub(crate) fn respond(state: &AppState, id: SessionId) -> Result<Json<SessionResponse>, AppError> {
    let view = state.with_session(&id, |s| s.view())?;
    Ok(Json(SessionResponse {
        session_id: *id.as_uuid(),
        view,
    }))
}

fn to_file(req: FileRequest) -> Result<FileHandle, AppError> {
    Ok(FileHandle::new(req.id, req.name)?)
}

/// Write `updates` in order, stopping at the first refusal. A lookup
/// dispatched by an earlier field is handed back either way so it can be
/// completed.
fn apply_text_fields(
    session: &mut OnboardingSession,
    updates: Vec<(Field, String)>,
) -> (Option<BankTicket>, Result<(), SessionError>) {
    let mut ticket = None;
    for (field, value) in updates {
        match session.set_text(field, value) {
            Ok(Some(t)) => ticket = Some(t),
            Ok(None) => {}
            Err(e) => return (ticket, Err(e)),
        }
    }
    (ticket, Ok(()))
}

async fn finish_lookup(
    state: &AppState,
    id: SessionId,
    ticket: Option<BankTicket>,
) -> Result<Json<SessionResponse>, AppError> {
    if let Some(ticket) = ticket {
        run_bank_lookup(state, &id, ticket).await?;
    }
    respond(state, id)
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/sessions", post(create_session))
        .route("/v1/sessions/{id}", get(get_session).delete(delete_session))
        .route("/v1/sessions/{id}/fields", patch(set_fields))
        .route("/v1/sessions/{id}/business-type", put(set_business_type))
        .route("/v1/sessions/{id}/terms", put(set_terms))
        .route(
            "/v1/sessions/{id}/product-types/toggle",
            post(toggle_product_type),
        )
        .route("/v1/sessions/{id}/licenses", put(set_license))
        .route(
            "/v1/sessions/{id}/files/{slot}",
            put(set_file).delete(clear_file),
        )
        .route("/v1/sessions/{id}/ifsc", put(set_ifsc))
        .route("/v1/sessions/{id}/continue", post(continue_step))
        .route("/v1/sessions/{id}/back", post(back))
        .route("/v1/sessions/{id}/jump", post(jump))
        .route("/v1/sessions/{id}/ui/menu", post(toggle_menu))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/sessions: start a new onboarding session.
#[utoipa::path(
    post,
    path = "/v1/sessions",
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
        (status = 403, description = "Seller role required", body = crate::error::ErrorBody),
    ),
    tag = "sessions"
)]
async fn create_session(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::new();
    state.sessions.insert(id, SessionEntry::new());
    tracing::info!(session_id = %id, "onboarding session started");
    Ok((StatusCode::CREATED, respond(&state, id)?))
}

/// GET /v1/sessions/{id}
#[utoipa::path(
    get,
    path = "/v1/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Current session view", body = SessionResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorBody),
    ),
    tag = "sessions"
)]
async fn get_session(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    require_role(&caller, Role::Seller)?;
    respond(&state, SessionId::from_uuid(id))
}

/// DELETE /v1/sessions/{id}: discard a session. A collaborator call still
/// running for it completes into nothing.
#[utoipa::path(
    delete,
    path = "/v1/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 204, description = "Session discarded"),
        (status = 404, description = "Session not found", body = crate::error::ErrorBody),
    ),
    tag = "sessions"
)]
async fn delete_session(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::from_uuid(id);
    state
        .sessions
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(format!("session {id} not found")))?;
    tracing::info!(session_id = %id, "onboarding session discarded");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /v1/sessions/{id}/fields: write several text fields at once.
///
/// Unknown field names reject the whole batch before anything is written.
/// Fields are then applied in name order; a refusal part-way leaves the
/// earlier ones written, and a lookup they started still runs.
#[utoipa::path(
    patch,
    path = "/v1/sessions/{id}/fields",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = BTreeMap<String, String>,
    responses(
        (status = 200, description = "Fields written", body = SessionResponse),
        (status = 409, description = "Record is locked", body = crate::error::ErrorBody),
        (status = 422, description = "Unknown field", body = crate::error::ErrorBody),
    ),
    tag = "sessions"
)]
async fn set_fields(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<BTreeMap<String, String>>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::from_uuid(id);
    let updates = extract_json(body)?
        .into_iter()
        .map(|(name, value)| Ok((name.parse::<Field>()?, value)))
        .collect::<Result<Vec<_>, AppError>>()?;

    let (ticket, applied) = state.with_session(&id, |s| apply_text_fields(s, updates))?;
    if let Some(ticket) = ticket {
        run_bank_lookup(&state, &id, ticket).await?;
    }
    applied?;
    respond(&state, id)
}

/// PUT /v1/sessions/{id}/business-type
#[utoipa::path(
    put,
    path = "/v1/sessions/{id}/business-type",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = BusinessTypeRequest,
    responses(
        (status = 200, description = "Business type set", body = SessionResponse),
        (status = 422, description = "Unknown business type", body = crate::error::ErrorBody),
    ),
    tag = "sessions"
)]
async fn set_business_type(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<BusinessTypeRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::from_uuid(id);
    let req = extract_json(body)?;
    let business_type = req
        .business_type
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<BusinessType>)
        .transpose()?;
    state.with_session(&id, |s| s.set_business_type(business_type))??;
    respond(&state, id)
}

/// PUT /v1/sessions/{id}/terms
#[utoipa::path(
    put,
    path = "/v1/sessions/{id}/terms",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = TermsRequest,
    responses((status = 200, description = "Terms flag set", body = SessionResponse)),
    tag = "sessions"
)]
async fn set_terms(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<TermsRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::from_uuid(id);
    let req = extract_json(body)?;
    state.with_session(&id, |s| s.set_terms_accepted(req.accepted))??;
    respond(&state, id)
}

/// POST /v1/sessions/{id}/product-types/toggle
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/product-types/toggle",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = ProductTypeRequest,
    responses(
        (status = 200, description = "Product type toggled", body = SessionResponse),
        (status = 422, description = "Malformed product type", body = crate::error::ErrorBody),
    ),
    tag = "sessions"
)]
async fn toggle_product_type(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<ProductTypeRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::from_uuid(id);
    let product_type = ProductType::new(extract_json(body)?.product_type)?;
    let selected = state.with_session(&id, |s| s.toggle_product_type(product_type.clone()))??;
    tracing::debug!(session_id = %id, product_type = %product_type, selected, "product type toggled");
    respond(&state, id)
}

/// PUT /v1/sessions/{id}/licenses: number and/or document for one
/// selected product type.
#[utoipa::path(
    put,
    path = "/v1/sessions/{id}/licenses",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = LicenseRequest,
    responses(
        (status = 200, description = "License updated", body = SessionResponse),
        (status = 422, description = "Product type not selected", body = crate::error::ErrorBody),
    ),
    tag = "sessions"
)]
async fn set_license(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<LicenseRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::from_uuid(id);
    let req = extract_validated_json(body)?;
    let product_type = ProductType::new(req.product_type)?;
    let file = req.file.map(to_file).transpose()?;
    let remove_file = req.remove_file;
    let number = req.number;

    state.with_session(&id, |s| {
        if let Some(number) = number {
            s.set_license_number(&product_type, number)?;
        }
        if file.is_some() || remove_file {
            s.set_license_file(&product_type, file)?;
        }
        Ok::<_, AppError>(())
    })??;
    respond(&state, id)
}

/// PUT /v1/sessions/{id}/files/{slot}: attach an uploaded document.
#[utoipa::path(
    put,
    path = "/v1/sessions/{id}/files/{slot}",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("slot" = String, Path, description = "gst_certificate or cancelled_cheque"),
    ),
    request_body = FileRequest,
    responses(
        (status = 200, description = "File attached", body = SessionResponse),
        (status = 422, description = "Unknown slot or empty file id", body = crate::error::ErrorBody),
    ),
    tag = "sessions"
)]
async fn set_file(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, slot)): Path<(Uuid, String)>,
    body: Result<Json<FileRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::from_uuid(id);
    let slot: FileSlot = slot.parse()?;
    let file = to_file(extract_json(body)?)?;
    state.with_session(&id, |s| s.set_file(slot, Some(file)))??;
    respond(&state, id)
}

/// DELETE /v1/sessions/{id}/files/{slot}
#[utoipa::path(
    delete,
    path = "/v1/sessions/{id}/files/{slot}",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("slot" = String, Path, description = "gst_certificate or cancelled_cheque"),
    ),
    responses((status = 200, description = "File cleared", body = SessionResponse)),
    tag = "sessions"
)]
async fn clear_file(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, slot)): Path<(Uuid, String)>,
) -> Result<Json<SessionResponse>, AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::from_uuid(id);
    let slot: FileSlot = slot.parse()?;
    state.with_session(&id, |s| s.set_file(slot, None))??;
    respond(&state, id)
}

/// PUT /v1/sessions/{id}/ifsc: set the IFSC and, once it is well formed,
/// resolve it. Lookup failures are reported in `view.bank_lookup`.
#[utoipa::path(
    put,
    path = "/v1/sessions/{id}/ifsc",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = IfscRequest,
    responses(
        (status = 200, description = "IFSC stored; lookup result in bank_lookup", body = SessionResponse),
        (status = 409, description = "Record is locked", body = crate::error::ErrorBody),
    ),
    tag = "sessions"
)]
async fn set_ifsc(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<IfscRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::from_uuid(id);
    let req = extract_json(body)?;
    let ticket = state.with_session(&id, |s| s.set_text(Field::Ifsc, req.ifsc))??;
    finish_lookup(&state, id, ticket).await
}

/// POST /v1/sessions/{id}/continue: validate the current step and move on.
/// On the last step this submits the application.
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/continue",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Advanced, or submission attempted", body = SessionResponse),
        (status = 422, description = "Step validation failed", body = crate::error::ErrorBody),
    ),
    tag = "sessions"
)]
async fn continue_step(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::from_uuid(id);

    let dispatched = state.with_session(
        &id,
        |s| -> Result<Option<(SubmissionTicket, SellerApplication)>, ValidationFailure> {
            match s.continue_step() {
                Ok(Advance::Moved { from, to }) => {
                    tracing::info!(session_id = %id, from = %from, to = %to, "advanced");
                    Ok(None)
                }
                Ok(Advance::SubmissionDispatched(ticket)) => {
                    Ok(Some((ticket, s.record().to_application())))
                }
                Ok(Advance::AlreadySubmitted | Advance::SubmissionInFlight) => Ok(None),
                Err(failure) => {
                    tracing::info!(
                        session_id = %id,
                        step = %failure.step,
                        field = ?failure.field,
                        "step validation failed"
                    );
                    Err(failure)
                }
            }
        },
    )??;

    if let Some((ticket, application)) = dispatched {
        run_submission(&state, &id, ticket, application).await?;
    }
    respond(&state, id)
}

/// POST /v1/sessions/{id}/back
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/back",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses((status = 200, description = "Moved back, or unchanged on the first step", body = SessionResponse)),
    tag = "sessions"
)]
async fn back(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::from_uuid(id);
    state.with_session(&id, |s| s.back())?;
    respond(&state, id)
}

/// POST /v1/sessions/{id}/jump: go to an already reached step.
/// Unreachable targets leave the session unchanged.
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/jump",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = JumpRequest,
    responses(
        (status = 200, description = "Jumped, or unchanged", body = SessionResponse),
        (status = 422, description = "Step out of range", body = crate::error::ErrorBody),
    ),
    tag = "sessions"
)]
async fn jump(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<JumpRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::from_uuid(id);
    let step = WizardStep::try_from(extract_json(body)?.step)?;
    let moved = state.with_session(&id, |s| s.jump_to(step))?;
    if !moved {
        tracing::debug!(session_id = %id, step = %step, "jump ignored");
    }
    respond(&state, id)
}

/// POST /v1/sessions/{id}/ui/menu: toggle a dropdown.
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/ui/menu",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = MenuRequest,
    responses((status = 200, description = "Menu toggled", body = SessionResponse)),
    tag = "sessions"
)]
async fn toggle_menu(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<MenuRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    require_role(&caller, Role::Seller)?;
    let id = SessionId::from_uuid(id);
    let menu = extract_json(body)?.menu;
    state.with_session(&id, |s| s.toggle_menu(menu))?;
    respond(&state, id)
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
    use onboard_core::{Channel, Ifsc, VerifyOutcome};
    use onboard_state::testing::{sbi_details, EMAIL, IFSC};
    use tower::ServiceExt;

    use crate::auth::AuthConfig;
    use crate::state::{AppConfig, Gateways};

    fn test_app() -> Router {
        let ifsc = Ifsc::new(IFSC).unwrap();
        let gateways = Gateways::mock(
            Arc::new(MockOtpGateway::new()),
            Arc::new(MockBankDirectory::new().with_entry(ifsc, sbi_details())),
            Arc::new(MockSellerService::new()),
        );
        router()
            .layer(axum::middleware::from_fn(crate::auth::auth_middleware))
            .layer(Extension(AuthConfig { token: None }))
            .with_state(AppState::new(AppConfig::default(), Some(gateways)))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let body = match body {
            Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn new_session_starts_on_step_one() {
        let app = test_app();
        let id = create(&app).await;
        let (status, body) = send(&app, "GET", &format!("/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["wizard"]["current"], 1);
    }

    #[tokio::test]
    async fn deleted_session_is_gone() {
        let app = test_app();
        let id = create(&app).await;
        let (status, body) = send(&app, "DELETE", &format!("/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, serde_json::Value::Null);

        let (status, _) = send(&app, "GET", &format!("/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", &format!("/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn refused_field_keeps_earlier_lookup() {
        let mut session = OnboardingSession::new();
        session.set_text(Field::CoordinatorEmail, EMAIL).unwrap();
        let sent = session.otp_send(Channel::Email).unwrap();
        session.complete_otp_send(&sent, Ok(()));
        let verify = session
            .otp_paste(Channel::Email, "123456")
            .unwrap()
            .expect("six digits dispatch a verify");
        session.complete_otp_verify(&verify, Ok(VerifyOutcome::Verified));

        let (ticket, applied) = apply_text_fields(
            &mut session,
            vec![
                (Field::Ifsc, IFSC.to_string()),
                (Field::CoordinatorEmail, "someone@else.in".to_string()),
            ],
        );
        assert_eq!(applied, Err(SessionError::ChannelLocked(Channel::Email)));
        assert_eq!(ticket.expect("IFSC was written first").ifsc().as_str(), IFSC);
        assert!(session.bank().is_pending());
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let app = test_app();
        let (status, body) = send(&app, "GET", &format!("/v1/sessions/{}", Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unknown_field_rejects_whole_batch() {
        let app = test_app();
        let id = create(&app).await;
        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/v1/sessions/{id}/fields"),
            Some(serde_json::json!({ "company_name": "Acme", "nonsense": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (_, body) = send(&app, "GET", &format!("/v1/sessions/{id}"), None).await;
        assert_eq!(body["view"]["record"]["company"]["company_name"], "");
    }

    #[tokio::test]
    async fn continue_on_empty_step_reports_field() {
        let app = test_app();
        let id = create(&app).await;
        let (status, body) = send(&app, "POST", &format!("/v1/sessions/{id}/continue"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"]["step"], 1);
        assert!(body["error"]["details"]["field"].is_string());
    }

    #[tokio::test]
    async fn ifsc_put_resolves_bank() {
        let app = test_app();
        let id = create(&app).await;
        let (status, body) = send(
            &app,
            "PUT",
            &format!("/v1/sessions/{id}/ifsc"),
            Some(serde_json::json!({ "ifsc": IFSC })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["bank_lookup"]["status"], "resolved");
        assert_eq!(body["view"]["record"]["bank"]["bank_name"], "State Bank of India");
    }

    #[tokio::test]
    async fn unknown_file_slot_is_422() {
        let app = test_app();
        let id = create(&app).await;
        let (status, _) = send(
            &app,
            "PUT",
            &format!("/v1/sessions/{id}/files/passport"),
            Some(serde_json::json!({ "id": "f-1", "name": "p.pdf" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn license_for_unselected_type_is_422() {
        let app = test_app();
        let id = create(&app).await;
        let (status, _) = send(
            &app,
            "PUT",
            &format!("/v1/sessions/{id}/licenses"),
            Some(serde_json::json!({ "product_type": "Drugs", "number": "DL-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn jump_out_of_range_is_422_and_unreached_is_noop() {
        let app = test_app();
        let id = create(&app).await;
        let (status, _) = send(
            &app,
            "POST",
            &format!("/v1/sessions/{id}/jump"),
            Some(serde_json::json!({ "step": 9 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/v1/sessions/{id}/jump"),
            Some(serde_json::json!({ "step": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["wizard"]["current"], 1);
    }

    #[tokio::test]
    async fn menus_are_exclusive() {
        let app = test_app();
        let id = create(&app).await;
        let uri = format!("/v1/sessions/{id}/ui/menu");
        send(&app, "POST", &uri, Some(serde_json::json!({ "menu": "business_type" }))).await;
        let (_, body) = send(&app, "POST", &uri, Some(serde_json::json!({ "menu": "product_types" }))).await;
        assert_eq!(body["view"]["ui"]["open_menu"], "product_types");
    }
}
