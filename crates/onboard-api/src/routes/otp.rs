//! # OTP Verification API
//!
//! One modal per contact channel (`email`, `mobile`). Sending, resending
//! and the automatic verify on the sixth digit call the OTP collaborator;
//! their outcome lands in the channel's view, not in the HTTP status.
//!
//! ## Endpoints
//!
//! `POST /v1/sessions/{id}/otp/{channel}/` followed by `open`, `close`,
//! `send`, `input`, `paste`, `backspace` or `resend`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use onboard_core::{Channel, SessionId};
use onboard_state::OtpTicket;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::orchestration::run_otp;
use crate::routes::sessions::{respond, SessionResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DigitRequest {
    /// A single character. Anything but `0`-`9` is refused.
    pub digit: String,
}

impl Validate for DigitRequest {
    fn validate(&self) -> Result<(), String> {
        if self.digit.chars().count() == 1 {
            Ok(())
        } else {
            Err("digit must be exactly one character".into())
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasteRequest {
    pub text: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/sessions/{id}/otp/{channel}/open", post(open))
        .route("/v1/sessions/{id}/otp/{channel}/close", post(close))
        .route("/v1/sessions/{id}/otp/{channel}/send", post(send))
        .route("/v1/sessions/{id}/otp/{channel}/input", post(input))
        .route("/v1/sessions/{id}/otp/{channel}/paste", post(paste))
        .route("/v1/sessions/{id}/otp/{channel}/backspace", post(backspace))
        .route("/v1/sessions/{id}/otp/{channel}/resend", post(resend))
}

fn parse_path(caller: &CallerIdentity, id: Uuid) -> Result<SessionId, AppError> {
    require_role(caller, Role::Seller)?;
    Ok(SessionId::from_uuid(id))
}

async fn dispatch(
    state: &AppState,
    id: SessionId,
    ticket: Option<OtpTicket>,
) -> Result<Json<SessionResponse>, AppError> {
    if let Some(ticket) = ticket {
        run_otp(state, &id, ticket).await?;
    }
    respond(state, id)
}

/// POST /v1/sessions/{id}/otp/{channel}/open
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/otp/{channel}/open",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("channel" = String, Path, description = "email or mobile"),
    ),
    responses(
        (status = 200, description = "Modal open", body = SessionResponse),
        (status = 409, description = "Channel already verified", body = crate::error::ErrorBody),
    ),
    tag = "otp"
)]
async fn open(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, channel)): Path<(Uuid, Channel)>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = parse_path(&caller, id)?;
    state.with_session(&id, |s| s.otp_open(channel))??;
    respond(&state, id)
}

/// POST /v1/sessions/{id}/otp/{channel}/close: abandons any outstanding
/// request for the channel.
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/otp/{channel}/close",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("channel" = String, Path, description = "email or mobile"),
    ),
    responses((status = 200, description = "Modal closed", body = SessionResponse)),
    tag = "otp"
)]
async fn close(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, channel)): Path<(Uuid, Channel)>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = parse_path(&caller, id)?;
    state.with_session(&id, |s| s.otp_close(channel))?;
    respond(&state, id)
}

/// POST /v1/sessions/{id}/otp/{channel}/send: open the modal and send the
/// first code to the address in the record.
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/otp/{channel}/send",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("channel" = String, Path, description = "email or mobile"),
    ),
    responses(
        (status = 200, description = "Send attempted; outcome in the channel view", body = SessionResponse),
        (status = 409, description = "Already sent, verified or in flight", body = crate::error::ErrorBody),
        (status = 422, description = "Address is not valid", body = crate::error::ErrorBody),
        (status = 503, description = "OTP service not configured", body = crate::error::ErrorBody),
    ),
    tag = "otp"
)]
async fn send(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, channel)): Path<(Uuid, Channel)>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = parse_path(&caller, id)?;
    state.gateways()?;
    let ticket = state.with_session(&id, |s| s.otp_send(channel))??;
    dispatch(&state, id, Some(ticket)).await
}

/// POST /v1/sessions/{id}/otp/{channel}/input: one digit. The sixth
/// digit submits the code for verification.
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/otp/{channel}/input",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("channel" = String, Path, description = "email or mobile"),
    ),
    request_body = DigitRequest,
    responses(
        (status = 200, description = "Digit accepted", body = SessionResponse),
        (status = 409, description = "Not accepting input", body = crate::error::ErrorBody),
        (status = 422, description = "Not a digit", body = crate::error::ErrorBody),
    ),
    tag = "otp"
)]
async fn input(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, channel)): Path<(Uuid, Channel)>,
    body: Result<Json<DigitRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = parse_path(&caller, id)?;
    let req = extract_validated_json(body)?;
    let digit = req.digit.chars().next().unwrap_or_default();
    let ticket = state.with_session(&id, |s| s.otp_input(channel, digit))??;
    dispatch(&state, id, ticket).await
}

/// POST /v1/sessions/{id}/otp/{channel}/paste: the digits of `text` fill
/// the boxes; a full code is verified.
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/otp/{channel}/paste",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("channel" = String, Path, description = "email or mobile"),
    ),
    request_body = PasteRequest,
    responses(
        (status = 200, description = "Digits accepted", body = SessionResponse),
        (status = 422, description = "No digits in the text", body = crate::error::ErrorBody),
    ),
    tag = "otp"
)]
async fn paste(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, channel)): Path<(Uuid, Channel)>,
    body: Result<Json<PasteRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = parse_path(&caller, id)?;
    let text = extract_json(body)?.text;
    let ticket = state.with_session(&id, |s| s.otp_paste(channel, &text))??;
    dispatch(&state, id, ticket).await
}

/// POST /v1/sessions/{id}/otp/{channel}/backspace
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/otp/{channel}/backspace",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("channel" = String, Path, description = "email or mobile"),
    ),
    responses((status = 200, description = "Last digit removed", body = SessionResponse)),
    tag = "otp"
)]
async fn backspace(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, channel)): Path<(Uuid, Channel)>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = parse_path(&caller, id)?;
    state.with_session(&id, |s| s.otp_backspace(channel))??;
    respond(&state, id)
}

/// POST /v1/sessions/{id}/otp/{channel}/resend: ignored while the
/// cooldown runs.
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/otp/{channel}/resend",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("channel" = String, Path, description = "email or mobile"),
    ),
    responses(
        (status = 200, description = "Resent, or unchanged during cooldown", body = SessionResponse),
        (status = 409, description = "Nothing sent yet", body = crate::error::ErrorBody),
    ),
    tag = "otp"
)]
async fn resend(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, channel)): Path<(Uuid, Channel)>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = parse_path(&caller, id)?;
    let ticket = state.with_session(&id, |s| s.otp_resend(channel))??;
    if ticket.is_none() {
        tracing::debug!(session_id = %id, %channel, "resend ignored during cooldown");
    }
    dispatch(&state, id, ticket).await
}
