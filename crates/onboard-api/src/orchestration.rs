//! # Collaborator Orchestration
//!
//! Every collaborator-backed action runs in three phases:
//!
//! 1. **Dispatch**: under the session (or checklist) lock, the state
//!    machine hands out a ticket and marks the request in flight.
//! 2. **Call**: with the lock released, the collaborator is awaited,
//!    bounded by `REQUEST_TIMEOUT_SECS`.
//! 3. **Complete**: under the lock again, the answer is applied through
//!    the ticket. A ticket that went stale in the meantime changes
//!    nothing.
//!
//! Phases 2 and 3 run on their own task. If the client goes away, axum
//! drops the handler future but the task still completes the ticket, so
//! nothing is left marked in flight.
//!
//! Collaborator failures never escape as HTTP errors from here. They are
//! turned into a [`ServiceFailure`] that the state machine absorbs, which
//! puts the triggering control back into its pre-request state with a
//! message.

use std::future::Future;
use std::time::Instant;

use onboard_client::GatewayError;
use onboard_core::{ApplicationId, SellerApplication, SessionId};
use onboard_state::{
    BankTicket, Completion, OtpRequest, OtpTicket, ReviewOutcome, ReviewTicket, ServiceFailure,
    SubmissionOutcome, SubmissionTicket,
};

use crate::error::AppError;
use crate::state::{AppState, Gateways};

pub const TIMEOUT_MESSAGE: &str = "The request timed out. Please try again.";

pub const UNAVAILABLE_MESSAGE: &str = "The service is unavailable. Please try again.";

/// For routes whose whole purpose is the collaborator call: there is no
/// state to fail in place, so the failure becomes the response.
pub fn collaborator_error(failure: ServiceFailure) -> AppError {
    let message = failure.message_or(UNAVAILABLE_MESSAGE);
    if message == TIMEOUT_MESSAGE {
        AppError::GatewayTimeout(message)
    } else {
        AppError::ServiceUnavailable(message)
    }
}

fn failure_from(err: &GatewayError) -> ServiceFailure {
    match err.user_message() {
        Some(message) => ServiceFailure::new(message),
        None => ServiceFailure::silent(),
    }
}

/// Await one collaborator call under the configured timeout.
pub async fn call_collaborator<T, F, Fut>(
    state: &AppState,
    operation: &'static str,
    call: F,
) -> Result<T, ServiceFailure>
where
    F: FnOnce(Gateways) -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let Some(gateways) = state.gateways.clone() else {
        tracing::warn!(operation, "no collaborators configured");
        metrics::counter!("onboard_collaborator_failures_total", "operation" => operation, "reason" => "unconfigured")
            .increment(1);
        return Err(ServiceFailure::new(UNAVAILABLE_MESSAGE));
    };

    let started = Instant::now();
    let outcome = match tokio::time::timeout(state.config.request_timeout, call(gateways)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            tracing::warn!(operation, error = %err, "collaborator call failed");
            metrics::counter!("onboard_collaborator_failures_total", "operation" => operation, "reason" => "error")
                .increment(1);
            Err(failure_from(&err))
        }
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_secs = state.config.request_timeout.as_secs(),
                "collaborator call timed out"
            );
            metrics::counter!("onboard_collaborator_failures_total", "operation" => operation, "reason" => "timeout")
                .increment(1);
            Err(ServiceFailure::new(TIMEOUT_MESSAGE))
        }
    };
    metrics::histogram!("onboard_collaborator_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
    outcome
}

/// Run `work` on its own task and wait for it. Dropping the returned
/// future detaches the task instead of cancelling it.
async fn detached<T, Fut>(operation: &'static str, work: Fut) -> Result<T, AppError>
where
    Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work).await.map_err(|err| {
        tracing::error!(operation, error = %err, "collaborator task did not finish");
        AppError::Internal(format!("{operation} task failed: {err}"))
    })?
}

fn note_stale(operation: &'static str, subject: &dyn std::fmt::Display) {
    tracing::warn!(operation, subject = %subject, "dropped stale collaborator response");
    metrics::counter!("onboard_stale_responses_total", "operation" => operation).increment(1);
}

/// Resolve an IFSC and fill the bank fields.
pub async fn run_bank_lookup(
    state: &AppState,
    id: &SessionId,
    ticket: BankTicket,
) -> Result<Completion, AppError> {
    let ifsc = ticket.ifsc().clone();
    tracing::info!(session_id = %id, ifsc = %ifsc, "looking up IFSC");
    let (state, id) = (state.clone(), *id);
    detached("ifsc_lookup", async move {
        let result = call_collaborator(&state, "ifsc_lookup", move |g| async move {
            g.bank.lookup(&ifsc).await
        })
        .await;

        let completion = state.with_session(&id, |s| s.complete_bank_lookup(&ticket, result))?;
        if completion.is_stale() {
            note_stale("ifsc_lookup", &id);
        }
        Ok(completion)
    })
    .await
}

/// Send, resend or verify, according to the ticket.
pub async fn run_otp(
    state: &AppState,
    id: &SessionId,
    ticket: OtpTicket,
) -> Result<Completion, AppError> {
    let channel = ticket.channel();
    let destination = ticket.destination().to_string();
    tracing::info!(session_id = %id, %channel, kind = ?ticket.kind(), "dispatching OTP request");

    let (state, id) = (state.clone(), *id);
    detached("otp", async move {
        let completion = match ticket.kind() {
            OtpRequest::Send | OtpRequest::Resend => {
                let result = call_collaborator(&state, "otp_send", move |g| async move {
                    g.otp.send_otp(channel, &destination).await
                })
                .await;
                state.with_session(&id, |s| s.complete_otp_send(&ticket, result))?
            }
            OtpRequest::Verify => {
                let code = ticket.code().unwrap_or_default().to_string();
                let result = call_collaborator(&state, "otp_verify", move |g| async move {
                    g.otp.verify_otp(channel, &destination, &code).await
                })
                .await;
                state.with_session(&id, |s| s.complete_otp_verify(&ticket, result))?
            }
        };
        if completion.is_stale() {
            note_stale("otp", &id);
        }
        Ok(completion)
    })
    .await
}

/// Hand the application to the submission collaborator.
pub async fn run_submission(
    state: &AppState,
    id: &SessionId,
    ticket: SubmissionTicket,
    application: SellerApplication,
) -> Result<SubmissionOutcome, AppError> {
    tracing::info!(session_id = %id, company = %application.company.company_name, "submitting application");
    let (state, id) = (state.clone(), *id);
    detached("submit_application", async move {
        let result = call_collaborator(&state, "submit_application", move |g| async move {
            g.submission.submit(&application).await
        })
        .await;

        let outcome = state.with_session(&id, |s| s.complete_submission(ticket, result))?;
        match &outcome {
            SubmissionOutcome::Submitted(receipt) => {
                tracing::info!(session_id = %id, application_id = %receipt.application_id, "application submitted");
                metrics::counter!("onboard_submissions_total", "result" => "submitted").increment(1);
            }
            SubmissionOutcome::Failed(message) => {
                tracing::warn!(session_id = %id, %message, "submission failed");
                metrics::counter!("onboard_submissions_total", "result" => "failed").increment(1);
            }
            SubmissionOutcome::Stale => note_stale("submit_application", &id),
        }
        Ok(outcome)
    })
    .await
}

/// Record a reviewer's decision with the seller service.
pub async fn run_review_decision(
    state: &AppState,
    application_id: &ApplicationId,
    ticket: ReviewTicket,
) -> Result<ReviewOutcome, AppError> {
    let decision = ticket.decision();
    let comment = ticket.comment().to_string();
    let state = state.clone();
    let application_id = application_id.clone();
    detached("review_decision", async move {
        let target = application_id.clone();
        let result = call_collaborator(&state, "review_decision", move |g| async move {
            g.review
                .submit_review_decision(&target, decision, &comment)
                .await
        })
        .await;

        let outcome = state
            .reviews
            .update(&application_id, |checklist| checklist.complete(&ticket, result))
            .ok_or_else(|| AppError::NotFound(format!("review {application_id} not found")))?;
        match &outcome {
            ReviewOutcome::Recorded(decision) => {
                tracing::info!(application_id = %application_id, %decision, "review decision recorded");
            }
            ReviewOutcome::Failed(message) => {
                tracing::warn!(application_id = %application_id, %message, "review decision failed");
            }
            ReviewOutcome::Stale => note_stale("review_decision", &application_id),
        }
        Ok(outcome)
    })
    .await
}
