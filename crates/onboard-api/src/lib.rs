//! # onboard-api: Seller Onboarding HTTP Service
//!
//! Hosts onboarding sessions server-side. The wizard, OTP and bank-lookup
//! state machines from `onboard-state` live in memory per session; this
//! crate wires them to HTTP and awaits the external collaborators from
//! `onboard-client` in between.
//!
//! ## API Surface
//!
//! | Prefix                         | Module                 | Role     |
//! |--------------------------------|------------------------|----------|
//! | `/v1/sessions/*`               | [`routes::sessions`]   | seller   |
//! | `/v1/sessions/*/otp/*`         | [`routes::otp`]        | seller   |
//! | `/v1/admin/sellers/*`          | [`routes::admin`]      | reviewer |
//! | `/v1/sellers/*/products`       | [`routes::catalog`]    | seller   |
//! | `/openapi.json`                | [`openapi`]            | any      |
//! | `/health/*`, `/metrics`        | this module            | none     |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod orchestration;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router.
///
/// Health checks and `/metrics` sit outside the auth middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    // Layers run outermost first:
    //   TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
    let api = Router::new()
        .merge(routes::sessions::router())
        .merge(routes::otp::router())
        .merge(routes::admin::router())
        .merge(routes::catalog::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(256 * 1024))
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(auth_config))
        .with_state(state.clone());

    let unauthenticated = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(prometheus_metrics))
        .with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// Liveness check.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check: the stores answer. Running without collaborators is
/// allowed; those routes answer 503 on their own.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.sessions.len();
    let _ = state.reviews.len();
    if state.gateways.is_none() {
        tracing::debug!("readiness: collaborators not configured");
    }
    (StatusCode::OK, "ready")
}

/// GET /metrics: Prometheus text exposition, or 503 when no recorder was
/// installed.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}
