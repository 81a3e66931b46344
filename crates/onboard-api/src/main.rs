//! # onboard-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for seller onboarding.
//! Binds to `PORT` (default 8080).

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use onboard_api::middleware::metrics::install_recorder;
use onboard_api::state::{AppConfig, AppState, Gateways};
use onboard_client::{OnboardApiConfig, OnboardClient};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env();
    if config.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN not set; authentication is disabled");
    }

    let gateways = match OnboardApiConfig::from_env() {
        Ok(client_config) => {
            let client = OnboardClient::new(client_config)
                .context("failed to build onboarding collaborator client")?;
            tracing::info!("onboarding collaborators configured");
            Some(Gateways::from_client(&client))
        }
        Err(e) => {
            tracing::warn!(
                "collaborator client not configured: {e}. OTP, lookup, review and catalog calls will fail with 503."
            );
            None
        }
    };

    let metrics = install_recorder().context("failed to install Prometheus recorder")?;
    let port = config.port;
    let idle_timeout = config.session_idle_timeout;
    let state = AppState::new(config, gateways).with_metrics(metrics);
    let _sweeper = state.spawn_idle_sweeper();
    tracing::info!(idle_timeout_secs = idle_timeout.as_secs(), "idle session sweeper started");
    let app = onboard_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "onboarding API listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
