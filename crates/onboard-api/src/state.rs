//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! - **Sessions**: one [`OnboardingSession`] per seller wizard, held in
//!   memory and keyed by [`SessionId`].
//! - **Reviews**: one [`ReviewChecklist`] per application a reviewer has
//!   opened.
//! - **Gateways**: the external collaborators. `None` when the client
//!   could not be configured; collaborator-backed routes then answer 503.
//!
//! Sessions and reviews untouched for `SESSION_IDLE_TIMEOUT_SECS` are
//! dropped by [`AppState::spawn_idle_sweeper`].

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use zeroize::Zeroizing;

use onboard_client::mock::{MockBankDirectory, MockOtpGateway, MockSellerService};
use onboard_client::{
    BankDirectory, CatalogGateway, OnboardClient, OtpGateway, ReviewGateway, SubmissionGateway,
};
use onboard_core::{ApplicationId, SessionId};
use onboard_state::{OnboardingSession, ReviewChecklist};

use crate::error::AppError;

// -- Generic In-Memory Store --------------------------------------------------

#[derive(Debug)]
struct Slot<T> {
    value: T,
    touched_at: Instant,
}

impl<T> Slot<T> {
    fn fresh(value: T) -> Self {
        Self {
            value,
            touched_at: Instant::now(),
        }
    }
}

/// Thread-safe, cloneable in-memory key-value store.
///
/// Every write records when the key was last touched, which is what
/// [`Store::evict_idle`] goes by. Reads do not count.
///
/// The lock is `parking_lot` and is never held across an `.await`.
#[derive(Debug)]
pub struct Store<K, T> {
    data: Arc<RwLock<HashMap<K, Slot<T>>>>,
}

impl<K, T> Clone for Store<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Eq + Hash, T: Clone> Store<K, T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: K, value: T) -> Option<T> {
        self.data
            .write()
            .insert(id, Slot::fresh(value))
            .map(|slot| slot.value)
    }

    pub fn get(&self, id: &K) -> Option<T> {
        self.data.read().get(id).map(|slot| slot.value.clone())
    }

    /// Insert unless the key is taken. Returns whatever is stored afterwards.
    pub fn get_or_insert(&self, id: K, value: T) -> T {
        let mut data = self.data.write();
        let slot = data.entry(id).or_insert_with(|| Slot::fresh(value));
        slot.touched_at = Instant::now();
        slot.value.clone()
    }

    /// Run `f` against the record under the write lock.
    pub fn update<R>(&self, id: &K, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.data.write().get_mut(id).map(|slot| {
            slot.touched_at = Instant::now();
            f(&mut slot.value)
        })
    }

    pub fn remove(&self, id: &K) -> Option<T> {
        self.data.write().remove(id).map(|slot| slot.value)
    }

    /// Drop every record last touched `idle` or longer before `now`.
    /// Returns how many were dropped.
    pub fn evict_idle(&self, now: Instant, idle: Duration) -> usize {
        let mut data = self.data.write();
        let before = data.len();
        data.retain(|_, slot| now.saturating_duration_since(slot.touched_at) < idle);
        before - data.len()
    }

    pub fn contains(&self, id: &K) -> bool {
        self.data.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, T: Clone> Default for Store<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Sessions -----------------------------------------------------------------

/// A session plus the instant its OTP clock was last brought up to date.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    session: OnboardingSession,
    synced_at: Instant,
}

impl SessionEntry {
    pub fn new() -> Self {
        Self {
            session: OnboardingSession::new(),
            synced_at: Instant::now(),
        }
    }

    /// Apply one cooldown tick per whole second elapsed since the last sync.
    fn sync_clock(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.synced_at).as_secs();
        if elapsed == 0 {
            return;
        }
        self.session
            .advance_clock(u32::try_from(elapsed).unwrap_or(u32::MAX));
        self.synced_at += Duration::from_secs(elapsed);
    }
}

impl Default for SessionEntry {
    fn default() -> Self {
        Self::new()
    }
}

// -- Configuration ------------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared bearer secret. If `None`, authentication is disabled.
    pub auth_token: Option<Zeroizing<String>>,
    /// Upper bound on every collaborator call.
    pub request_timeout: Duration,
    /// Sessions and reviews untouched this long are dropped.
    pub session_idle_timeout: Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout", &self.request_timeout)
            .field("session_idle_timeout", &self.session_idle_timeout)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            request_timeout: Duration::from_secs(15),
            session_idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `AUTH_TOKEN`, `REQUEST_TIMEOUT_SECS` and
    /// `SESSION_IDLE_TIMEOUT_SECS`. Unset or unparsable values fall back to
    /// the defaults; a blank token disables auth.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let auth_token = std::env::var("AUTH_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Zeroizing::new);
        Self {
            port,
            auth_token,
            request_timeout: env_secs("REQUEST_TIMEOUT_SECS").unwrap_or(defaults.request_timeout),
            session_idle_timeout: env_secs("SESSION_IDLE_TIMEOUT_SECS")
                .unwrap_or(defaults.session_idle_timeout),
        }
    }
}

/// A positive number of seconds from the environment.
fn env_secs(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

// -- Collaborators ------------------------------------------------------------

/// The external collaborators, behind their traits.
#[derive(Clone)]
pub struct Gateways {
    pub otp: Arc<dyn OtpGateway>,
    pub bank: Arc<dyn BankDirectory>,
    pub submission: Arc<dyn SubmissionGateway>,
    pub review: Arc<dyn ReviewGateway>,
    pub catalog: Arc<dyn CatalogGateway>,
}

impl std::fmt::Debug for Gateways {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateways")
            .field("otp", &self.otp.gateway_name())
            .field("bank", &self.bank.gateway_name())
            .finish_non_exhaustive()
    }
}

impl Gateways {
    /// HTTP-backed collaborators.
    pub fn from_client(client: &OnboardClient) -> Self {
        let sellers = Arc::new(client.sellers().clone());
        Self {
            otp: Arc::new(client.otp().clone()),
            bank: Arc::new(client.bank().clone()),
            submission: sellers.clone(),
            review: sellers.clone(),
            catalog: sellers,
        }
    }

    /// In-memory collaborators. The caller keeps its `Arc`s to inspect
    /// issued codes and recorded decisions.
    pub fn mock(
        otp: Arc<MockOtpGateway>,
        bank: Arc<MockBankDirectory>,
        sellers: Arc<MockSellerService>,
    ) -> Self {
        Self {
            otp,
            bank,
            submission: sellers.clone(),
            review: sellers.clone(),
            catalog: sellers,
        }
    }
}

// -- AppState -----------------------------------------------------------------

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub sessions: Store<SessionId, SessionEntry>,
    pub reviews: Store<ApplicationId, ReviewChecklist>,
    pub gateways: Option<Gateways>,
    pub config: AppConfig,
    /// Installed by the binary. `/metrics` answers 503 without one.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: AppConfig, gateways: Option<Gateways>) -> Self {
        Self {
            sessions: Store::new(),
            reviews: Store::new(),
            gateways,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// The collaborators, or 503 when none are configured.
    pub fn gateways(&self) -> Result<&Gateways, AppError> {
        self.gateways.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("onboarding collaborators are not configured".into())
        })
    }

    /// Run `f` on the session after bringing its OTP clock up to date.
    pub fn with_session<R>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut OnboardingSession) -> R,
    ) -> Result<R, AppError> {
        self.sessions
            .update(id, |entry| {
                entry.sync_clock(Instant::now());
                f(&mut entry.session)
            })
            .ok_or_else(|| AppError::NotFound(format!("session {id} not found")))
    }

    /// Drop sessions and reviews idle for `session_idle_timeout` as of
    /// `now`. Returns `(sessions, reviews)` dropped.
    pub fn evict_idle(&self, now: Instant) -> (usize, usize) {
        let idle = self.config.session_idle_timeout;
        let sessions = self.sessions.evict_idle(now, idle);
        let reviews = self.reviews.evict_idle(now, idle);
        if sessions + reviews > 0 {
            tracing::info!(sessions, reviews, "evicted idle state");
            metrics::counter!("onboard_evicted_total", "kind" => "session").increment(sessions as u64);
            metrics::counter!("onboard_evicted_total", "kind" => "review").increment(reviews as u64);
        }
        metrics::gauge!("onboard_sessions_active").set(self.sessions.len() as f64);
        (sessions, reviews)
    }

    /// Evict idle state in the background, checking four times per idle
    /// timeout but at least once a minute.
    pub fn spawn_idle_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        let every = (self.config.session_idle_timeout / 4)
            .clamp(Duration::from_secs(1), Duration::from_secs(60));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                state.evict_idle(Instant::now());
            }
        })
    }
}
