use axum::{
    Router,
    http::{StatusCode, Uri, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{
    ExpiredDeletion, Expiry, MemoryStore, SessionManagerLayer, SessionStore,
    cookie::{Key, SameSite},
};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::{info, warn};

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::{Config, ServerConfig, SessionBackend};
use crate::forms::{CSRF_FIELD, CSRF_MESSAGE, FormSpec, ValidationResult};
use crate::state::SharedState;

mod assets;
mod auth;
mod error;
mod feedback;
mod health;
mod home;
mod observability;
pub mod pages;
pub mod session;
mod users;

pub use error::WebError;
pub use session::{AuthSession, Flash, FlashCategory, SESSION_COOKIE_NAME, SessionIdentity};

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn crate::services::AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn account_service(&self) -> &Arc<dyn crate::services::AccountService> {
        &self.shared.account_service
    }

    #[must_use]
    pub fn feedback_service(&self) -> &Arc<dyn crate::services::FeedbackService> {
        &self.shared.feedback_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let server = state.config().server.clone();
    let key = session_key(&server)?;

    let pages = create_page_router();

    let pages = match server.session_backend {
        SessionBackend::Memory => with_sessions(pages, MemoryStore::default(), &server, key),
        SessionBackend::Sqlite => {
            let sessions = sqlite_sessions(state.store()).await?;
            sessions.delete_expired().await?;
            with_sessions(pages, sessions, &server, key)
        }
    };

    Ok(Router::new()
        .merge(pages)
        .route("/static/{*path}", get(assets::serve_asset))
        .route("/health/live", get(health::health_live))
        .route("/health/ready", get(health::health_ready))
        .route("/metrics", get(observability::get_metrics))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http()))
}

fn create_page_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home::index))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/users/{username}", get(users::show_user))
        .route("/users/{username}/delete", post(users::delete_user))
        .route(
            "/users/{username}/feedback/add",
            get(feedback::add_feedback_form).post(feedback::add_feedback),
        )
        .route(
            "/feedback/{id}/update",
            get(feedback::edit_feedback_form).post(feedback::update_feedback),
        )
        .route("/feedback/{id}/delete", post(feedback::delete_feedback))
}

fn with_sessions<Store>(
    router: Router<Arc<AppState>>,
    store: Store,
    server: &ServerConfig,
    key: Key,
) -> Router<Arc<AppState>>
where
    Store: SessionStore + Clone,
{
    let layer = SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_http_only(true)
        .with_secure(server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_idle_minutes,
        )))
        .with_signed(key);

    router
        .layer(middleware::from_fn(observability::identity_middleware))
        .layer(layer)
}

/// The session table lives next to the app tables and is created on demand.
async fn sqlite_sessions(store: &crate::db::Store) -> anyhow::Result<SqliteStore> {
    let sessions = SqliteStore::new(store.conn.get_sqlite_connection_pool().clone());
    sessions.migrate().await?;
    Ok(sessions)
}

/// Deletes session rows whose inactivity deadline has passed.
///
/// Runs once when the router is built; long-lived servers schedule
/// `feedback sessions prune` externally.
pub async fn prune_expired_sessions(store: &crate::db::Store) -> anyhow::Result<()> {
    sqlite_sessions(store).await?.delete_expired().await?;
    Ok(())
}

fn session_key(server: &ServerConfig) -> anyhow::Result<Key> {
    if server.session_secret.is_empty() {
        warn!("No session secret configured; sessions will not survive a restart");
        return Ok(Key::generate());
    }

    Key::try_from(server.session_secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid session secret: {e}"))
}

async fn not_found(uri: Uri) -> WebError {
    info!(path = %uri.path(), "No route");
    WebError::NotFound(format!("{} does not exist", uri.path()))
}

/// 302 with a `Location` header.
pub(crate) fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Declarative validation plus the CSRF check, in one result.
pub(crate) async fn validate_submission(
    state: &AppState,
    session: &AuthSession,
    form: &FormSpec,
    input: &HashMap<String, String>,
) -> Result<ValidationResult, WebError> {
    let result = form.validate(input);

    if csrf_rejected(state, session, input).await? {
        return Ok(result.with_error(CSRF_FIELD, CSRF_MESSAGE));
    }

    Ok(result)
}

/// True when CSRF protection is on and the submitted token does not match.
pub(crate) async fn csrf_rejected(
    state: &AppState,
    session: &AuthSession,
    input: &HashMap<String, String>,
) -> Result<bool, WebError> {
    if !state.config().security.csrf_enabled {
        return Ok(false);
    }

    let valid = session
        .verify_csrf(input.get(CSRF_FIELD).map(String::as_str))
        .await?;
    if !valid {
        warn!("Rejected form submission with missing or invalid CSRF token");
    }
    Ok(!valid)
}
