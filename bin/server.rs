// Registration Form - Driver API Server
// One in-memory form per session; commands in, rendered view out

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use registration_form::{
    Driver, DriverCommand, FormConfig, LocationCatalog, RegistrationForm, RenderedView, Validator,
};

#[derive(Debug, Parser)]
#[command(name = "registration-server", version, about = "HTTP driver API for the registration form")]
struct Args {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the configured one
    #[arg(long)]
    bind: Option<String>,
}

// ============================================================================
// Session Store
// ============================================================================

struct Session {
    driver: Driver,
    last_used: u64,
}

/// Bounded set of open drivers. When full, the least recently used session
/// is dropped to make room.
struct SessionStore {
    sessions: HashMap<Uuid, Session>,
    capacity: usize,
    clock: u64,
}

impl SessionStore {
    fn new(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            capacity: capacity.max(1),
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Returns the id of the session evicted to make room, if any
    fn insert(&mut self, id: Uuid, driver: Driver) -> Option<Uuid> {
        let evicted = if self.sessions.len() >= self.capacity {
            self.sessions
                .iter()
                .min_by_key(|(_, session)| session.last_used)
                .map(|(id, _)| *id)
        } else {
            None
        };
        if let Some(old) = evicted {
            self.sessions.remove(&old);
        }

        let last_used = self.tick();
        self.sessions.insert(id, Session { driver, last_used });
        evicted
    }

    fn get_mut(&mut self, id: &Uuid) -> Option<&mut Driver> {
        let now = self.tick();
        self.sessions.get_mut(id).map(|session| {
            session.last_used = now;
            &mut session.driver
        })
    }

    fn remove(&mut self, id: &Uuid) -> Option<Driver> {
        self.sessions.remove(id).map(|session| session.driver)
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    catalog: Arc<LocationCatalog>,
    config: Arc<FormConfig>,
    sessions: Arc<Mutex<SessionStore>>,
}

impl AppState {
    fn new(catalog: LocationCatalog, config: FormConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            sessions: Arc::new(Mutex::new(SessionStore::new(config.max_sessions))),
            config: Arc::new(config),
        }
    }

    fn new_form(&self) -> RegistrationForm {
        RegistrationForm::new(
            (*self.catalog).clone(),
            Validator::with_disposable_domains(self.config.disposable_domains.clone()),
            self.config.dismiss_delay(),
        )
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

fn reply<T: Serialize>(status: StatusCode, body: ApiResponse<T>) -> Response {
    (status, Json(body)).into_response()
}

fn not_found(id: Uuid) -> Response {
    reply(
        StatusCode::NOT_FOUND,
        ApiResponse::<()>::failure(format!("Unknown session: {}", id)),
    )
}

fn poisoned() -> Response {
    reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        ApiResponse::<()>::failure("Session store is unavailable"),
    )
}

#[derive(Serialize)]
struct SessionResponse {
    id: Uuid,
    view: RenderedView,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/catalog - Country → state → city data
async fn get_catalog(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.catalog.entries().to_vec()))
}

/// POST /api/sessions - Start a pristine form
async fn create_session(State(state): State<AppState>) -> Response {
    let driver = Driver::new(state.new_form());
    let id = Uuid::new_v4();
    let view = driver.view();

    let Ok(mut sessions) = state.sessions.lock() else {
        return poisoned();
    };
    if let Some(evicted) = sessions.insert(id, driver) {
        warn!(%evicted, "session limit reached, dropped least recently used");
    }
    info!(%id, open = sessions.len(), "session created");

    reply(StatusCode::CREATED, ApiResponse::ok(SessionResponse { id, view }))
}

/// GET /api/sessions/:id - Current rendered view
async fn get_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let Ok(mut sessions) = state.sessions.lock() else {
        return poisoned();
    };

    match sessions.get_mut(&id) {
        Some(driver) => reply(
            StatusCode::OK,
            ApiResponse::ok(SessionResponse {
                id,
                view: driver.view(),
            }),
        ),
        None => not_found(id),
    }
}

/// POST /api/sessions/:id/commands - Apply commands in order
///
/// Stops at the first rejected command; earlier commands stay applied.
async fn apply_commands(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(commands): Json<Vec<DriverCommand>>,
) -> Response {
    let Ok(mut sessions) = state.sessions.lock() else {
        return poisoned();
    };
    let Some(driver) = sessions.get_mut(&id) else {
        return not_found(id);
    };

    match driver.run(&commands) {
        Ok(view) => reply(StatusCode::OK, ApiResponse::ok(SessionResponse { id, view })),
        Err(e) => {
            warn!(%id, error = %e, "command batch rejected");
            reply(StatusCode::BAD_REQUEST, ApiResponse::<()>::failure(e.to_string()))
        }
    }
}

/// DELETE /api/sessions/:id - Drop a session
async fn delete_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let Ok(mut sessions) = state.sessions.lock() else {
        return poisoned();
    };

    match sessions.remove(&id) {
        Some(_) => {
            info!(%id, open = sessions.len(), "session closed");
            reply(StatusCode::OK, ApiResponse::ok(id))
        }
        None => not_found(id),
    }
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/catalog", get(get_catalog))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/commands", post(apply_commands))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = FormConfig::load(args.config.as_deref())?;

    let catalog = match &config.catalog_path {
        Some(path) => LocationCatalog::from_file(path)
            .with_context(|| format!("Failed to load catalog: {:?}", path))?,
        None => LocationCatalog::builtin().context("Built-in catalog is invalid")?,
    };
    info!(countries = catalog.list_countries().len(), "catalog loaded");

    let addr = args.bind.unwrap_or_else(|| config.server_bind.clone());
    let app = router(AppState::new(catalog, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("🚀 Server running on http://{}", addr);
    info!("   API: http://{}/api/sessions", addr);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
