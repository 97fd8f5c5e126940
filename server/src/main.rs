use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode, header::CONTENT_TYPE},
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::get,
};
use futures::stream::Stream;
use rollmenu::{
    DEFAULT_POLL_INTERVAL, PresetError, PresetStore, StateStore, Table, VersionWatcher, assemble,
    open_table,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::{
    convert::Infallible,
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();
    let config = Config::from_env()?;

    let table = open_table(&config.data_path).map_err(|err| {
        AppError::Startup(format!(
            "cannot load dataset {}: {err}",
            config.data_path.display()
        ))
    })?;
    info!(
        "loaded {} records, {} columns from {}",
        table.len(),
        table.columns().len(),
        config.data_path.display()
    );

    let store = Arc::new(StateStore::new(table.columns().to_vec()));
    let presets = Arc::new(PresetStore::new(&config.preset_dir)?);

    let state = AppState {
        config: config.clone(),
        table: Arc::new(table),
        store,
        presets,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/api/state", get(get_state).post(update_state))
        .route("/api/columns", get(get_columns))
        .route("/api/overlay-data", get(overlay_data))
        .route("/api/stream", get(stream))
        .route("/api/presets", get(list_presets).post(save_preset))
        .route(
            "/api/presets/{name}",
            get(load_preset).delete(delete_preset),
        )
        .route_service("/", ServeFile::new(config.ui_dir.join("control.html")))
        .route_service("/control", ServeFile::new(config.ui_dir.join("control.html")))
        .route_service("/overlay", ServeFile::new(config.ui_dir.join("overlay.html")))
        .nest_service("/ui", ServeDir::new(&config.ui_dir))
        .nest_service("/pics", ServeDir::new("pics"))
        .nest_service("/fonts", ServeDir::new("fonts"))
        .with_state(state)
        .layer(cors);

    let listener = bind_listener(&config).await?;
    let addr = listener.local_addr()?;
    print_startup_banner(addr);

    axum::serve(listener, app)
        .await
        .map_err(|err| AppError::Startup(format!("server error: {err}")))?;
    Ok(())
}

#[derive(Clone)]
struct AppState {
    config: Config,
    table: Arc<Table>,
    store: Arc<StateStore>,
    presets: Arc<PresetStore>,
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: Option<u16>,
    port_start: u16,
    data_path: PathBuf,
    preset_dir: PathBuf,
    ui_dir: PathBuf,
    poll_interval: Duration,
}

impl Config {
    fn from_env() -> Result<Self, AppError> {
        let host = env_or("ROLLMENU_HOST", "127.0.0.1");
        let port = match std::env::var("ROLLMENU_PORT") {
            Ok(value) => Some(value.parse::<u16>().map_err(|_| {
                AppError::Config("Invalid integer for ROLLMENU_PORT".to_string())
            })?),
            Err(_) => None,
        };
        let port_start = env_or_int("ROLLMENU_PORT_START", 5000)? as u16;
        let data_path = PathBuf::from(env_or("ROLLMENU_DATA", "data/data.xlsx"));
        let preset_dir = PathBuf::from(env_or("ROLLMENU_PRESET_DIR", "presets"));
        let ui_dir = PathBuf::from(env_or("ROLLMENU_UI_DIR", "ui"));
        let poll_ms = env_or_int("ROLLMENU_POLL_MS", DEFAULT_POLL_INTERVAL.as_millis() as i64)?;
        let poll_interval = Duration::from_millis(poll_ms.max(1) as u64);

        Ok(Self {
            host,
            port,
            port_start,
            data_path,
            preset_dir,
            ui_dir,
            poll_interval,
        })
    }
}

/// Bind the configured port, or probe upward from the start port until a
/// bind succeeds.
async fn bind_listener(config: &Config) -> Result<TcpListener, AppError> {
    if let Some(port) = config.port {
        let addr = format!("{}:{}", config.host, port);
        return TcpListener::bind(&addr)
            .await
            .map_err(|err| AppError::Startup(format!("cannot bind {addr}: {err}")));
    }

    let mut port = config.port_start;
    for _ in 0..50 {
        match TcpListener::bind((config.host.as_str(), port)).await {
            Ok(listener) => return Ok(listener),
            Err(_) => port = port.wrapping_add(1),
        }
    }
    Err(AppError::Startup(format!(
        "no free port found starting at {}",
        config.port_start
    )))
}

fn print_startup_banner(addr: SocketAddr) {
    info!("rollmenu server listening on {addr}");
    info!("control panel: http://{addr}/control");
    info!("overlay (use as OBS browser source): http://{addr}/overlay");
    info!("press Ctrl+C to stop");
}

async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.snapshot())
}

async fn update_state(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    // A missing or malformed body is an empty update, not an error.
    let partial = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|value| value.as_object().cloned())
        .unwrap_or_default();

    let (snapshot, changed) = state.store.apply(&partial);
    if changed {
        info!(version = state.store.version(), "state updated");
    }
    Json(json!({ "ok": true, "state": snapshot }))
}

async fn get_columns(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "columns": state.table.columns() }))
}

async fn overlay_data(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.store.snapshot();
    Json(assemble(&state.table, &snapshot))
}

/// Server-push stream of version numbers. The overlay re-fetches
/// `/api/overlay-data` after each event.
async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let watcher = VersionWatcher::new(state.store.clone(), state.config.poll_interval);
    let stream = futures::stream::unfold(watcher, |mut watcher| async move {
        let version = watcher.changed().await;
        Some((Ok(Event::default().data(version.to_string())), watcher))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn list_presets(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let presets = state.presets.list()?;
    Ok(Json(json!({ "presets": presets })))
}

#[derive(Debug, Default, Deserialize)]
struct SavePresetRequest {
    name: Option<String>,
    state: Option<Value>,
    style: Option<Value>,
}

async fn save_preset(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let req: SavePresetRequest = serde_json::from_slice(&body).unwrap_or_default();

    let name = req.name.unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return Err(AppError::EmptyName);
    }

    // Accept both "state" and "style" as the payload key.
    let style = req
        .state
        .or(req.style)
        .filter(|value| !is_empty_state(value));
    let Some(style) = style else {
        return Err(AppError::EmptyState);
    };

    state.presets.save(&name, &style)?;
    Ok(Json(json!({ "ok": true })))
}

async fn load_preset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    match state.presets.load(&name)? {
        Some(preset) => Ok(Json(json!({ "ok": true, "state": preset }))),
        None => Err(AppError::PresetNotFound),
    }
}

async fn delete_preset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.presets.delete(&name)?;
    Ok(Json(json!({ "ok": true })))
}

fn is_empty_state(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_int(key: &str, default: i64) -> Result<i64, AppError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<i64>()
            .map_err(|_| AppError::Config(format!("Invalid integer for {key}"))),
        Err(_) => Ok(default),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

#[derive(Debug, Error)]
enum AppError {
    #[error("startup error: {0}")]
    Startup(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preset name is empty")]
    EmptyName,
    #[error("preset state is empty")]
    EmptyState,
    #[error("preset not found")]
    PresetNotFound,
    #[error(transparent)]
    Preset(#[from] PresetError),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::EmptyName => "empty_name",
            AppError::EmptyState => "empty_state",
            AppError::PresetNotFound => "not_found",
            AppError::Preset(PresetError::AlreadyExists) => "exists",
            AppError::Preset(PresetError::InvalidName) => "invalid_name",
            _ => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::EmptyName | AppError::EmptyState => StatusCode::BAD_REQUEST,
            AppError::Preset(PresetError::AlreadyExists)
            | AppError::Preset(PresetError::InvalidName) => StatusCode::BAD_REQUEST,
            AppError::PresetNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request error: {self}");
        }
        (status, Json(json!({ "ok": false, "error": self.code() }))).into_response()
    }
}
