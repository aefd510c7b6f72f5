//! Scrawl Whiteboard Server
//!
//! Stores saved whiteboards in memory and hands them back by id.
//!
//! ## Endpoints
//!
//! ```text
//! POST /api/whiteboard/save   { "shapes": [...], "timestamp": 1700000000000 }
//!                          -> { "id": "<uuid>", "savedAt": 1700000000123 }
//! GET  /api/whiteboard/{id} -> { "shapes": [...], "timestamp": ... } or 404
//! GET  /health              -> ok
//! ```

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use scrawl_core::api::SavePayload;
use serde::Serialize;
use std::{
    collections::VecDeque,
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

/// Boards kept before the oldest is dropped.
const MAX_STORED_BOARDS: usize = 1000;
const DEFAULT_ADDR: &str = "0.0.0.0:3030";

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
struct ServerConfig {
    addr: SocketAddr,
    /// Directory with the web build, served at `/` when set.
    static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Read `SCRAWL_ADDR` and `SCRAWL_STATIC_DIR`.
    fn from_env() -> Self {
        Self::from_vars(
            std::env::var("SCRAWL_ADDR").ok(),
            std::env::var("SCRAWL_STATIC_DIR").ok(),
        )
    }

    fn from_vars(addr: Option<String>, static_dir: Option<String>) -> Self {
        let default_addr: SocketAddr = ([0, 0, 0, 0], 3030).into();
        let addr = match addr {
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!("Invalid SCRAWL_ADDR {:?} ({}), using {}", value, e, DEFAULT_ADDR);
                default_addr
            }),
            None => default_addr,
        };
        let static_dir = static_dir.filter(|dir| !dir.is_empty()).map(PathBuf::from);
        Self { addr, static_dir }
    }
}

/// Reply to a successful save.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct SaveResponse {
    id: String,
    saved_at: u64,
}

#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Saved boards, bounded to `capacity` entries.
struct BoardStore {
    boards: DashMap<String, SavePayload>,
    /// Insertion order, oldest first.
    order: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl BoardStore {
    fn new(capacity: usize) -> Self {
        Self {
            boards: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    /// Store a board under a fresh id, evicting the oldest when full.
    fn insert(&self, payload: SavePayload) -> String {
        let id = Uuid::new_v4().to_string();
        self.boards.insert(id.clone(), payload);

        let mut order = self.order.lock().unwrap_or_else(|e| e.into_inner());
        order.push_back(id.clone());
        while order.len() > self.capacity {
            if let Some(oldest) = order.pop_front() {
                self.boards.remove(&oldest);
                info!("Evicted board {}", oldest);
            }
        }
        id
    }

    fn get(&self, id: &str) -> Option<SavePayload> {
        self.boards.get(id).map(|board| board.clone())
    }

    fn len(&self) -> usize {
        self.boards.len()
    }
}

/// Shared application state
struct AppState {
    store: BoardStore,
}

impl AppState {
    fn new() -> Self {
        Self {
            store: BoardStore::new(MAX_STORED_BOARDS),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/api/whiteboard/save", post(save_board))
        .route("/api/whiteboard/{id}", get(load_board))
        .route("/health", get(health));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.route("/", get(index)),
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrawl_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    if let Some(dir) = &config.static_dir {
        info!("Serving static files from {}", dir.display());
    }

    let app = router(Arc::new(AppState::new()), config.static_dir.clone());

    info!("Scrawl server listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}

/// Index page
async fn index() -> &'static str {
    "Scrawl Whiteboard Server - POST /api/whiteboard/save, GET /api/whiteboard/{id}"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// Store a whiteboard. Malformed bodies are rejected by the `Json` extractor.
async fn save_board(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SavePayload>,
) -> Json<SaveResponse> {
    let shape_count = payload.shapes.len();
    let id = state.store.insert(payload);
    info!("Saved board {} ({} shapes, {} stored)", id, shape_count, state.store.len());
    Json(SaveResponse {
        id,
        saved_at: now_millis(),
    })
}

/// Fetch a stored whiteboard.
async fn load_board(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.store.get(&id) {
        Some(payload) => Json(payload).into_response(),
        None => {
            warn!("Board {} not found", id);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Whiteboard {} not found", id),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_core::shapes::Shape;

    fn payload(timestamp: u64) -> SavePayload {
        let shapes: Vec<Shape> = serde_json::from_str(
            r##"[
                {"id":"3f2b8c1e-0000-4000-8000-000000000001","type":"rectangle","x":10,"y":10,"width":100,"height":50,"color":"#000000","strokeWidth":2},
                {"id":"3f2b8c1e-0000-4000-8000-000000000002","type":"text","x":50,"y":50,"text":"hi","color":"#FF0000","strokeWidth":1}
            ]"##,
        )
        .unwrap();
        SavePayload { shapes, timestamp }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let state = Arc::new(AppState::new());
        let Json(saved) = save_board(State(state.clone()), Json(payload(42))).await;
        assert!(Uuid::parse_str(&saved.id).is_ok());
        assert!(saved.saved_at > 0);

        let response = load_board(State(state), Path(saved.id)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_save_accepts_timestamp_ids() {
        let body = r##"{"shapes":[{"id":"1700000000000","type":"path","x":1,"y":2,"points":[{"x":1,"y":2}],"color":"#000000","strokeWidth":2}],"timestamp":1700000000000}"##;
        let payload: SavePayload = serde_json::from_str(body).unwrap();
        let state = Arc::new(AppState::new());
        let Json(saved) = save_board(State(state.clone()), Json(payload)).await;

        let stored = state.store.get(&saved.id).unwrap();
        assert_eq!(stored.shapes[0].id().as_str(), "1700000000000");
    }

    #[tokio::test]
    async fn test_load_missing_board() {
        let state = Arc::new(AppState::new());
        let response = load_board(State(state), Path("nope".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "ok");
    }

    #[test]
    fn test_store_keeps_payload() {
        let store = BoardStore::new(4);
        let id = store.insert(payload(7));
        let stored = store.get(&id).unwrap();
        assert_eq!(stored, payload(7));
        assert_eq!(stored.shapes.len(), 2);
        assert!(matches!(stored.shapes[1], Shape::Text(_)));
    }

    #[test]
    fn test_store_evicts_oldest() {
        let store = BoardStore::new(2);
        let first = store.insert(payload(1));
        let second = store.insert(payload(2));
        let third = store.insert(payload(3));

        assert_eq!(store.len(), 2);
        assert!(store.get(&first).is_none());
        assert!(store.get(&second).is_some());
        assert!(store.get(&third).is_some());
    }

    #[test]
    fn test_save_response_is_camel_case() {
        let json = serde_json::to_value(SaveResponse {
            id: "abc".to_string(),
            saved_at: 5,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"id": "abc", "savedAt": 5}));
    }

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::from_vars(None, None);
        assert_eq!(config.addr, DEFAULT_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(config.static_dir, None);
    }

    #[test]
    fn test_config_overrides() {
        let config = ServerConfig::from_vars(
            Some("127.0.0.1:8080".to_string()),
            Some("dist".to_string()),
        );
        assert_eq!(config.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.static_dir, Some(PathBuf::from("dist")));

        let config = ServerConfig::from_vars(Some("not an address".to_string()), Some(String::new()));
        assert_eq!(config.addr, DEFAULT_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(config.static_dir, None);
    }

    #[test]
    fn test_router_builds_with_and_without_static_dir() {
        let _ = router(Arc::new(AppState::new()), None);
        let _ = router(Arc::new(AppState::new()), Some(PathBuf::from(".")));
    }
}
