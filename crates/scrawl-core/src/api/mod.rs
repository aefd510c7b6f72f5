//! Remote save/load API.
//!
//! The whiteboard is saved by posting a [`SavePayload`] to
//! `POST /api/whiteboard/save`. Implementations of [`WhiteboardApi`] carry
//! the request over whatever transport the platform offers.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod http;

#[cfg(target_arch = "wasm32")]
mod fetch;

pub use memory::MemoryApi;

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpApi;

#[cfg(target_arch = "wasm32")]
pub use fetch::FetchApi;

use crate::shapes::Shape;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Path of the save endpoint.
pub const SAVE_PATH: &str = "/api/whiteboard/save";

/// Path prefix of the load endpoint; the board id follows.
pub const LOAD_PATH: &str = "/api/whiteboard/";

/// Default server address for native builds.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3030";

/// API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Server responded with status {0}")]
    Status(u16),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Serialization(e.to_string())
    }
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Boxed future for async operations (compatible with WASM).
#[cfg(not(target_arch = "wasm32"))]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Boxed future for async operations (compatible with WASM).
#[cfg(target_arch = "wasm32")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Body of a save request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    /// Committed shapes in insertion order.
    pub shapes: Vec<Shape>,
    /// Milliseconds since the Unix epoch when the save was requested.
    pub timestamp: u64,
}

/// Milliseconds since the Unix epoch.
pub fn timestamp_millis() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Where and how to reach the whiteboard server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Scheme, host and port, without a trailing slash. Empty means same origin.
    pub base_url: String,
    /// Transport timeout for each request.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the save endpoint.
    pub fn save_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SAVE_PATH)
    }

    /// Full URL for loading a saved board.
    pub fn load_url(&self, id: &str) -> String {
        format!("{}{}{}", self.base_url.trim_end_matches('/'), LOAD_PATH, id)
    }
}

/// Client for the whiteboard server.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait WhiteboardApi: Send + Sync {
    /// Submit a payload. Any 2xx body is returned as opaque JSON.
    fn save(&self, payload: &SavePayload) -> BoxFuture<'_, ApiResult<serde_json::Value>>;

    /// Fetch a previously saved payload.
    fn load(&self, id: &str) -> BoxFuture<'_, ApiResult<SavePayload>>;
}

/// Client for the whiteboard server (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait WhiteboardApi {
    /// Submit a payload. Any 2xx body is returned as opaque JSON.
    fn save(&self, payload: &SavePayload) -> BoxFuture<'_, ApiResult<serde_json::Value>>;

    /// Fetch a previously saved payload.
    fn load(&self, id: &str) -> BoxFuture<'_, ApiResult<SavePayload>>;
}

/// Parse a 2xx response body, treating an empty body as `null`.
pub(crate) fn parse_body(body: &str) -> ApiResult<serde_json::Value> {
    if body.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let config = ApiConfig::new("http://example.com:8080/");
        assert_eq!(config.save_url(), "http://example.com:8080/api/whiteboard/save");
        assert_eq!(config.load_url("abc"), "http://example.com:8080/api/whiteboard/abc");

        let same_origin = ApiConfig::new("");
        assert_eq!(same_origin.save_url(), "/api/whiteboard/save");
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(ApiConfig::default().timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_payload_wire_format() {
        let payload = SavePayload {
            shapes: Vec::new(),
            timestamp: 42,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, serde_json::json!({"shapes": [], "timestamp": 42}));
    }

    #[test]
    fn test_payload_with_timestamp_ids() {
        let json = r##"{"shapes":[{"id":"1700000000000","type":"rectangle","x":10,"y":10,"width":100,"height":50,"color":"#000000","strokeWidth":2}],"timestamp":1700000000000}"##;
        let payload: SavePayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.timestamp, 1_700_000_000_000);
        assert_eq!(payload.shapes[0].id().as_str(), "1700000000000");
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body("").unwrap(), serde_json::Value::Null);
        assert_eq!(parse_body("{\"id\":\"x\"}").unwrap()["id"], "x");
        assert!(matches!(parse_body("<html>"), Err(ApiError::Serialization(_))));
    }

    #[test]
    fn test_timestamp_is_recent() {
        // 2020-01-01 in milliseconds
        assert!(timestamp_millis() > 1_577_836_800_000);
    }
}
