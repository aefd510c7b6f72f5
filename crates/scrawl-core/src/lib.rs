//! Scrawl Core Library
//!
//! Platform-agnostic data structures and interaction logic for the Scrawl whiteboard.

pub mod api;
pub mod camera;
pub mod canvas;
pub mod document;
pub mod input;
pub mod shapes;
pub mod tools;

pub use api::{ApiConfig, ApiError, ApiResult, SavePayload, WhiteboardApi};
pub use camera::Camera;
pub use canvas::{Canvas, TextPrompt};
pub use document::Document;
pub use input::{PointerButton, PointerEvent};
pub use tools::{Interaction, ToolKind, ToolManager, ToolState};
