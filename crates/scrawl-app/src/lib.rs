//! Scrawl Application
//!
//! The application shell providing windowing, input handling,
//! and integration of all components.

mod app;
mod event_handler;
mod export;
mod save;
mod ui;

pub use app::{App, AppConfig, AppEvent};
pub use event_handler::EventHandler;
pub use save::{SaveNotifier, SaveQueue, SAVE_FAILURE_MESSAGE, SAVE_SUCCESS_MESSAGE};
pub use ui::{render_ui, Notification, NotificationKind, UiAction, UiState};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::run_wasm;
