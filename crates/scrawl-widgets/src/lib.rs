//! Reusable egui widget components for the Scrawl toolbar.
//!
//! - **Buttons**: tool buttons and header action buttons
//! - **Colors**: color swatches and the swatch grid
//! - **Layout**: section labels, separators, panel frames

pub mod buttons;
pub mod colors;
pub mod layout;

pub use buttons::{ActionButton, ToolButton};
pub use colors::{ColorGrid, ColorSwatch};
pub use layout::{header_frame, panel_frame, section_label, separator};

/// Standard sizing constants used across widgets.
pub mod sizing {
    /// Color swatch size
    pub const SWATCH: f32 = 40.0;
    /// Tool button height
    pub const TOOL_BUTTON_HEIGHT: f32 = 36.0;
    /// Header button height
    pub const ACTION_BUTTON_HEIGHT: f32 = 32.0;
    /// Standard corner radius
    pub const CORNER_RADIUS: u8 = 4;
    /// Panel corner radius
    pub const PANEL_RADIUS: u8 = 8;
    /// Toolbar panel width
    pub const PANEL_WIDTH: f32 = 256.0;
}

/// Standard colors used across widgets.
pub mod theme {
    use egui::Color32;

    /// Text color (near black)
    pub const TEXT: Color32 = Color32::from_rgb(17, 24, 39);
    /// Border color
    pub const BORDER: Color32 = Color32::from_rgb(209, 213, 219);
    /// Selection/active color (blue)
    pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
    /// Filled button background
    pub const PRIMARY_BG: Color32 = Color32::from_rgb(24, 24, 27);
    /// Hover background
    pub const HOVER_BG: Color32 = Color32::from_rgb(243, 244, 246);
    /// Panel background
    pub const PANEL_BG: Color32 = Color32::WHITE;
}
