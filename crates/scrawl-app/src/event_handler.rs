//! Translation of window pointer events into canvas pointer events.

use kurbo::{Point, Rect};
use scrawl_core::input::{PointerButton, PointerEvent};
use winit::event::{ElementState, MouseButton};

/// Map a winit mouse button to a canvas pointer button.
pub fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Middle => Some(PointerButton::Middle),
        MouseButton::Right => Some(PointerButton::Secondary),
        _ => None,
    }
}

/// Tracks the cursor relative to the drawing surface.
///
/// The surface is the part of the window not covered by the header and the
/// tool panel. Leaving it produces [`PointerEvent::Leave`], whether the cursor
/// moved onto the toolbar chrome or out of the window.
#[derive(Debug, Clone, Default)]
pub struct EventHandler {
    /// Drawing surface in logical window coordinates.
    surface: Rect,
    /// Last cursor position in logical window coordinates.
    cursor: Option<Point>,
    /// Whether the cursor is currently over the surface.
    inside: bool,
}

impl EventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the drawing surface bounds (changes with window size and panel layout).
    pub fn set_surface(&mut self, surface: Rect) {
        self.surface = surface;
    }

    pub fn surface(&self) -> Rect {
        self.surface
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    fn to_surface(&self, position: Point) -> Point {
        Point::new(position.x - self.surface.x0, position.y - self.surface.y0)
    }

    /// Handle a cursor move (logical window coordinates).
    pub fn cursor_moved(&mut self, position: Point) -> Option<PointerEvent> {
        self.cursor = Some(position);
        let was_inside = self.inside;
        self.inside = self.surface.contains(position);

        match (was_inside, self.inside) {
            (_, true) => Some(PointerEvent::Move {
                position: self.to_surface(position),
            }),
            (true, false) => Some(PointerEvent::Leave),
            (false, false) => None,
        }
    }

    /// Handle a button press or release.
    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton) -> Option<PointerEvent> {
        if !self.inside {
            return None;
        }
        let position = self.to_surface(self.cursor?);
        match state {
            ElementState::Pressed => Some(PointerEvent::Down {
                position,
                button: pointer_button(button)?,
            }),
            ElementState::Released => Some(PointerEvent::Up { position }),
        }
    }

    /// Handle the cursor leaving the window.
    pub fn cursor_left(&mut self) -> Option<PointerEvent> {
        self.cursor = None;
        std::mem::replace(&mut self.inside, false).then_some(PointerEvent::Leave)
    }
}
