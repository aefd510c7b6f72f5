//! Canvas controller tying the document, camera and tools together.

use crate::api::SavePayload;
use crate::camera::Camera;
use crate::document::Document;
use crate::input::{PointerButton, PointerEvent};
use crate::shapes::{HexColor, Shape, StrokeWidth, Text};
use crate::tools::{Interaction, ToolKind, ToolManager};
use kurbo::Point;

/// Message shown when asking the user for text.
pub const TEXT_PROMPT_MESSAGE: &str = "Enter text:";

/// Source of text for the text tool.
pub trait TextPrompt {
    /// Ask for text to place at `position` (document coordinates).
    ///
    /// Returning `None` or an empty string places nothing. Shells that
    /// cannot block may remember the position, return `None` and later call
    /// [`Canvas::insert_text`].
    fn request_text(&mut self, message: &str, position: Point) -> Option<String>;
}

impl<F> TextPrompt for F
where
    F: FnMut(&str, Point) -> Option<String>,
{
    fn request_text(&mut self, message: &str, position: Point) -> Option<String> {
        self(message, position)
    }
}

/// The whiteboard: committed shapes, pan offset and the gesture in progress.
///
/// Every mutating method returns `true` when the surface needs repainting.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    /// Committed shapes.
    pub document: Document,
    /// Pan offset.
    pub camera: Camera,
    /// Tool selection and gesture state.
    pub tool_manager: ToolManager,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a canvas showing an existing document.
    pub fn with_document(document: Document) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool_manager.set_tool(tool);
    }

    pub fn set_color(&mut self, color: HexColor) {
        self.tool_manager.set_color(color);
    }

    pub fn set_stroke_width(&mut self, width: StrokeWidth) {
        self.tool_manager.set_stroke_width(width);
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tool_manager.current_tool
    }

    pub fn interaction(&self) -> Interaction {
        self.tool_manager.interaction()
    }

    /// The uncommitted shape of the current gesture.
    pub fn in_progress(&self) -> Option<&Shape> {
        self.tool_manager.preview_shape()
    }

    /// Dispatch a pointer event to the matching transition.
    pub fn handle_pointer_event(
        &mut self,
        event: PointerEvent,
        prompt: &mut impl TextPrompt,
    ) -> bool {
        match event {
            PointerEvent::Down { position, button } => self.pointer_down(position, button, prompt),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { .. } => self.pointer_up(),
            PointerEvent::Leave => self.pointer_leave(),
        }
    }

    /// Pointer pressed at a surface position.
    ///
    /// Ignored unless the controller is idle.
    pub fn pointer_down(
        &mut self,
        position: Point,
        button: PointerButton,
        prompt: &mut impl TextPrompt,
    ) -> bool {
        if !self.tool_manager.is_idle() {
            return false;
        }
        let tool = self.tool_manager.current_tool;

        if tool == ToolKind::Pan || button == PointerButton::Middle {
            let anchor = position.to_vec2() - self.camera.offset;
            self.tool_manager.begin_pan(anchor);
            return false;
        }
        if button != PointerButton::Primary {
            return false;
        }

        let world = self.camera.screen_to_world(position);
        match tool {
            ToolKind::Text => match prompt.request_text(TEXT_PROMPT_MESSAGE, world) {
                Some(text) => self.insert_text(world, text),
                None => false,
            },
            ToolKind::Pen | ToolKind::Rectangle | ToolKind::Circle => {
                self.tool_manager.begin(world)
            }
            ToolKind::Select | ToolKind::Pan => false,
        }
    }

    /// Pointer moved to a surface position.
    pub fn pointer_move(&mut self, position: Point) -> bool {
        if let Some(anchor) = self.tool_manager.pan_anchor() {
            self.camera.offset = position.to_vec2() - anchor;
            return true;
        }
        let world = self.camera.screen_to_world(position);
        self.tool_manager.update(world)
    }

    /// Pointer released: commits the in-progress shape, if any.
    pub fn pointer_up(&mut self) -> bool {
        match self.tool_manager.end() {
            Some(shape) => {
                log::debug!("Committed {:?} {}", shape.kind(), shape.id());
                self.document.add_shape(shape);
                true
            }
            None => false,
        }
    }

    /// Pointer left the surface. Same as releasing it.
    pub fn pointer_leave(&mut self) -> bool {
        self.pointer_up()
    }

    /// Commit a text shape at a document position with the current style.
    ///
    /// Empty text is dropped.
    pub fn insert_text(&mut self, position: Point, text: String) -> bool {
        if text.is_empty() {
            return false;
        }
        let shape = Text::new(position, text, self.tool_manager.current_style);
        log::debug!("Committed text {}", shape.id);
        self.document.add_shape(Shape::Text(shape));
        true
    }

    /// Remove all shapes and reset the pan. Tool and style are kept.
    pub fn clear(&mut self) {
        self.document.clear();
        self.camera.reset();
    }

    /// Payload for a remote save of the committed shapes.
    pub fn save_payload(&self, timestamp: u64) -> SavePayload {
        SavePayload {
            shapes: self.document.shapes().to_vec(),
            timestamp,
        }
    }
}
