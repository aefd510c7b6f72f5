//! Tool system for the whiteboard.

use crate::shapes::{Circle, Freehand, HexColor, Rectangle, Shape, ShapeKind, ShapeStyle, StrokeWidth};
use kurbo::{Point, Vec2};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolKind {
    /// Inert pointer; clicks do nothing.
    #[default]
    Select,
    Pen,
    Rectangle,
    Circle,
    Text,
    Pan,
}

impl ToolKind {
    /// Tools in toolbar order.
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Select,
        ToolKind::Pen,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Text,
        ToolKind::Pan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Pen => "Pen",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Text => "Text",
            ToolKind::Pan => "Move",
        }
    }

    /// Whether pressing with this tool starts an in-progress shape.
    pub fn draws_shapes(&self) -> bool {
        matches!(self, ToolKind::Pen | ToolKind::Rectangle | ToolKind::Circle)
    }
}

/// State of a pointer gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolState {
    /// Waiting for a pointer press.
    #[default]
    Idle,
    /// A shape is being drawn and is not yet committed.
    Drawing {
        /// The in-progress shape, in document coordinates.
        shape: Shape,
    },
    /// The view is being dragged.
    Panning {
        /// Pointer position minus the pan offset at press time.
        anchor: Vec2,
    },
}

/// Read-only summary of the gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Idle,
    Drawing(ShapeKind),
    Panning,
}

/// Manages the current tool, style and gesture state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the gesture.
    pub state: ToolState,
    /// Style applied to new shapes.
    pub current_style: ShapeStyle,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool. A gesture already underway keeps going.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
    }

    pub fn set_color(&mut self, color: HexColor) {
        self.current_style.color = color;
    }

    pub fn set_stroke_width(&mut self, width: StrokeWidth) {
        self.current_style.stroke_width = width;
    }

    /// Create the zero-extent shape the current tool draws at `point`.
    fn new_shape(&self, point: Point) -> Option<Shape> {
        let style = self.current_style;
        match self.current_tool {
            ToolKind::Pen => Some(Shape::Freehand(Freehand::new(point, style))),
            ToolKind::Rectangle => Some(Shape::Rectangle(Rectangle::new(point, style))),
            ToolKind::Circle => Some(Shape::Circle(Circle::new(point, style))),
            ToolKind::Select | ToolKind::Text | ToolKind::Pan => None,
        }
    }

    /// Begin drawing at a document point. Returns false if the tool does not draw.
    pub fn begin(&mut self, point: Point) -> bool {
        match self.new_shape(point) {
            Some(shape) => {
                self.state = ToolState::Drawing { shape };
                true
            }
            None => false,
        }
    }

    /// Begin panning with the given anchor.
    pub fn begin_pan(&mut self, anchor: Vec2) {
        self.state = ToolState::Panning { anchor };
    }

    /// Extend the in-progress shape to a document point.
    pub fn update(&mut self, point: Point) -> bool {
        let ToolState::Drawing { shape } = &mut self.state else {
            return false;
        };
        match shape {
            Shape::Freehand(path) => path.add_point(point),
            Shape::Rectangle(rect) => rect.set_corner(point),
            Shape::Circle(circle) => circle.set_edge(point),
            Shape::Text(_) => return false,
        }
        true
    }

    /// End the gesture, returning the shape to commit if one was drawn.
    pub fn end(&mut self) -> Option<Shape> {
        match std::mem::take(&mut self.state) {
            ToolState::Drawing { shape } => Some(shape),
            ToolState::Idle | ToolState::Panning { .. } => None,
        }
    }

    /// Anchor of the current pan gesture.
    pub fn pan_anchor(&self) -> Option<Vec2> {
        match self.state {
            ToolState::Panning { anchor } => Some(anchor),
            _ => None,
        }
    }

    /// Shape being drawn, if any.
    pub fn preview_shape(&self) -> Option<&Shape> {
        match &self.state {
            ToolState::Drawing { shape } => Some(shape),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ToolState::Idle)
    }

    pub fn interaction(&self) -> Interaction {
        match &self.state {
            ToolState::Idle => Interaction::Idle,
            ToolState::Drawing { shape } => Interaction::Drawing(shape.kind()),
            ToolState::Panning { .. } => Interaction::Panning,
        }
    }
}
