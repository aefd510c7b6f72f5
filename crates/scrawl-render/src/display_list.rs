//! Backend-independent drawing commands for a frame.

use kurbo::{Affine, Point, Rect, Vec2};
use scrawl_core::canvas::Canvas;
use scrawl_core::shapes::{HexColor, Shape, Text};

/// A single drawing primitive in document coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Outline of an axis-aligned rectangle with non-negative extents.
    Rect(Rect),
    /// Full outline of a circle.
    Circle { center: Point, radius: f64 },
    /// Open polyline through the points in order.
    Polyline(Vec<Point>),
    /// Filled text whose baseline starts at `origin`.
    Text {
        origin: Point,
        content: String,
        font_size: f64,
    },
}

/// A primitive plus the style to draw it with.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub primitive: Primitive,
    pub color: HexColor,
    pub stroke_width: f64,
}

impl DrawItem {
    fn from_shape(shape: &Shape) -> Self {
        let style = shape.style();
        let primitive = match shape {
            Shape::Rectangle(rect) => Primitive::Rect(rect.as_rect()),
            Shape::Circle(circle) => Primitive::Circle {
                center: circle.center,
                radius: circle.radius.max(0.0),
            },
            Shape::Freehand(path) => Primitive::Polyline(path.points.clone()),
            Shape::Text(text) => Primitive::Text {
                origin: text.position,
                content: text.content.clone(),
                font_size: Text::FONT_SIZE,
            },
        };
        Self {
            primitive,
            color: style.color,
            stroke_width: style.stroke_width.as_f64(),
        }
    }
}

/// Everything needed to paint one frame.
///
/// Painting a list means: clear the surface to the background, apply
/// `transform`, then draw `items` in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    /// Document-to-surface transform (the pan offset).
    pub transform: Affine,
    /// Items back to front.
    pub items: Vec<DrawItem>,
}

impl DisplayList {
    /// Display list for the current state of a canvas.
    pub fn from_canvas(canvas: &Canvas) -> Self {
        build_display_list(
            canvas.document.shapes(),
            canvas.in_progress(),
            canvas.camera.offset,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Build the display list for committed shapes plus the in-progress shape on top.
///
/// Pure: the same inputs always produce the same list.
pub fn build_display_list(shapes: &[Shape], in_progress: Option<&Shape>, pan: Vec2) -> DisplayList {
    let items = shapes
        .iter()
        .chain(in_progress)
        .map(DrawItem::from_shape)
        .collect();
    DisplayList {
        transform: Affine::translate(pan),
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_core::input::PointerButton;
    use scrawl_core::shapes::{Circle, Rectangle, ShapeStyle, StrokeWidth};
    use scrawl_core::tools::ToolKind;

    fn no_prompt(_: &str, _: Point) -> Option<String> {
        None
    }

    #[test]
    fn test_empty_canvas() {
        let list = DisplayList::from_canvas(&Canvas::new());
        assert!(list.is_empty());
        assert_eq!(list.transform, Affine::IDENTITY);
    }

    #[test]
    fn test_in_progress_drawn_last() {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Rectangle);
        canvas.pointer_down(Point::new(0.0, 0.0), PointerButton::Primary, &mut no_prompt);
        canvas.pointer_move(Point::new(10.0, 10.0));
        canvas.pointer_up();

        canvas.set_tool(ToolKind::Circle);
        canvas.pointer_down(Point::new(50.0, 50.0), PointerButton::Primary, &mut no_prompt);
        canvas.pointer_move(Point::new(53.0, 54.0));

        let list = DisplayList::from_canvas(&canvas);
        assert_eq!(list.items.len(), 2);
        assert!(matches!(list.items[0].primitive, Primitive::Rect(_)));
        let Primitive::Circle { radius, .. } = list.items[1].primitive else {
            panic!("expected circle on top");
        };
        assert!((radius - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_rectangle_normalized() {
        let mut rect = Rectangle::new(Point::new(100.0, 100.0), ShapeStyle::default());
        rect.set_corner(Point::new(60.0, 70.0));
        let list = build_display_list(&[Shape::Rectangle(rect)], None, Vec2::ZERO);
        assert_eq!(list.items[0].primitive, Primitive::Rect(Rect::new(60.0, 70.0, 100.0, 100.0)));
    }

    #[test]
    fn test_style_carried() {
        let style = ShapeStyle::new(HexColor::new(255, 165, 0), StrokeWidth::clamped(6));
        let list = build_display_list(&[Shape::Circle(Circle::new(Point::ZERO, style))], None, Vec2::ZERO);
        assert_eq!(list.items[0].color, HexColor::new(255, 165, 0));
        assert!((list.items[0].stroke_width - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_uses_fixed_font_size() {
        let mut canvas = Canvas::new();
        canvas.insert_text(Point::new(50.0, 50.0), "hi".to_string());
        let list = DisplayList::from_canvas(&canvas);
        assert_eq!(
            list.items[0].primitive,
            Primitive::Text {
                origin: Point::new(50.0, 50.0),
                content: "hi".to_string(),
                font_size: 20.0,
            }
        );
    }

    #[test]
    fn test_pan_there_and_back_is_identical() {
        let mut canvas = Canvas::new();
        canvas.insert_text(Point::new(5.0, 5.0), "x".to_string());
        let before = DisplayList::from_canvas(&canvas);

        canvas.camera.pan(Vec2::new(37.0, -12.0));
        let panned = DisplayList::from_canvas(&canvas);
        assert_ne!(before, panned);
        assert_eq!(panned.transform, Affine::translate((37.0, -12.0)));

        canvas.camera.pan(Vec2::new(-37.0, 12.0));
        assert_eq!(before, DisplayList::from_canvas(&canvas));
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut canvas = Canvas::new();
        canvas.insert_text(Point::new(1.0, 1.0), "a".to_string());
        assert_eq!(DisplayList::from_canvas(&canvas), DisplayList::from_canvas(&canvas));
    }
}
