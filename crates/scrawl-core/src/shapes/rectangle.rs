//! Rectangle shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An outlined rectangle anchored at the corner where the drag started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Corner where the gesture started.
    #[serde(flatten)]
    pub position: Point,
    /// Signed width; negative when the drag went left.
    pub width: f64,
    /// Signed height; negative when the drag went up.
    pub height: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Rectangle {
    /// Create a zero-sized rectangle at `position`.
    pub fn new(position: Point, style: ShapeStyle) -> Self {
        Self {
            id: ShapeId::new(),
            position,
            width: 0.0,
            height: 0.0,
            style,
        }
    }

    /// Stretch the rectangle so its opposite corner sits at `corner`.
    pub fn set_corner(&mut self, corner: Point) {
        self.width = corner.x - self.position.x;
        self.height = corner.y - self.position.y;
    }

    /// Get the rectangle as a kurbo Rect with non-negative extents.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
        .abs()
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> &ShapeId {
        &self.id
    }

    fn origin(&self) -> Point {
        self.position
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_corner_signed() {
        let mut rect = Rectangle::new(Point::new(100.0, 100.0), ShapeStyle::default());
        rect.set_corner(Point::new(40.0, 130.0));
        assert!((rect.width - -60.0).abs() < f64::EPSILON);
        assert!((rect.height - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds_normalized() {
        let mut rect = Rectangle::new(Point::new(100.0, 100.0), ShapeStyle::default());
        rect.set_corner(Point::new(40.0, 20.0));
        let bounds = rect.bounds();
        assert!((bounds.x0 - 40.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.width() - 60.0).abs() < f64::EPSILON);
        assert!((bounds.height() - 80.0).abs() < f64::EPSILON);
    }
}
