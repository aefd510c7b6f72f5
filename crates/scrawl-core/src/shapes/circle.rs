//! Circle shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An outlined circle around its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    /// Center point.
    #[serde(flatten)]
    pub center: Point,
    /// Radius, never negative.
    pub radius: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Circle {
    /// Create a zero-radius circle at `center`.
    pub fn new(center: Point, style: ShapeStyle) -> Self {
        Self {
            id: ShapeId::new(),
            center,
            radius: 0.0,
            style,
        }
    }

    /// Set the radius so the circle passes through `point`.
    pub fn set_edge(&mut self, point: Point) {
        self.radius = self.center.distance(point);
    }

    /// Get as a kurbo Circle.
    pub fn as_circle(&self) -> kurbo::Circle {
        kurbo::Circle::new(self.center, self.radius)
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> &ShapeId {
        &self.id
    }

    fn origin(&self) -> Point {
        self.center
    }

    fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, (self.radius * 2.0, self.radius * 2.0))
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
    fn test_set_edge() {
        let mut circle = Circle::new(Point::ZERO, ShapeStyle::default());
        circle.set_edge(Point::new(3.0, 4.0));
        assert!((circle.radius - 5.0).abs() < f64::EPSILON);

        circle.set_edge(Point::new(-6.0, -8.0));
        assert!((circle.radius - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds() {
        let mut circle = Circle::new(Point::new(10.0, 10.0), ShapeStyle::default());
        circle.radius = 5.0;
        let bounds = circle.bounds();
        assert!((bounds.x0 - 5.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 15.0).abs() < f64::EPSILON);
    }
}
