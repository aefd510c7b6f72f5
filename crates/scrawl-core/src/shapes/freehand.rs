//! Freehand drawing shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A freehand stroke through an ordered list of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: ShapeId,
    /// Where the stroke started. Always the first point.
    #[serde(flatten)]
    pub position: Point,
    /// Points in drawing order.
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Freehand {
    /// Start a stroke with a single point.
    pub fn new(start: Point, style: ShapeStyle) -> Self {
        Self {
            id: ShapeId::new(),
            position: start,
            points: vec![start],
            style,
        }
    }

    /// Add a point to the end of the stroke.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl ShapeTrait for Freehand {
    fn id(&self) -> &ShapeId {
        &self.id
    }

    fn origin(&self) -> Point {
        self.position
    }

    fn bounds(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return Rect::from_origin_size(self.position, (0.0, 0.0));
        };
        points.fold(Rect::from_points(*first, *first), |rect, p| {
            rect.union_pt(*p)
        })
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
    fn test_starts_with_origin() {
        let path = Freehand::new(Point::new(5.0, 6.0), ShapeStyle::default());
        assert_eq!(path.len(), 1);
        assert_eq!(path.points[0], path.origin());
    }

    #[test]
    fn test_bounds() {
        let mut path = Freehand::new(Point::new(5.0, 5.0), ShapeStyle::default());
        path.add_point(Point::new(-5.0, 20.0));
        path.add_point(Point::new(15.0, 0.0));
        let bounds = path.bounds();
        assert!((bounds.x0 - -5.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 0.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 15.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 20.0).abs() < f64::EPSILON);
    }
}
