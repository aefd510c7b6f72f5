//! Text shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A single line of text drawn from its baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Left end of the baseline.
    #[serde(flatten)]
    pub position: Point,
    /// Literal text content.
    #[serde(rename = "text")]
    pub content: String,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Text {
    /// Font size in pixels used for all text.
    pub const FONT_SIZE: f64 = 20.0;

    /// Generic font family name.
    pub const FONT_FAMILY: &'static str = "sans-serif";

    pub fn new(position: Point, content: String, style: ShapeStyle) -> Self {
        Self {
            id: ShapeId::new(),
            position,
            content,
            style,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Rough advance width; proper measurement needs a shaped layout.
    fn approximate_width(&self) -> f64 {
        self.content.chars().count() as f64 * Self::FONT_SIZE * 0.6
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> &ShapeId {
        &self.id
    }

    fn origin(&self) -> Point {
        self.position
    }

    fn bounds(&self) -> Rect {
        // Ascent sits above the baseline, descent below it.
        Rect::new(
            self.position.x,
            self.position.y - Self::FONT_SIZE * 0.8,
            self.position.x + self.approximate_width(),
            self.position.y + Self::FONT_SIZE * 0.2,
        )
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
    fn test_bounds_above_baseline() {
        let text = Text::new(Point::new(50.0, 50.0), "hi".to_string(), ShapeStyle::default());
        let bounds = text.bounds();
        assert!(bounds.y0 < 50.0);
        assert!(bounds.y1 > 50.0);
        assert!((bounds.x0 - 50.0).abs() < f64::EPSILON);
        assert!((bounds.width() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_has_zero_width() {
        let text = Text::new(Point::ZERO, String::new(), ShapeStyle::default());
        assert!(text.bounds().width().abs() < f64::EPSILON);
    }
}
