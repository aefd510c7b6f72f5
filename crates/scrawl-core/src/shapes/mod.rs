//! Shape definitions for the whiteboard.

mod circle;
mod freehand;
mod rectangle;
mod text;

pub use circle::Circle;
pub use freehand::Freehand;
pub use rectangle::Rectangle;
pub use text::Text;

use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for shapes.
///
/// New shapes get a v4 UUID. Any string is accepted when reading saved
/// boards, so ids minted by other clients (such as millisecond timestamps)
/// survive a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    /// Fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ShapeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ShapeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Errors produced when parsing style values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("Invalid hex color: {0:?}")]
    InvalidColor(String),
    #[error("Stroke width {0} outside {min}..={max}", min = StrokeWidth::MIN, max = StrokeWidth::MAX)]
    InvalidStrokeWidth(u8),
}

/// RGB color stored and serialized as a `#RRGGBB` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or the short `#RGB` form (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, StyleError> {
        let invalid = || StyleError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                // #abc expands to #aabbcc
                let r = channel(&hex[0..1])?;
                let g = channel(&hex[1..2])?;
                let b = channel(&hex[2..3])?;
                Ok(Self::new(r * 17, g * 17, b * 17))
            }
            _ => Err(invalid()),
        }
    }

    /// Get the color as an opaque peniko Color.
    pub fn to_color(self) -> Color {
        Color::from_rgba8(self.r, self.g, self.b, 255)
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl From<HexColor> for Color {
    fn from(color: HexColor) -> Self {
        color.to_color()
    }
}

/// The toolbar palette.
pub const PALETTE: [HexColor; 8] = [
    HexColor::new(0x00, 0x00, 0x00),
    HexColor::new(0xFF, 0x00, 0x00),
    HexColor::new(0x00, 0xFF, 0x00),
    HexColor::new(0x00, 0x00, 0xFF),
    HexColor::new(0xFF, 0xFF, 0x00),
    HexColor::new(0xFF, 0x00, 0xFF),
    HexColor::new(0x00, 0xFF, 0xFF),
    HexColor::new(0xFF, 0xA5, 0x00),
];

/// Stroke width in pixels, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StrokeWidth(u8);

impl StrokeWidth {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Create a stroke width, rejecting values outside the allowed range.
    pub fn new(width: u8) -> Result<Self, StyleError> {
        if (Self::MIN..=Self::MAX).contains(&width) {
            Ok(Self(width))
        } else {
            Err(StyleError::InvalidStrokeWidth(width))
        }
    }

    /// Create a stroke width, saturating to the allowed range.
    pub fn clamped(width: u8) -> Self {
        Self(width.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Width as a float, for geometry.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl Default for StrokeWidth {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u8> for StrokeWidth {
    type Error = StyleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StrokeWidth> for u8 {
    fn from(width: StrokeWidth) -> Self {
        width.0
    }
}

/// Style properties shared by every shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    /// Stroke (and text fill) color.
    pub color: HexColor,
    /// Stroke width.
    pub stroke_width: StrokeWidth,
}

impl ShapeStyle {
    pub fn new(color: HexColor, stroke_width: StrokeWidth) -> Self {
        Self { color, stroke_width }
    }
}

/// Discriminant of a [`Shape`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Path,
    Text,
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> &ShapeId;

    /// Get the origin point in document coordinates.
    fn origin(&self) -> Point;

    /// Get the bounding box in document coordinates.
    fn bounds(&self) -> Rect;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;
}

/// Closed set of shapes a document can hold.
///
/// Serialized with a `type` tag: `rectangle`, `circle`, `path` or `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rectangle(Rectangle),
    Circle(Circle),
    #[serde(rename = "path")]
    Freehand(Freehand),
    Text(Text),
}

impl Shape {
    pub fn id(&self) -> &ShapeId {
        match self {
            Shape::Rectangle(s) => s.id(),
            Shape::Circle(s) => s.id(),
            Shape::Freehand(s) => s.id(),
            Shape::Text(s) => s.id(),
        }
    }

    pub fn origin(&self) -> Point {
        match self {
            Shape::Rectangle(s) => s.origin(),
            Shape::Circle(s) => s.origin(),
            Shape::Freehand(s) => s.origin(),
            Shape::Text(s) => s.origin(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rectangle(s) => s.bounds(),
            Shape::Circle(s) => s.bounds(),
            Shape::Freehand(s) => s.bounds(),
            Shape::Text(s) => s.bounds(),
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Shape::Rectangle(s) => s.style(),
            Shape::Circle(s) => s.style(),
            Shape::Freehand(s) => s.style(),
            Shape::Text(s) => s.style(),
        }
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        match self {
            Shape::Rectangle(s) => s.style_mut(),
            Shape::Circle(s) => s.style_mut(),
            Shape::Freehand(s) => s.style_mut(),
            Shape::Text(s) => s.style_mut(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Freehand(_) => ShapeKind::Path,
            Shape::Text(_) => ShapeKind::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_parse() {
        assert_eq!(HexColor::parse("#FFA500").unwrap(), HexColor::new(255, 165, 0));
        assert_eq!(HexColor::parse("#ffa500").unwrap(), HexColor::new(255, 165, 0));
        assert_eq!(HexColor::parse("#f0a").unwrap(), HexColor::new(255, 0, 170));
        assert!(HexColor::parse("FFA500").is_err());
        assert!(HexColor::parse("#FFA50").is_err());
        assert!(HexColor::parse("#GGGGGG").is_err());
    }

    #[test]
    fn test_hex_color_rejects_signs() {
        assert!(HexColor::parse("#+F+F+F").is_err());
        assert!(HexColor::parse("#-1-1-1").is_err());
        assert!(HexColor::parse("#+FF").is_err());
        assert!(HexColor::parse("# FFFFF").is_err());
    }

    #[test]
    fn test_hex_color_display() {
        assert_eq!(HexColor::new(0, 255, 16).to_string(), "#00FF10");
        assert_eq!(HexColor::default().to_string(), "#000000");
    }

    #[test]
    fn test_stroke_width_range() {
        assert!(StrokeWidth::new(0).is_err());
        assert!(StrokeWidth::new(11).is_err());
        assert_eq!(StrokeWidth::new(10).unwrap().get(), 10);
        assert_eq!(StrokeWidth::clamped(0).get(), 1);
        assert_eq!(StrokeWidth::clamped(42).get(), 10);
        assert_eq!(StrokeWidth::default().get(), 2);
    }

    #[test]
    fn test_shape_wire_format() {
        let mut rect = Rectangle::new(Point::new(10.0, 10.0), ShapeStyle::default());
        rect.width = 100.0;
        rect.height = 50.0;
        let shape = Shape::Rectangle(rect);

        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(value["type"], "rectangle");
        assert_eq!(value["x"], 10.0);
        assert_eq!(value["y"], 10.0);
        assert_eq!(value["width"], 100.0);
        assert_eq!(value["height"], 50.0);
        assert_eq!(value["color"], "#000000");
        assert_eq!(value["strokeWidth"], 2);
        assert!(value["id"].is_string());
    }

    #[test]
    fn test_path_tag() {
        let shape = Shape::Freehand(Freehand::new(Point::new(1.0, 2.0), ShapeStyle::default()));
        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(value["type"], "path");
        assert_eq!(value["points"][0]["x"], 1.0);
        assert_eq!(value["points"][0]["y"], 2.0);
    }

    #[test]
    fn test_deserialize_browser_payload() {
        let json = r##"{
            "id": "5f0c9d5e-8a4a-4a53-9f0e-1e2d3c4b5a69",
            "type": "text",
            "x": 50,
            "y": 50,
            "text": "hi",
            "color": "#FF0000",
            "strokeWidth": 3
        }"##;
        let shape: Shape = serde_json::from_str(json).unwrap();
        let Shape::Text(text) = shape else {
            panic!("expected text shape");
        };
        assert_eq!(text.content, "hi");
        assert_eq!(text.style.color, HexColor::new(255, 0, 0));
        assert_eq!(text.style.stroke_width.get(), 3);
        assert!((text.position.x - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_foreign_shape_id_round_trip() {
        let json = r##"{"id":"1700000000000","type":"rectangle","x":10,"y":10,"width":100,"height":50,"color":"#000000","strokeWidth":2}"##;
        let shape: Shape = serde_json::from_str(json).unwrap();
        assert_eq!(shape.id().as_str(), "1700000000000");

        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(value["id"], "1700000000000");
    }

    #[test]
    fn test_new_ids_are_unique_uuids() {
        let a = ShapeId::new();
        let b = ShapeId::new();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_rejects_bad_style() {
        let json = r##"{"id":"5f0c9d5e-8a4a-4a53-9f0e-1e2d3c4b5a69","type":"circle","x":0,"y":0,"radius":1,"color":"red","strokeWidth":2}"##;
        assert!(serde_json::from_str::<Shape>(json).is_err());
        let json = r##"{"id":"5f0c9d5e-8a4a-4a53-9f0e-1e2d3c4b5a69","type":"circle","x":0,"y":0,"radius":1,"color":"#000000","strokeWidth":20}"##;
        assert!(serde_json::from_str::<Shape>(json).is_err());
    }

    #[test]
    fn test_kind() {
        let style = ShapeStyle::default();
        assert_eq!(Shape::Circle(Circle::new(Point::ZERO, style)).kind(), ShapeKind::Circle);
        assert_eq!(Shape::Freehand(Freehand::new(Point::ZERO, style)).kind(), ShapeKind::Path);
    }
}
