//! Camera module for the pan transform.

use kurbo::{Affine, Point, Vec2};

/// Camera holds the pan offset between screen and document space.
///
/// The whiteboard has no zoom: a document point is drawn at
/// `point + offset` on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera {
    /// Current translation offset (pan).
    pub offset: Vec2,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform from document to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset)
    }

    /// Convert a screen point to document coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        screen_point - self.offset
    }

    /// Convert a document point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        world_point + self.offset
    }

    /// Move the view by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Put the offset back to zero.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
    }
}
