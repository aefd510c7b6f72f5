//! Renderer trait abstraction.

use crate::display_list::DrawItem;
use kurbo::{Affine, Size, Vec2};
use peniko::Color;
use scrawl_core::canvas::Canvas;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Export failed: {0}")]
    Export(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Background color.
    pub background_color: Color,
    /// Top-left corner of the drawing surface inside the window, in logical pixels.
    pub surface_origin: Vec2,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(canvas: &'a Canvas, viewport_size: Size) -> Self {
        Self {
            canvas,
            viewport_size,
            scale_factor: 1.0,
            background_color: Color::WHITE,
            surface_origin: Vec2::ZERO,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Offset the drawing surface from the window origin.
    pub fn with_surface_origin(mut self, origin: Vec2) -> Self {
        self.surface_origin = origin;
        self
    }

    /// Transform from surface-relative logical pixels to physical window pixels.
    pub fn surface_transform(&self) -> Affine {
        Affine::scale(self.scale_factor) * Affine::translate(self.surface_origin)
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }
}

/// Trait for rendering backends.
///
/// Implementations can use Vello, wgpu directly, or other rendering engines.
pub trait Renderer: Send + Sync {
    /// Build the scene/command buffer for a frame.
    ///
    /// Called after every change to the shapes, the in-progress shape or the
    /// pan offset. The whole surface is repainted each time.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Helper trait for drawing single display list items.
pub trait ShapeRenderer {
    /// Draw one item with the given transform.
    fn render_item(&mut self, item: &DrawItem, transform: Affine);
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_surface_transform_offsets_then_scales() {
        let canvas = Canvas::new();
        let ctx = RenderContext::new(&canvas, Size::new(800.0, 600.0))
            .with_scale_factor(2.0)
            .with_surface_origin(Vec2::new(200.0, 50.0));

        let p = ctx.surface_transform() * Point::new(10.0, 10.0);
        assert!((p.x - 420.0).abs() < f64::EPSILON);
        assert!((p.y - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_context_is_identity() {
        let canvas = Canvas::new();
        let ctx = RenderContext::new(&canvas, Size::new(100.0, 100.0));
        assert_eq!(ctx.surface_transform(), Affine::IDENTITY);
        assert_eq!(ctx.background_color, Color::WHITE);
    }
}
