//! Vello-based renderer implementation.

use crate::display_list::{DisplayList, DrawItem, Primitive};
use crate::renderer::{RenderContext, Renderer, ShapeRenderer};
use kurbo::{Affine, BezPath, Point, Rect, Size, Stroke};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use scrawl_core::canvas::Canvas;
use scrawl_core::shapes::Text;
use vello::Scene;

/// Result of PNG rendering - contains the raw RGBA pixel data and dimensions.
#[derive(Debug)]
pub struct PngRenderResult {
    /// RGBA pixel data (4 bytes per pixel).
    pub rgba_data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

/// Vello-based renderer for GPU-accelerated 2D graphics.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Font context for text rendering (system fonts, resolved lazily).
    font_cx: FontContext,
    /// Layout context for text rendering.
    layout_cx: LayoutContext<Brush>,
    /// Set once a text run produced no glyphs.
    warned_missing_font: bool,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            warned_missing_font: false,
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Append a display list to the scene under an extra transform.
    pub fn encode_display_list(&mut self, list: &DisplayList, transform: Affine) {
        let transform = transform * list.transform;
        for item in &list.items {
            self.render_item(item, transform);
        }
    }

    /// Build a scene for PNG export: what the canvas shows, on an opaque
    /// background, without any UI chrome.
    pub fn build_export_scene(&mut self, canvas: &Canvas, size: Size, background: Color) -> Scene {
        self.scene.reset();
        self.scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            background,
            None,
            &Rect::from_origin_size(Point::ZERO, size),
        );
        let list = DisplayList::from_canvas(canvas);
        self.encode_display_list(&list, Affine::IDENTITY);
        self.take_scene()
    }

    /// Render an outline with the given color and width.
    fn stroke_shape(&mut self, shape: &impl kurbo::Shape, color: Color, width: f64, transform: Affine) {
        let stroke = Stroke::new(width);
        self.scene.stroke(&stroke, transform, color, None, shape);
    }

    /// Render text with Parley, baseline starting at `origin`.
    fn render_text(&mut self, origin: Point, content: &str, color: Color, font_size: f64, transform: Affine) {
        if content.is_empty() {
            return;
        }
        let brush = Brush::Solid(color);

        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, content, 1.0, false);
        builder.push_default(StyleProperty::FontSize(font_size as f32));
        builder.push_default(StyleProperty::Brush(brush.clone()));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Source(
            Text::FONT_FAMILY.into(),
        )));
        let mut layout = builder.build(content);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());

        // Parley puts y=0 at the top of the layout; shift so the first baseline lands on origin.
        let first_baseline = layout
            .lines()
            .next()
            .map(|line| line.metrics().baseline as f64)
            .unwrap_or_default();
        let text_transform = transform * Affine::translate((origin.x, origin.y - first_baseline));

        let mut glyph_count = 0;
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let font_size = run.font_size();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        glyph_count += 1;
                        vello::Glyph {
                            id: glyph.id,
                            x: gx,
                            y: gy,
                        }
                    })
                    .collect();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(font_size)
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }

        if glyph_count == 0 && !self.warned_missing_font {
            log::warn!("No {} font available; text will not be drawn", Text::FONT_FAMILY);
            self.warned_missing_font = true;
        }
    }
}

impl ShapeRenderer for VelloRenderer {
    fn render_item(&mut self, item: &DrawItem, transform: Affine) {
        let color = item.color.to_color();
        match &item.primitive {
            Primitive::Rect(rect) => self.stroke_shape(rect, color, item.stroke_width, transform),
            Primitive::Circle { center, radius } => {
                let circle = kurbo::Circle::new(*center, *radius);
                self.stroke_shape(&circle, color, item.stroke_width, transform);
            }
            Primitive::Polyline(points) => {
                let Some(first) = points.first() else {
                    return;
                };
                let mut path = BezPath::new();
                path.move_to(*first);
                for point in points {
                    path.line_to(*point);
                }
                self.stroke_shape(&path, color, item.stroke_width, transform);
            }
            Primitive::Text {
                origin,
                content,
                font_size,
            } => self.render_text(*origin, content, color, *font_size, transform),
        }
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        // Clear the scene
        self.scene.reset();

        let list = DisplayList::from_canvas(ctx.canvas);
        self.encode_display_list(&list, ctx.surface_transform());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_core::shapes::{Rectangle, Shape, ShapeStyle};

    #[test]
    fn test_renderer_creation() {
        let renderer = VelloRenderer::new();
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_empty_scene() {
        let mut renderer = VelloRenderer::new();
        let canvas = Canvas::new();
        let ctx = RenderContext::new(&canvas, Size::new(800.0, 600.0));

        renderer.build_scene(&ctx);
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_scene_with_shapes() {
        let mut renderer = VelloRenderer::new();
        let mut canvas = Canvas::new();

        let mut rect = Rectangle::new(Point::new(100.0, 100.0), ShapeStyle::default());
        rect.set_corner(Point::new(300.0, 250.0));
        canvas.document.add_shape(Shape::Rectangle(rect));

        let ctx = RenderContext::new(&canvas, Size::new(800.0, 600.0));
        renderer.build_scene(&ctx);
        assert!(!renderer.scene().encoding().is_empty());

        // Rebuilding starts from scratch.
        canvas.clear();
        let ctx = RenderContext::new(&canvas, Size::new(800.0, 600.0));
        renderer.build_scene(&ctx);
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_export_scene_has_background() {
        let mut renderer = VelloRenderer::new();
        let canvas = Canvas::new();
        let scene = renderer.build_export_scene(&canvas, Size::new(200.0, 100.0), Color::WHITE);
        assert!(!scene.encoding().is_empty());
        assert!(renderer.scene().encoding().is_empty());
    }
}
