//! Color swatches and the swatch grid.

use egui::{vec2, Color32, CornerRadius, CursorIcon, Rect, Sense, Stroke, StrokeKind, Ui};

use crate::{sizing, theme};

/// A square color swatch with a highlighted border when selected.
pub struct ColorSwatch<'a> {
    color: Color32,
    tooltip: &'a str,
    selected: bool,
    size: f32,
}

impl<'a> ColorSwatch<'a> {
    /// Create a new color swatch.
    pub fn new(color: Color32, tooltip: &'a str) -> Self {
        Self {
            color,
            tooltip,
            selected: false,
            size: sizing::SWATCH,
        }
    }

    /// Set whether this swatch is selected.
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Set the edge length.
    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Show the swatch and return (clicked, rect).
    pub fn show(self, ui: &mut Ui) -> (bool, Rect) {
        let (rect, response) = ui.allocate_exact_size(vec2(self.size, self.size), Sense::click());

        if ui.is_rect_visible(rect) {
            let radius = CornerRadius::same(sizing::CORNER_RADIUS);
            ui.painter().rect_filled(rect, radius, self.color);
            let border = if self.selected {
                theme::ACCENT
            } else {
                theme::BORDER
            };
            ui.painter()
                .rect_stroke(rect, radius, Stroke::new(2.0, border), StrokeKind::Inside);
        }

        let clicked = response.clicked();
        response
            .on_hover_text(self.tooltip)
            .on_hover_cursor(CursorIcon::PointingHand);
        (clicked, rect)
    }
}

/// A grid of swatches laid out in fixed columns.
pub struct ColorGrid<'a> {
    colors: &'a [(Color32, String)],
    selected: Option<usize>,
    columns: usize,
}

impl<'a> ColorGrid<'a> {
    /// Create a grid from colors and their tooltips.
    pub fn new(colors: &'a [(Color32, String)]) -> Self {
        Self {
            colors,
            selected: None,
            columns: 4,
        }
    }

    /// Index of the selected color.
    pub fn selected(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }

    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    /// Show the grid and return the index of a clicked swatch.
    pub fn show(self, ui: &mut Ui) -> Option<usize> {
        let mut clicked = None;
        for (row, chunk) in self.colors.chunks(self.columns).enumerate() {
            ui.horizontal(|ui| {
                for (col, (color, tooltip)) in chunk.iter().enumerate() {
                    let index = row * self.columns + col;
                    let swatch = ColorSwatch::new(*color, tooltip).selected(self.selected == Some(index));
                    if swatch.show(ui).0 {
                        clicked = Some(index);
                    }
                }
            });
        }
        clicked
    }
}
