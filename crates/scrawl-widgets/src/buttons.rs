//! Button components: tool buttons and header action buttons.

use egui::{vec2, Align2, Color32, CornerRadius, CursorIcon, FontId, Pos2, Sense, Stroke, StrokeKind, Ui};

use crate::{sizing, theme};

/// A full-width toolbar button, filled when its tool is active.
pub struct ToolButton<'a> {
    label: &'a str,
    selected: bool,
}

impl<'a> ToolButton<'a> {
    /// Create a new tool button.
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            selected: false,
        }
    }

    /// Set whether the button is selected/active.
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Show the button and return true if clicked.
    pub fn show(self, ui: &mut Ui) -> bool {
        let size = vec2(ui.available_width(), sizing::TOOL_BUTTON_HEIGHT);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());

        if ui.is_rect_visible(rect) {
            let radius = CornerRadius::same(sizing::CORNER_RADIUS);
            let (bg_color, text_color) = if self.selected {
                (theme::PRIMARY_BG, Color32::WHITE)
            } else if response.hovered() {
                (theme::HOVER_BG, theme::TEXT)
            } else {
                (Color32::WHITE, theme::TEXT)
            };

            ui.painter().rect_filled(rect, radius, bg_color);
            if !self.selected {
                ui.painter()
                    .rect_stroke(rect, radius, Stroke::new(1.0, theme::BORDER), StrokeKind::Inside);
            }
            ui.painter().text(
                Pos2::new(rect.left() + 12.0, rect.center().y),
                Align2::LEFT_CENTER,
                self.label,
                FontId::proportional(14.0),
                text_color,
            );
        }

        let clicked = response.clicked();
        response.on_hover_cursor(CursorIcon::PointingHand);
        clicked
    }
}

/// An outlined header button (Save, Export, Clear).
pub struct ActionButton<'a> {
    label: &'a str,
    tooltip: Option<&'a str>,
}

impl<'a> ActionButton<'a> {
    /// Create a new action button.
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            tooltip: None,
        }
    }

    /// Set a hover tooltip.
    pub fn tooltip(mut self, tooltip: &'a str) -> Self {
        self.tooltip = Some(tooltip);
        self
    }

    /// Show the button and return true if clicked.
    pub fn show(self, ui: &mut Ui) -> bool {
        let font_id = FontId::proportional(13.0);
        let galley = ui
            .painter()
            .layout_no_wrap(self.label.to_string(), font_id.clone(), Color32::PLACEHOLDER);
        let size = vec2(galley.size().x + 24.0, sizing::ACTION_BUTTON_HEIGHT);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());

        if ui.is_rect_visible(rect) {
            let radius = CornerRadius::same(sizing::CORNER_RADIUS);
            let bg_color = if response.hovered() {
                theme::HOVER_BG
            } else {
                Color32::WHITE
            };
            ui.painter().rect_filled(rect, radius, bg_color);
            ui.painter()
                .rect_stroke(rect, radius, Stroke::new(1.0, theme::BORDER), StrokeKind::Inside);
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                self.label,
                font_id,
                theme::TEXT,
            );
        }

        let clicked = response.clicked();
        let response = response.on_hover_cursor(CursorIcon::PointingHand);
        if let Some(tooltip) = self.tooltip {
            response.on_hover_text(tooltip);
        }
        clicked
    }
}
