//! UI components using egui.

use egui::{Align, Align2, Color32, Context, CornerRadius, Key, Layout, Margin, RichText, Vec2};
use kurbo::Point;
use scrawl_core::canvas::{TEXT_PROMPT_MESSAGE, TextPrompt};
use scrawl_core::shapes::{HexColor, PALETTE, StrokeWidth};
use scrawl_core::tools::ToolKind;
use web_time::{Duration, Instant};

use scrawl_widgets::{
    ActionButton, ColorGrid, ToolButton, header_frame, panel_frame, section_label, separator,
    sizing, theme,
};

/// How long a notification stays on screen.
pub const NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

/// Colour palette names shown as swatch tooltips.
const PALETTE_NAMES: [&str; 8] = [
    "Black", "Red", "Green", "Blue", "Yellow", "Magenta", "Cyan", "Orange",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient message banner.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    shown_at: Instant,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Error)
    }

    fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }

    /// When the banner should disappear.
    pub fn expires_at(&self) -> Instant {
        self.shown_at + NOTIFICATION_DURATION
    }
}

/// Text placement waiting for the user to type something.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingText {
    /// Document position of the click.
    pub position: Point,
    /// Text typed so far.
    pub input: String,
}

/// Text prompt for shells that cannot block: remembers where the user clicked
/// and lets the UI ask for the text on the following frames.
pub struct DeferredTextPrompt<'a>(pub &'a mut Option<PendingText>);

impl TextPrompt for DeferredTextPrompt<'_> {
    fn request_text(&mut self, _message: &str, position: Point) -> Option<String> {
        *self.0 = Some(PendingText {
            position,
            input: String::new(),
        });
        None
    }
}

/// UI state that persists across frames.
pub struct UiState {
    /// Header title.
    pub title: String,
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Active stroke color.
    pub color: HexColor,
    /// Active stroke width.
    pub stroke_width: StrokeWidth,
    /// Banner currently shown, if any.
    pub notification: Option<Notification>,
    /// Text placement awaiting input.
    pub pending_text: Option<PendingText>,
    /// Window area left for the drawing surface after the panels are laid out.
    pub surface_rect: egui::Rect,
    swatches: Vec<(Color32, String)>,
}

impl UiState {
    pub fn new(title: impl Into<String>) -> Self {
        let swatches = PALETTE
            .iter()
            .zip(PALETTE_NAMES)
            .map(|(color, name)| (to_color32(*color), format!("{name} ({color})")))
            .collect();
        Self {
            title: title.into(),
            current_tool: ToolKind::default(),
            color: HexColor::default(),
            stroke_width: StrokeWidth::default(),
            notification: None,
            pending_text: None,
            surface_rect: egui::Rect::NOTHING,
            swatches,
        }
    }

    /// Show a banner, replacing any current one.
    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    /// Drop the banner once it has been on screen long enough.
    pub fn expire_notification(&mut self, now: Instant) {
        if self.notification.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notification = None;
        }
    }

    /// Next time the UI has to be redrawn without any input.
    pub fn notification_deadline(&self) -> Option<Instant> {
        self.notification.as_ref().map(Notification::expires_at)
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new("Scrawl")
    }
}

/// Actions that can be triggered from the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    SetTool(ToolKind),
    SetColor(HexColor),
    SetStrokeWidth(StrokeWidth),
    Save,
    Export,
    Clear,
    /// Place the typed text at the remembered position.
    SubmitText { position: Point, text: String },
    CancelText,
}

fn to_color32(color: HexColor) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

/// Render the UI and return any action triggered.
///
/// Also records the area left for the drawing surface in
/// [`UiState::surface_rect`].
pub fn render_ui(ctx: &Context, ui_state: &mut UiState) -> Option<UiAction> {
    let header_action = render_header(ctx, ui_state);
    let toolbar_action = render_toolbar(ctx, ui_state);
    ui_state.surface_rect = ctx.available_rect();

    render_notification(ctx, ui_state);
    let prompt_action = render_text_prompt(ctx, ui_state);

    header_action.or(toolbar_action).or(prompt_action)
}

/// Title bar with the document actions.
fn render_header(ctx: &Context, ui_state: &UiState) -> Option<UiAction> {
    let mut action = None;

    egui::TopBottomPanel::top("header")
        .frame(header_frame())
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(&ui_state.title)
                        .size(20.0)
                        .strong()
                        .color(theme::TEXT),
                );
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.spacing_mut().item_spacing = Vec2::new(8.0, 0.0);
                    // Right to left: laid out in reverse reading order
                    if ActionButton::new("Clear")
                        .tooltip("Remove every shape and reset the view")
                        .show(ui)
                    {
                        action = Some(UiAction::Clear);
                    }
                    if ActionButton::new("Export")
                        .tooltip("Download the canvas as whiteboard.png")
                        .show(ui)
                    {
                        action = Some(UiAction::Export);
                    }
                    if ActionButton::new("Save")
                        .tooltip("Save the whiteboard to the server")
                        .show(ui)
                    {
                        action = Some(UiAction::Save);
                    }
                });
            });
        });

    action
}

/// Left tool panel: tools, palette and stroke width.
fn render_toolbar(ctx: &Context, ui_state: &UiState) -> Option<UiAction> {
    let mut action = None;

    egui::SidePanel::left("toolbar")
        .exact_width(sizing::PANEL_WIDTH)
        .resizable(false)
        .frame(
            panel_frame()
                .corner_radius(CornerRadius::ZERO)
                .outer_margin(Margin::ZERO),
        )
        .show(ctx, |ui| {
            section_label(ui, "Tools");
            ui.add_space(4.0);
            ui.vertical(|ui| {
                ui.spacing_mut().item_spacing = Vec2::new(0.0, 4.0);
                for tool in ToolKind::ALL {
                    if ToolButton::new(tool.name())
                        .selected(ui_state.current_tool == tool)
                        .show(ui)
                    {
                        action = Some(UiAction::SetTool(tool));
                    }
                }
            });

            separator(ui);
            section_label(ui, "Color");
            ui.add_space(4.0);
            let selected = PALETTE.iter().position(|c| *c == ui_state.color);
            if let Some(index) = ColorGrid::new(&ui_state.swatches)
                .selected(selected)
                .columns(4)
                .show(ui)
            {
                action = Some(UiAction::SetColor(PALETTE[index]));
            }

            separator(ui);
            section_label(ui, &format!("Thickness: {}px", ui_state.stroke_width.get()));
            let mut width = ui_state.stroke_width.get();
            let slider = egui::Slider::new(&mut width, StrokeWidth::MIN..=StrokeWidth::MAX)
                .show_value(false);
            if ui.add(slider).changed() {
                action = Some(UiAction::SetStrokeWidth(StrokeWidth::clamped(width)));
            }
        });

    action
}

fn render_notification(ctx: &Context, ui_state: &UiState) {
    let Some(notification) = &ui_state.notification else {
        return;
    };
    let (fill, text) = match notification.kind {
        NotificationKind::Success => (Color32::from_rgb(220, 252, 231), Color32::from_rgb(22, 101, 52)),
        NotificationKind::Error => (Color32::from_rgb(254, 226, 226), Color32::from_rgb(153, 27, 27)),
    };

    egui::Area::new(egui::Id::new("notification"))
        .anchor(Align2::CENTER_TOP, Vec2::new(0.0, 72.0))
        .interactable(false)
        .show(ctx, |ui| {
            panel_frame()
                .fill(fill)
                .inner_margin(Margin::symmetric(16, 10))
                .show(ui, |ui| {
                    ui.label(RichText::new(&notification.message).color(text));
                });
        });
}

/// Modal asking for the text of a pending text placement.
fn render_text_prompt(ctx: &Context, ui_state: &mut UiState) -> Option<UiAction> {
    let pending = ui_state.pending_text.as_mut()?;
    let mut action = None;

    egui::Window::new("Add text")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(TEXT_PROMPT_MESSAGE);
            let response = ui.text_edit_singleline(&mut pending.input);
            response.request_focus();
            let entered = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() || entered {
                    action = Some(UiAction::SubmitText {
                        position: pending.position,
                        text: pending.input.clone(),
                    });
                }
                if ui.button("Cancel").clicked() || ui.input(|i| i.key_pressed(Key::Escape)) {
                    action = Some(UiAction::CancelText);
                }
            });
        });

    action
}
