//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use dot_estimate_rendering::{
    DialogAction, DialogPresentation, GuessButton, HudPresentation, SettingAdjustment,
};
use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Skin, Ui},
};

/// Outcome of rendering the control panel UI during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ControlPanelUiResult {
    /// Whether the start/pause/resume button was pressed.
    pub(crate) toggle_pause: bool,
    /// Whether the restart button was pressed.
    pub(crate) restart: bool,
    /// Candidate whose button was pressed.
    pub(crate) guess: Option<u32>,
    /// Setting button pressed during this frame.
    pub(crate) adjustment: Option<SettingAdjustment>,
}

/// Snapshot of the control panel's UI layout and data for the current frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ControlPanelUiContext<'a> {
    /// Top-left corner of the panel in screen coordinates.
    pub(crate) origin: Vec2,
    /// Panel dimensions in screen space.
    pub(crate) size: Vec2,
    /// Background colour applied to the window skin so the UI matches the
    /// adapter's solid rectangle.
    pub(crate) background: Color,
    /// Status values listed at the top of the panel.
    pub(crate) hud: &'a HudPresentation,
    /// Candidate answer buttons.
    pub(crate) guesses: &'a [GuessButton],
}

/// Outcome of rendering the difficulty dialog during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct DialogUiResult {
    /// Choice whose button was pressed.
    pub(crate) action: Option<DialogAction>,
    /// Whether the dialog was closed without a choice.
    pub(crate) dismissed: bool,
}

const SETTING_BUTTONS: [(&str, SettingAdjustment); 10] = [
    ("Level +", SettingAdjustment::RaiseLevel),
    ("Level -", SettingAdjustment::LowerLevel),
    ("Time +", SettingAdjustment::MoreTime),
    ("Time -", SettingAdjustment::LessTime),
    ("Drift +", SettingAdjustment::FasterDrift),
    ("Drift -", SettingAdjustment::SlowerDrift),
    ("Size +", SettingAdjustment::LargerDots),
    ("Size -", SettingAdjustment::SmallerDots),
    ("Shapes", SettingAdjustment::NextShapeMode),
    ("Colors", SettingAdjustment::NextColorMode),
];

fn panel_skin(ui: &mut Ui, background: Color) -> Skin {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(background)
        .color_hovered(background)
        .color_clicked(background)
        .color_selected(background)
        .color_selected_hovered(background)
        .color_inactive(background)
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(16.0, 16.0, 16.0, 16.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 4.0, 4.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(70, 70, 70, 255))
        .color_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_clicked(Color::from_rgba(56, 56, 56, 255))
        .color_selected(Color::from_rgba(70, 70, 70, 255))
        .color_selected_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_inactive(Color::from_rgba(56, 56, 56, 200))
        .margin(RectOffset::new(8.0, 8.0, 6.0, 6.0))
        .build();
    skin.button_style = button_style;

    skin
}

/// Renders the control panel's interactive elements for the current frame.
pub(crate) fn draw_control_panel_ui(
    ui: &mut Ui,
    context: ControlPanelUiContext<'_>,
) -> ControlPanelUiResult {
    let skin = panel_skin(ui, context.background);
    ui.push_skin(&skin);

    let mut result = ControlPanelUiResult::default();
    let _ = ui.window(hash!("control_panel"), context.origin, context.size, |ui| {
        if let Some(message) = context.hud.message.as_deref() {
            ui.label(None, message);
        }
        for line in context.hud.lines() {
            ui.label(None, line.as_str());
        }

        if ui.button(None, context.hud.control.text()) {
            result.toggle_pause = true;
        }
        ui.same_line(0.0);
        if ui.button(None, "RESTART") {
            result.restart = true;
        }

        ui.separator();
        ui.label(None, "How many?");
        for (index, guess) in context.guesses.iter().enumerate() {
            if index % 4 != 0 {
                ui.same_line(0.0);
            }
            let caption = if guess.selected {
                format!("[{}]", guess.value)
            } else {
                guess.value.to_string()
            };
            if ui.button(None, caption.as_str()) && guess.enabled {
                result.guess = Some(guess.value);
            }
        }

        ui.separator();
        for (index, (caption, adjustment)) in SETTING_BUTTONS.iter().enumerate() {
            if index % 2 == 1 {
                ui.same_line(0.0);
            }
            if ui.button(None, *caption) {
                result.adjustment = Some(*adjustment);
            }
        }
    });

    ui.pop_skin();
    result
}

/// Renders the modal difficulty dialog at `origin`.
pub(crate) fn draw_dialog_ui(
    ui: &mut Ui,
    dialog: &DialogPresentation,
    origin: Vec2,
    size: Vec2,
    background: Color,
) -> DialogUiResult {
    let skin = panel_skin(ui, background);
    ui.push_skin(&skin);

    let mut result = DialogUiResult::default();
    let _ = ui.window(hash!("difficulty_dialog"), origin, size, |ui| {
        ui.label(None, dialog.title);
        ui.label(None, dialog.prompt);
        for option in &dialog.options {
            if option.enabled {
                if ui.button(None, option.label) {
                    result.action = Some(option.action);
                }
            } else {
                ui.label(None, &format!("{} (unavailable)", option.label));
            }
        }
        if ui.button(None, "CLOSE") {
            result.dismissed = true;
        }
    });

    ui.pop_skin();
    result
}
