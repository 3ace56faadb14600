//! Interactive session hosted by the macroquad backend.

use anyhow::{Context, Result};
use dot_estimate_core::{ColorMode, DotSize, EntityColor, ShapeMode, TimeLimit};
use dot_estimate_rendering::{
    Color, ControlPanelView, FrameInput, PlayfieldPresentation, Presentation, RenderingBackend,
    Scene, SettingAdjustment,
};
use dot_estimate_rendering_macroquad::MacroquadBackend;
use dot_estimate_system_session::GameController;

use crate::config::WindowConfig;

const PANEL_WIDTH: f32 = 280.0;
const DOT_SIZE_STEP: u32 = 5;

/// Opens the game window and blocks until it is closed.
pub(crate) fn run(mut controller: GameController, window: &WindowConfig) -> Result<()> {
    let playfield = PlayfieldPresentation::new(
        window.width,
        window.height,
        Color::from_rgb_u8(255, 255, 255),
    )
    .context("invalid window dimensions")?;
    let control_panel = ControlPanelView::new(PANEL_WIDTH, Color::from_rgb_u8(38, 42, 51));
    let scene = Scene::from_snapshot(playfield, control_panel, &controller.snapshot());
    let presentation = Presentation::new("Dot Estimate", Color::from_rgb_u8(18, 18, 18), scene);

    MacroquadBackend::new()
        .with_vsync(window.vsync)
        .with_show_fps(window.show_fps)
        .run(presentation, move |dt, input, scene| {
            apply_frame_input(&mut controller, input);
            controller.advance(dt);
            for event in controller.drain_events() {
                tracing::debug!(?event, "session event");
            }
            scene.populate(&controller.snapshot());
        })
}

/// Forwards one frame of player input to the controller.
pub(crate) fn apply_frame_input(controller: &mut GameController, input: FrameInput) {
    if input.restart {
        controller.restart();
    }
    if input.toggle_pause {
        controller.toggle_pause();
    }
    if let Some(choice) = input.promotion {
        controller.choose_promotion(choice);
    }
    if let Some(choice) = input.demotion {
        controller.choose_demotion(choice);
    }
    if input.dismiss_dialog {
        controller.dismiss_choice();
    }
    if let Some(guess) = input.guess {
        controller.submit_guess(Some(guess));
    }
    if let Some(adjustment) = input.adjustment {
        adjust(controller, adjustment);
    }
}

fn adjust(controller: &mut GameController, adjustment: SettingAdjustment) {
    let snapshot = controller.snapshot();
    let progress = snapshot.progress;
    let appearance = snapshot.appearance;

    match adjustment {
        SettingAdjustment::RaiseLevel => controller.raise_level(),
        SettingAdjustment::LowerLevel => controller.lower_level(),
        SettingAdjustment::NextShapeMode => {
            controller.set_shape_mode(next_shape_mode(appearance.shape_mode));
        }
        SettingAdjustment::NextColorMode => {
            controller.set_color_mode(next_color_mode(appearance.color_mode));
        }
        SettingAdjustment::FasterDrift => {
            controller.set_drift_speed(progress.drift_speed().faster());
        }
        SettingAdjustment::SlowerDrift => {
            controller.set_drift_speed(progress.drift_speed().slower());
        }
        SettingAdjustment::MoreTime => {
            controller.set_time_limit(progress.time_limit().lengthened());
        }
        SettingAdjustment::LessTime => {
            let shorter = progress.time_limit().shortened().unwrap_or(TimeLimit::MIN);
            controller.set_time_limit(shorter);
        }
        SettingAdjustment::LargerDots => {
            let size = appearance.dot_size.get().saturating_add(DOT_SIZE_STEP);
            controller.set_dot_size(DotSize::new(size));
        }
        SettingAdjustment::SmallerDots => {
            let size = appearance.dot_size.get().saturating_sub(DOT_SIZE_STEP);
            controller.set_dot_size(DotSize::new(size));
        }
    }
}

fn next_shape_mode(mode: ShapeMode) -> ShapeMode {
    match mode {
        ShapeMode::Circles => ShapeMode::Squares,
        ShapeMode::Squares => ShapeMode::Mixed,
        ShapeMode::Mixed => ShapeMode::Circles,
    }
}

fn next_color_mode(mode: ColorMode) -> ColorMode {
    match mode {
        ColorMode::Fixed(color) if color == EntityColor::BLUE => {
            ColorMode::Fixed(EntityColor::RED)
        }
        ColorMode::Fixed(color) if color == EntityColor::RED => {
            ColorMode::Fixed(EntityColor::BLACK)
        }
        ColorMode::Fixed(color) if color == EntityColor::BLACK => ColorMode::Mixed,
        ColorMode::Fixed(_) | ColorMode::Mixed => ColorMode::Fixed(EntityColor::BLUE),
    }
}
