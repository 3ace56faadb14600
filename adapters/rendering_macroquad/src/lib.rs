#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Dot Estimate.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The adapter uses Macroquad's immediate-mode UI module for the control
//! panel and the difficulty dialog. All UI-specific calls live inside the
//! local `ui` module to avoid leaking Macroquad UI types throughout the
//! renderer.

mod ui;

use self::ui::{
    draw_control_panel_ui, draw_dialog_ui, ControlPanelUiContext, ControlPanelUiResult,
    DialogUiResult,
};
use anyhow::Result;
use dot_estimate_core::Shape;
use dot_estimate_rendering::{
    Color, DialogAction, DotPresentation, FrameInput, Presentation, RenderingBackend, Scene,
    SettingAdjustment,
};
use glam::Vec2;
use macroquad::input::{is_key_pressed, KeyCode};
use macroquad::math::Vec2 as MacroquadVec2;
use std::{
    fmt,
    time::{Duration, Instant},
};

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanelInputState {
    latched: FrameInput,
}

impl ControlPanelInputState {
    /// Returns every latched press and clears the latches so each action fires once.
    pub fn take_frame_input(&mut self) -> FrameInput {
        std::mem::take(&mut self.latched)
    }

    /// Records a press of the start/pause/resume button.
    pub fn register_toggle_pause(&mut self) {
        self.latched.toggle_pause = true;
    }

    /// Records a press of the restart button.
    pub fn register_restart(&mut self) {
        self.latched.restart = true;
    }

    /// Records a press of a candidate button.
    pub fn register_guess(&mut self, value: u32) {
        self.latched.guess = Some(value);
    }

    /// Records a press of a setting button.
    pub fn register_adjustment(&mut self, adjustment: SettingAdjustment) {
        self.latched.adjustment = Some(adjustment);
    }

    /// Records a press of a dialog choice.
    pub fn register_dialog_action(&mut self, action: DialogAction) {
        self.latched = self.latched.with_dialog_action(action);
    }

    /// Records that the dialog was closed without a choice.
    pub fn register_dismiss(&mut self) {
        self.latched.dismiss_dialog = true;
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` quits the game loop.
    quit_requested: bool,
    /// `Space` starts, pauses or resumes.
    toggle_pause: bool,
    /// `R` restarts the session.
    restart: bool,
    /// `Backspace` closes the dialog without a choice.
    dismiss: bool,
    /// Digit keys pick a candidate, or a dialog button while a dialog is open.
    slot: Option<usize>,
    /// Setting shortcuts.
    adjustment: Option<SettingAdjustment>,
}

const SLOT_KEYS: [KeyCode; 8] = [
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
    KeyCode::Key7,
    KeyCode::Key8,
];

const ADJUSTMENT_KEYS: [(KeyCode, SettingAdjustment); 10] = [
    (KeyCode::Up, SettingAdjustment::RaiseLevel),
    (KeyCode::Down, SettingAdjustment::LowerLevel),
    (KeyCode::Right, SettingAdjustment::FasterDrift),
    (KeyCode::Left, SettingAdjustment::SlowerDrift),
    (KeyCode::M, SettingAdjustment::MoreTime),
    (KeyCode::L, SettingAdjustment::LessTime),
    (KeyCode::PageUp, SettingAdjustment::LargerDots),
    (KeyCode::PageDown, SettingAdjustment::SmallerDots),
    (KeyCode::S, SettingAdjustment::NextShapeMode),
    (KeyCode::C, SettingAdjustment::NextColorMode),
];

impl KeyboardShortcuts {
    fn poll() -> Self {
        let slot = SLOT_KEYS.iter().position(|key| is_key_pressed(*key));
        let adjustment = ADJUSTMENT_KEYS
            .iter()
            .find(|(key, _)| is_key_pressed(*key))
            .map(|(_, adjustment)| *adjustment);

        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            toggle_pause: is_key_pressed(KeyCode::Space),
            restart: is_key_pressed(KeyCode::R),
            dismiss: is_key_pressed(KeyCode::Backspace),
            slot,
            adjustment,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Frame timings summed over one reporting second.
#[derive(Debug, Default)]
struct FrameTimings {
    elapsed: Duration,
    frames: u32,
    update: Duration,
    render: Duration,
}

/// Averages printed by `--show-fps`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FrameReport {
    fps: f32,
    update: Duration,
    render: Duration,
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FPS: {:.1} | update: {:.2}ms render: {:.2}ms",
            self.fps,
            self.update.as_secs_f64() * 1_000.0,
            self.render.as_secs_f64() * 1_000.0,
        )
    }
}

impl FrameTimings {
    /// Adds one frame; yields the averages once a second of frames is in.
    fn record(&mut self, frame: Duration, update: Duration, render: Duration) -> Option<FrameReport> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.update += update;
        self.render += render;
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let report = FrameReport {
            fps: self.frames as f32 / self.elapsed.as_secs_f32(),
            update: self.update / self.frames,
            render: self.render / self.frames,
        };
        *self = Self::default();
        Some(report)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.total_width().round() as i32,
            window_height: scene.playfield.height.round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut timings = show_fps.then(FrameTimings::default);
            let mut control_panel_input = ControlPanelInputState::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let latched = control_panel_input.take_frame_input();
                let frame_input = gather_frame_input(&scene, latched, keyboard);

                let update_start = Instant::now();
                update_scene(frame_dt, frame_input, &mut scene);
                let update_duration = update_start.elapsed();

                let render_start = Instant::now();
                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                draw_playfield(&scene, &metrics);
                draw_dots(&scene.dots, &metrics);
                if let Some(banner) = scene.banner {
                    draw_banner(banner, &metrics);
                }

                {
                    let mut root_ui = macroquad::ui::root_ui();
                    let panel_background = to_macroquad_color(scene.control_panel.background);
                    macroquad::shapes::draw_rectangle(
                        metrics.panel_left,
                        0.0,
                        metrics.panel_width,
                        screen_height,
                        panel_background,
                    );
                    let ControlPanelUiResult {
                        toggle_pause,
                        restart,
                        guess,
                        adjustment,
                    } = draw_control_panel_ui(
                        &mut root_ui,
                        ControlPanelUiContext {
                            origin: MacroquadVec2::new(metrics.panel_left, 0.0),
                            size: MacroquadVec2::new(metrics.panel_width, screen_height),
                            background: panel_background,
                            hud: &scene.hud,
                            guesses: &scene.guesses,
                        },
                    );
                    if toggle_pause {
                        control_panel_input.register_toggle_pause();
                    }
                    if restart {
                        control_panel_input.register_restart();
                    }
                    if let Some(value) = guess {
                        control_panel_input.register_guess(value);
                    }
                    if let Some(adjustment) = adjustment {
                        control_panel_input.register_adjustment(adjustment);
                    }

                    if let Some(dialog) = &scene.dialog {
                        let (origin, size) = metrics.dialog_rect();
                        let DialogUiResult { action, dismissed } = draw_dialog_ui(
                            &mut root_ui,
                            dialog,
                            MacroquadVec2::new(origin.x, origin.y),
                            MacroquadVec2::new(size.x, size.y),
                            panel_background,
                        );
                        if let Some(action) = action {
                            control_panel_input.register_dialog_action(action);
                        }
                        if dismissed {
                            control_panel_input.register_dismiss();
                        }
                    }
                }

                let render_duration = render_start.elapsed();
                if let Some(report) = timings
                    .as_mut()
                    .and_then(|timings| timings.record(frame_dt, update_duration, render_duration))
                {
                    println!("{report}");
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Screen-space layout of the playfield and the side panel.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset: Vec2,
    playfield_size: Vec2,
    panel_left: f32,
    panel_width: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let panel_width = scene.control_panel.width.max(0.0).min(screen_width);
        let available_width = (screen_width - panel_width).max(0.0);
        let playfield = scene.playfield;
        let scale = (available_width / playfield.width)
            .min(screen_height / playfield.height)
            .max(0.0);

        let playfield_size = Vec2::new(playfield.width, playfield.height) * scale;
        let offset = Vec2::new(
            ((available_width - playfield_size.x) * 0.5).max(0.0),
            ((screen_height - playfield_size.y) * 0.5).max(0.0),
        );

        Self {
            scale,
            offset,
            playfield_size,
            panel_left: available_width,
            panel_width,
        }
    }

    fn to_screen(&self, playfield_position: Vec2) -> Vec2 {
        self.offset + playfield_position * self.scale
    }

    fn dialog_rect(&self) -> (Vec2, Vec2) {
        let size = Vec2::new(
            (self.playfield_size.x * 0.8).max(0.0),
            (self.playfield_size.y * 0.5).max(0.0),
        );
        let origin = self.offset + (self.playfield_size - size) * 0.5;
        (origin, size)
    }
}

fn gather_frame_input(scene: &Scene, latched: FrameInput, keyboard: KeyboardShortcuts) -> FrameInput {
    let mut input = FrameInput {
        toggle_pause: latched.toggle_pause || keyboard.toggle_pause,
        restart: latched.restart || keyboard.restart,
        dismiss_dialog: latched.dismiss_dialog || keyboard.dismiss,
        adjustment: latched.adjustment.or(keyboard.adjustment),
        ..latched
    };

    let Some(slot) = keyboard.slot else {
        return input;
    };

    if let Some(dialog) = &scene.dialog {
        if input.promotion.is_none() && input.demotion.is_none() {
            if let Some(option) = dialog.options.get(slot).filter(|option| option.enabled) {
                input = input.with_dialog_action(option.action);
            }
        }
    } else if input.guess.is_none() {
        input.guess = scene
            .guesses
            .get(slot)
            .filter(|button| button.enabled)
            .map(|button| button.value);
    }

    input
}

fn draw_playfield(scene: &Scene, metrics: &SceneMetrics) {
    macroquad::shapes::draw_rectangle(
        metrics.offset.x,
        metrics.offset.y,
        metrics.playfield_size.x,
        metrics.playfield_size.y,
        to_macroquad_color(scene.playfield.background),
    );
}

fn draw_dots(dots: &[DotPresentation], metrics: &SceneMetrics) {
    for dot in dots {
        let color = to_macroquad_color(dot.color);
        let extent = dot.extent * metrics.scale;
        match dot.shape {
            Shape::Circle => {
                let center = metrics.to_screen(dot.center());
                macroquad::shapes::draw_circle(center.x, center.y, extent * 0.5, color);
            }
            Shape::Square => {
                let origin = metrics.to_screen(dot.origin);
                macroquad::shapes::draw_rectangle(origin.x, origin.y, extent, extent, color);
            }
        }
    }
}

fn draw_banner(banner: &str, metrics: &SceneMetrics) {
    let font_size = (metrics.playfield_size.y * 0.06).max(12.0);
    let position = metrics.offset + Vec2::new(font_size, metrics.playfield_size.y * 0.5);
    let _ = macroquad::text::draw_text(
        banner,
        position.x,
        position.y,
        font_size,
        macroquad::color::BLACK,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
