#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Dot Estimate adapters.
//!
//! Backends never touch the session directly. Every frame they receive a
//! [`Scene`] rebuilt from a [`SessionSnapshot`], draw it, and report what the
//! player pressed through [`FrameInput`].

use anyhow::Result as AnyResult;
use dot_estimate_core::{
    ColorMode, DemotionChoice, DemotionOptions, DifficultyPhase, EntityColor, Position,
    PromotionChoice, PromotionOptions, SessionSnapshot, Shape, ShapeMode, WELCOME_BANNER,
};
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

impl From<EntityColor> for Color {
    fn from(color: EntityColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Player-facing setting nudged from the control panel or the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingAdjustment {
    /// Raise the level by one.
    RaiseLevel,
    /// Lower the level by one.
    LowerLevel,
    /// Advance to the next shape mode.
    NextShapeMode,
    /// Advance to the next color mode.
    NextColorMode,
    /// Speed drifting up by one step.
    FasterDrift,
    /// Slow drifting down by one step.
    SlowerDrift,
    /// Lengthen the countdown by one second.
    MoreTime,
    /// Shorten the countdown by one second.
    LessTime,
    /// Grow the rendered entities.
    LargerDots,
    /// Shrink the rendered entities.
    SmallerDots,
}

/// Actions captured by an adapter during a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether the start/pause/resume control was pressed.
    pub toggle_pause: bool,
    /// Whether a session restart was requested.
    pub restart: bool,
    /// Candidate picked by the player, if any.
    pub guess: Option<u32>,
    /// Promotion knob picked from the dialog, if any.
    pub promotion: Option<PromotionChoice>,
    /// Demotion knob picked from the dialog, if any.
    pub demotion: Option<DemotionChoice>,
    /// Whether the open dialog was closed without a choice.
    pub dismiss_dialog: bool,
    /// Setting nudged during this frame, if any.
    pub adjustment: Option<SettingAdjustment>,
}

impl FrameInput {
    /// Records a dialog button press.
    #[must_use]
    pub fn with_dialog_action(mut self, action: DialogAction) -> Self {
        match action {
            DialogAction::Promotion(choice) => self.promotion = Some(choice),
            DialogAction::Demotion(choice) => self.demotion = Some(choice),
        }
        self
    }

    /// Reports whether the frame carries no action at all.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Rectangular area the entities are drawn into.
///
/// Entity positions are percentages of the playfield, measured from its
/// top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayfieldPresentation {
    /// Width of the playfield in logical pixels.
    pub width: f32,
    /// Height of the playfield in logical pixels.
    pub height: f32,
    /// Color painted behind the entities.
    pub background: Color,
}

impl PlayfieldPresentation {
    /// Creates a new playfield descriptor.
    ///
    /// Returns an error when either dimension is not a positive finite number.
    pub fn new(
        width: f32,
        height: f32,
        background: Color,
    ) -> std::result::Result<Self, RenderingError> {
        let valid = |extent: f32| extent.is_finite() && extent > 0.0;
        if !valid(width) || !valid(height) {
            return Err(RenderingError::InvalidPlayfield { width, height });
        }

        Ok(Self {
            width,
            height,
            background,
        })
    }

    /// Converts a percent position into playfield pixels.
    #[must_use]
    pub fn project(&self, position: Position) -> Vec2 {
        Vec2::new(
            position.left() / 100.0 * self.width,
            position.top() / 100.0 * self.height,
        )
    }
}

/// Side panel hosting the HUD and the controls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPanelView {
    /// Width of the panel in logical pixels.
    pub width: f32,
    /// Color painted behind the panel.
    pub background: Color,
}

impl ControlPanelView {
    /// Creates a new control panel descriptor.
    #[must_use]
    pub const fn new(width: f32, background: Color) -> Self {
        Self { width, background }
    }
}

/// Entity positioned inside the playfield.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotPresentation {
    /// Top-left corner of the entity's bounding square in playfield pixels.
    pub origin: Vec2,
    /// Side length of the bounding square in playfield pixels.
    pub extent: f32,
    /// Shape drawn inside the bounding square.
    pub shape: Shape,
    /// Fill color.
    pub color: Color,
}

impl DotPresentation {
    /// Center of the bounding square.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.origin + Vec2::splat(self.extent * 0.5)
    }
}

/// Label of the single start/pause/resume control.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ControlLabel {
    /// No session has been started yet.
    #[default]
    Start,
    /// A round is running.
    Pause,
    /// The session is suspended.
    Resume,
}

impl ControlLabel {
    /// Derives the label from the session state.
    #[must_use]
    pub const fn for_snapshot(snapshot: &SessionSnapshot) -> Self {
        if !snapshot.session_started {
            Self::Start
        } else if snapshot.paused {
            Self::Resume
        } else {
            Self::Pause
        }
    }

    /// Text shown on the control.
    #[must_use]
    pub const fn text(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Pause => "PAUSE",
            Self::Resume => "RESUME",
        }
    }
}

/// Status values shown next to the playfield.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HudPresentation {
    /// Current level.
    pub level: u32,
    /// Smallest dot count of the current range.
    pub min_dots: u32,
    /// Largest dot count of the current range.
    pub max_dots: u32,
    /// Countdown length in seconds.
    pub time_limit: u32,
    /// Seconds left on the countdown.
    pub remaining_seconds: u32,
    /// Current drift speed.
    pub drift_speed: f32,
    /// Correct answers this session.
    pub score: u32,
    /// Answered rounds this session.
    pub total: u32,
    /// Feedback for the last answered round.
    pub message: Option<String>,
    /// Label of the start/pause/resume control.
    pub control: ControlLabel,
    /// Active shape mode.
    pub shape_mode: ShapeMode,
    /// Active color mode.
    pub color_mode: ColorMode,
    /// Rendered entity size in pixels.
    pub dot_size: u32,
}

impl HudPresentation {
    /// Extracts the HUD values from a session snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let progress = snapshot.progress;
        let range = progress.dot_range();

        Self {
            level: progress.level().get(),
            min_dots: range.min(),
            max_dots: range.max(),
            time_limit: progress.time_limit().seconds(),
            remaining_seconds: snapshot.remaining_seconds,
            drift_speed: progress.drift_speed().get(),
            score: progress.session_score(),
            total: progress.session_total(),
            message: snapshot.message.map(|message| message.to_string()),
            control: ControlLabel::for_snapshot(snapshot),
            shape_mode: snapshot.appearance.shape_mode,
            color_mode: snapshot.appearance.color_mode,
            dot_size: snapshot.appearance.dot_size.get(),
        }
    }

    /// Status lines in display order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Time left: {}s", self.remaining_seconds),
            format!("Score: {} / {}", self.score, self.total),
            format!(
                "Level {} ({}-{} dots)",
                self.level, self.min_dots, self.max_dots
            ),
            format!("Time limit: {}s", self.time_limit),
            format!("Drift: {:.1}", self.drift_speed),
            format!("Shapes: {}", self.shape_mode),
            format!("Colors: {}", self.color_mode),
            format!("Dot size: {}px", self.dot_size),
        ]
    }
}

/// One candidate answer button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GuessButton {
    /// Candidate count submitted when pressed.
    pub value: u32,
    /// Whether this candidate was the player's answer.
    pub selected: bool,
    /// Whether pressing the button is accepted.
    pub enabled: bool,
}

/// Choice submitted by a dialog button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DialogAction {
    /// Resolves a pending promotion.
    Promotion(PromotionChoice),
    /// Resolves a pending demotion.
    Demotion(DemotionChoice),
}

/// Button shown inside a difficulty dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DialogOption {
    /// Button caption.
    pub label: &'static str,
    /// Choice submitted when pressed.
    pub action: DialogAction,
    /// Whether the button can be pressed.
    pub enabled: bool,
}

/// Modal dialog offered between rounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogPresentation {
    /// Dialog heading.
    pub title: &'static str,
    /// Question shown above the buttons.
    pub prompt: &'static str,
    /// Buttons in display order.
    pub options: Vec<DialogOption>,
}

impl DialogPresentation {
    /// Dialog shown after a perfect streak window.
    #[must_use]
    pub fn promotion(options: PromotionOptions) -> Self {
        let option = |label, choice| DialogOption {
            label,
            action: DialogAction::Promotion(choice),
            enabled: options.allows(choice),
        };

        Self {
            title: "Select Difficulty",
            prompt: "Choose your challenge: More dots, less time, or faster drifting?",
            options: vec![
                option("MORE DOTS", PromotionChoice::MoreDots),
                option("LESS TIME", PromotionChoice::LessTime),
                option("FASTER DRIFTING", PromotionChoice::FasterDrift),
            ],
        }
    }

    /// Dialog shown after a weak streak window.
    #[must_use]
    pub fn demotion(options: DemotionOptions) -> Self {
        let option = |label, choice| DialogOption {
            label,
            action: DialogAction::Demotion(choice),
            enabled: options.allows(choice),
        };

        Self {
            title: "Adjust Difficulty",
            prompt: "Choose your challenge: Down a level, more time, or slower drifting?",
            options: vec![
                option("DOWN A LEVEL", DemotionChoice::DownLevel),
                option("MORE TIME", DemotionChoice::MoreTime),
                option("SLOWER DRIFTING", DemotionChoice::SlowerDrift),
            ],
        }
    }

    /// Dialog matching the pending difficulty choice, if any.
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Option<Self> {
        match snapshot.phase {
            DifficultyPhase::Active => None,
            DifficultyPhase::AwaitingPromotionChoice => {
                snapshot.promotion_options.map(Self::promotion)
            }
            DifficultyPhase::AwaitingDemotionChoice => {
                snapshot.demotion_options.map(Self::demotion)
            }
        }
    }
}

/// Everything a backend draws during one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Area the entities are drawn into.
    pub playfield: PlayfieldPresentation,
    /// Panel hosting the HUD and the controls.
    pub control_panel: ControlPanelView,
    /// Greeting shown until the first session starts.
    pub banner: Option<&'static str>,
    /// Entities of the current round projected into the playfield.
    pub dots: Vec<DotPresentation>,
    /// Status values.
    pub hud: HudPresentation,
    /// Candidate answer buttons.
    pub guesses: Vec<GuessButton>,
    /// Pending difficulty dialog, if any.
    pub dialog: Option<DialogPresentation>,
}

impl Scene {
    /// Creates an empty scene showing the welcome banner.
    #[must_use]
    pub fn new(playfield: PlayfieldPresentation, control_panel: ControlPanelView) -> Self {
        Self {
            playfield,
            control_panel,
            banner: Some(WELCOME_BANNER),
            dots: Vec::new(),
            hud: HudPresentation::default(),
            guesses: Vec::new(),
            dialog: None,
        }
    }

    /// Builds a scene directly from a snapshot.
    #[must_use]
    pub fn from_snapshot(
        playfield: PlayfieldPresentation,
        control_panel: ControlPanelView,
        snapshot: &SessionSnapshot,
    ) -> Self {
        let mut scene = Self::new(playfield, control_panel);
        scene.populate(snapshot);
        scene
    }

    /// Replaces the scene contents with the state captured in `snapshot`.
    pub fn populate(&mut self, snapshot: &SessionSnapshot) {
        self.banner = (!snapshot.session_started).then_some(WELCOME_BANNER);

        let extent = snapshot.appearance.dot_size.get() as f32;
        self.dots.clear();
        self.dots
            .extend(snapshot.entities.iter().map(|entity| DotPresentation {
                origin: self.playfield.project(entity.position),
                extent,
                shape: entity.shape,
                color: Color::from(entity.color),
            }));

        self.hud = HudPresentation::from_snapshot(snapshot);

        self.guesses.clear();
        self.guesses
            .extend(snapshot.guess_candidates.iter().map(|&value| GuessButton {
                value,
                selected: snapshot.chosen_guess == Some(value),
                enabled: snapshot.guesses_enabled,
            }));

        self.dialog = DialogPresentation::from_snapshot(snapshot);
    }

    /// Width of the playfield plus the control panel.
    #[must_use]
    pub fn total_width(&self) -> f32 {
        self.playfield.width + self.control_panel.width.max(0.0)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Dot Estimate scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and rebuilds the scene before it is
    /// drawn. The frame delta doubles as the session clock.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The playfield needs positive finite dimensions.
    InvalidPlayfield {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlayfield { width, height } => {
                write!(
                    f,
                    "playfield dimensions must be positive (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
