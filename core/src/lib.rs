#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dot Estimate engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! All timing is expressed in simulated time. Adapters advance the clock with
//! [`Command::Tick`]; the countdown and drift cadences are derived from the
//! resulting [`Event::TimeAdvanced`] stream through [`Schedule`] handles.

use std::{fmt, ops::RangeInclusive, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Dot Estimate.";

/// Period between two countdown decrements.
pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Period between two drift steps (20 Hz).
pub const DRIFT_PERIOD: Duration = Duration::from_millis(50);

/// Delay between a resolved round and the start of the next one.
///
/// Applies both after an accepted guess and after a timeout.
pub const NEXT_ROUND_DELAY: Duration = Duration::from_millis(250);

/// Number of decisions evaluated together by the difficulty state machine.
pub const STREAK_WINDOW: u32 = 5;

/// Upper bound on the number of guess candidates offered in a round.
pub const MAX_GUESS_CANDIDATES: u32 = 8;

/// Exclusive upper bound, in viewport percent, of freshly generated positions.
pub const SPAWN_EXTENT: f32 = 90.0;

/// Vertical reflection bound for drifting entities, in viewport percent.
pub const TOP_BOUND: f32 = 90.0;

/// Horizontal reflection bound for drifting entities, in viewport percent.
pub const LEFT_BOUND: f32 = 94.0;

/// Amount by which a difficulty choice changes the drift speed.
pub const DRIFT_SPEED_STEP: f32 = 0.5;

/// Maximum drift speed reachable through choices or overrides.
pub const MAX_DRIFT_SPEED: f32 = 4.0;

/// Largest time limit accepted from a direct configuration override.
pub const MAX_TIME_LIMIT_OVERRIDE: u32 = 15;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts or restarts a session, resetting the session counters.
    StartSession,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Replaces the current round wholesale with a freshly generated one.
    BeginRound {
        /// Entities shown to the player; their count is the true count.
        entities: Vec<Entity>,
        /// Candidate answers offered to the player.
        guess_window: GuessWindow,
    },
    /// Submits the player's answer for a round.
    SubmitGuess {
        /// Round the answer was given for.
        round: RoundId,
        /// Chosen candidate, or `None` when the player gave no usable answer.
        guess: Option<u32>,
    },
    /// Countdown callback fired once per elapsed second of a running round.
    CountdownElapsed {
        /// Round the countdown schedule was armed for.
        round: RoundId,
    },
    /// Drift callback carrying the advanced entity placements.
    AdvanceDrift {
        /// Round the drift schedule was armed for.
        round: RoundId,
        /// New placement of every drifting entity.
        placements: Vec<DriftPlacement>,
    },
    /// One-shot transition callback requesting the round after `after`.
    RequestNextRound {
        /// Round whose resolution scheduled the transition.
        after: RoundId,
    },
    /// Suspends the running round.
    Pause,
    /// Resumes a paused round.
    Resume,
    /// Resolves a pending promotion with the provided choice.
    ChoosePromotion {
        /// Knob selected by the player.
        choice: PromotionChoice,
    },
    /// Resolves a pending demotion with the provided choice.
    ChooseDemotion {
        /// Knob selected by the player.
        choice: DemotionChoice,
    },
    /// Closes a pending promotion or demotion dialog without changing anything.
    DismissChoice,
    /// Changes how entity shapes are chosen.
    SetShapeMode {
        /// Shape mode that should become active.
        mode: ShapeMode,
    },
    /// Changes how entity colors are chosen.
    SetColorMode {
        /// Color mode that should become active.
        mode: ColorMode,
    },
    /// Re-skins the entities of the live round after an appearance change.
    RestyleEntities {
        /// Round the styles were computed for.
        round: RoundId,
        /// Replacement style per entity.
        styles: Vec<EntityStyle>,
    },
    /// Changes the rendered entity size. Cosmetic only.
    SetDotSize {
        /// Requested size.
        size: DotSize,
    },
    /// Overrides the countdown length used from the next round on.
    SetTimeLimit {
        /// Requested time limit.
        time_limit: TimeLimit,
    },
    /// Overrides the drift speed.
    SetDriftSpeed {
        /// Requested drift speed.
        speed: DriftSpeed,
    },
    /// Overrides the level, re-deriving the dot range.
    SetLevel {
        /// Requested level.
        level: Level,
    },
    /// Overrides the dot range without touching the level.
    SetDotRange {
        /// Requested lower bound.
        min: u32,
        /// Requested upper bound.
        max: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a session started and its counters were reset.
    SessionStarted {
        /// Progress at the start of the session.
        progress: PlayerProgress,
    },
    /// Asks the controller to generate and begin a new round.
    RoundRequested,
    /// Confirms that a new round replaced the previous one.
    RoundStarted {
        /// Identifier assigned to the round.
        round: RoundId,
        /// Number of entities shown.
        true_count: u32,
        /// Candidate answers offered to the player.
        guess_window: GuessWindow,
        /// Countdown length for the round.
        time_limit: TimeLimit,
        /// Whether the round has moving entities.
        drifting: bool,
    },
    /// Reports that a `BeginRound` command was refused.
    RoundRejected {
        /// Specific reason the round was refused.
        reason: RoundRejection,
    },
    /// Reports the countdown value after a decrement.
    CountdownAdvanced {
        /// Round whose countdown advanced.
        round: RoundId,
        /// Seconds left before the round times out.
        remaining_seconds: u32,
    },
    /// Announces that a round ran out of time without an answer.
    RoundTimedOut {
        /// Round that timed out.
        round: RoundId,
    },
    /// Confirms that the player's answer was accepted and scored.
    GuessAccepted {
        /// Round the answer belongs to.
        round: RoundId,
        /// Candidate chosen by the player.
        guess: u32,
        /// Outcome of the comparison with the true count.
        decision: Decision,
    },
    /// Confirms that an empty answer resolved the round without scoring.
    GuessSkipped {
        /// Round the empty answer belongs to.
        round: RoundId,
    },
    /// Reports that an answer arrived for a round that no longer accepts one.
    GuessIgnored {
        /// Round named by the late or duplicate answer.
        round: RoundId,
    },
    /// Reports the streak window after a decision was counted.
    DecisionRecorded {
        /// Outcome that was counted.
        decision: Decision,
        /// Tally of the current streak window after counting.
        streak: StreakTally,
    },
    /// Reports the session score after a scored answer.
    ScoreChanged {
        /// Number of correct answers in the session.
        score: u32,
        /// Number of scored answers in the session.
        total: u32,
    },
    /// Announces that a perfect streak window awaits a promotion choice.
    PromotionOffered {
        /// Knobs the player may pick from.
        options: PromotionOptions,
    },
    /// Announces that a weak streak window lowered the level.
    Demoted {
        /// Level before the demotion.
        from: Level,
        /// Level after the demotion.
        to: Level,
    },
    /// Announces that the player may ease the difficulty further.
    DemotionOffered {
        /// Knobs the player may pick from.
        options: DemotionOptions,
    },
    /// Reports that a choice command could not be applied.
    ChoiceRejected {
        /// Specific reason the choice was refused.
        reason: ChoiceRejection,
    },
    /// Announces that a pending choice was resolved and play continues.
    DifficultyResumed,
    /// Confirms that the level changed and the dot range was re-derived.
    LevelChanged {
        /// Level now in effect.
        level: Level,
        /// Dot range derived from the level.
        range: DotRange,
    },
    /// Confirms that the dot range was overridden.
    DotRangeChanged {
        /// Dot range now in effect.
        range: DotRange,
    },
    /// Confirms that the countdown length changed.
    TimeLimitChanged {
        /// Time limit now in effect.
        time_limit: TimeLimit,
    },
    /// Reports that the time limit could not shrink below one second.
    TimeLimitAtFloor,
    /// Confirms that the drift speed changed.
    DriftSpeedChanged {
        /// Drift speed now in effect.
        speed: DriftSpeed,
    },
    /// Reports that a configuration command was refused.
    ConfigurationRejected {
        /// Specific reason the configuration was refused.
        reason: ConfigurationError,
    },
    /// Confirms that the running round was suspended.
    Paused {
        /// Round that was suspended.
        round: RoundId,
    },
    /// Confirms that the suspended round resumed.
    Resumed {
        /// Round that resumed.
        round: RoundId,
    },
    /// Asks the round timer to request the next round after a delay.
    NextRoundScheduled {
        /// Round whose resolution triggered the transition.
        after: RoundId,
        /// Delay before the next round is requested.
        delay: Duration,
    },
    /// Confirms that drifting entities moved.
    EntitiesDrifted {
        /// Round whose entities moved.
        round: RoundId,
    },
    /// Confirms that the appearance configuration changed.
    AppearanceChanged {
        /// Appearance now in effect.
        appearance: Appearance,
        /// Whether the shape or color mode changed, invalidating live styles.
        styles_invalidated: bool,
    },
    /// Confirms that the entities of the live round were re-skinned.
    EntitiesRestyled {
        /// Round whose entities were re-skinned.
        round: RoundId,
    },
}

/// Reasons a `BeginRound` command can be refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RoundRejection {
    /// No session has been started yet.
    #[error("no session is running")]
    SessionNotStarted,
    /// A promotion or demotion choice is still pending.
    #[error("a difficulty choice is pending")]
    AwaitingChoice,
    /// The guess window does not contain the number of entities.
    #[error("guess window {window:?} does not contain the true count {true_count}")]
    WindowMissesCount {
        /// Number of entities in the rejected round.
        true_count: u32,
        /// Window that was offered.
        window: GuessWindow,
    },
}

/// Reasons a configuration command can be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The lower bound of a dot range exceeded its upper bound.
    #[error("minimum dot count {min} exceeds maximum {max}")]
    InvertedRange {
        /// Requested lower bound.
        min: u32,
        /// Requested upper bound.
        max: u32,
    },
}

/// Reasons a difficulty choice can be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ChoiceRejection {
    /// A promotion choice arrived while no promotion was pending.
    #[error("no promotion choice is pending")]
    NotAwaitingPromotion,
    /// A demotion choice arrived while no demotion was pending.
    #[error("no demotion choice is pending")]
    NotAwaitingDemotion,
    /// A dismissal arrived while no choice was pending.
    #[error("no difficulty choice is pending")]
    NothingPending,
    /// The requested promotion knob is disabled.
    #[error("promotion choice {0:?} is unavailable")]
    PromotionUnavailable(PromotionChoice),
    /// The requested demotion knob is disabled.
    #[error("demotion choice {0:?} is unavailable")]
    DemotionUnavailable(DemotionChoice),
}

/// Errors produced when parsing textual mode names.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ModeParseError {
    /// The text does not name a shape mode.
    #[error("unknown shape mode `{0}` (expected circles, squares or mixed)")]
    UnknownShapeMode(String),
    /// The text does not name a color mode.
    #[error("unknown color mode `{0}` (expected red, blue, black, mixed or #rrggbb)")]
    UnknownColorMode(String),
    /// The text does not name a demotion policy.
    #[error("unknown demotion policy `{0}` (expected offer or immediate)")]
    UnknownDemotionPolicy(String),
}

/// Unique identifier assigned to a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoundId(u64);

impl RoundId {
    /// Creates a new round identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Identifier of the round that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Identifier of an entity within its round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of an entity expressed in percent of the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    top: f32,
    left: f32,
}

impl Position {
    /// Creates a new position from viewport percentages.
    #[must_use]
    pub const fn new(top: f32, left: f32) -> Self {
        Self { top, left }
    }

    /// Distance from the top edge in viewport percent.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.top
    }

    /// Distance from the left edge in viewport percent.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.left
    }
}

/// Shape used to draw an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// Round dot.
    Circle,
    /// Axis-aligned square.
    Square,
}

/// 24-bit color applied to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl EntityColor {
    /// Pure red.
    pub const RED: Self = Self::from_rgb(0xff, 0x00, 0x00);
    /// Pure blue.
    pub const BLUE: Self = Self::from_rgb(0x00, 0x00, 0xff);
    /// Black.
    pub const BLACK: Self = Self::from_rgb(0x00, 0x00, 0x00);

    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Creates a color from the low 24 bits of `value` laid out as `0xRRGGBB`.
    #[must_use]
    pub const fn from_u24(value: u32) -> Self {
        Self {
            red: ((value >> 16) & 0xff) as u8,
            green: ((value >> 8) & 0xff) as u8,
            blue: (value & 0xff) as u8,
        }
    }

    /// Packs the color into `0xRRGGBB`.
    #[must_use]
    pub const fn to_u24(&self) -> u32 {
        ((self.red as u32) << 16) | ((self.green as u32) << 8) | self.blue as u32
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

impl fmt::Display for EntityColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl FromStr for EntityColor {
    type Err = ModeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value
            .strip_prefix('#')
            .filter(|digits| digits.len() == 6)
            .ok_or_else(|| ModeParseError::UnknownColorMode(value.to_owned()))?;
        u32::from_str_radix(digits, 16)
            .map(Self::from_u24)
            .map_err(|_| ModeParseError::UnknownColorMode(value.to_owned()))
    }
}

/// Direction of travel along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisSign {
    /// Toward decreasing coordinates.
    Negative,
    /// Toward increasing coordinates.
    Positive,
}

impl AxisSign {
    /// Numeric factor applied to displacements.
    #[must_use]
    pub const fn factor(self) -> f32 {
        match self {
            Self::Negative => -1.0,
            Self::Positive => 1.0,
        }
    }

    /// Opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Negative => Self::Positive,
            Self::Positive => Self::Negative,
        }
    }
}

/// Motion descriptor of a drifting entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    sign_x: AxisSign,
    sign_y: AxisSign,
    magnitude: f32,
}

impl Drift {
    /// Creates a drift descriptor. `magnitude` is expected in `[0, 1)`.
    #[must_use]
    pub const fn new(sign_x: AxisSign, sign_y: AxisSign, magnitude: f32) -> Self {
        Self {
            sign_x,
            sign_y,
            magnitude,
        }
    }

    /// Horizontal direction of travel.
    #[must_use]
    pub const fn sign_x(&self) -> AxisSign {
        self.sign_x
    }

    /// Vertical direction of travel.
    #[must_use]
    pub const fn sign_y(&self) -> AxisSign {
        self.sign_y
    }

    /// Per-entity speed factor.
    #[must_use]
    pub const fn magnitude(&self) -> f32 {
        self.magnitude
    }

    /// Returns a copy travelling in the provided directions.
    #[must_use]
    pub const fn with_signs(self, sign_x: AxisSign, sign_y: AxisSign) -> Self {
        Self {
            sign_x,
            sign_y,
            magnitude: self.magnitude,
        }
    }
}

/// Visual entity counted by the player.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Identifier of the entity within its round.
    pub id: EntityId,
    /// Current location in viewport percent.
    pub position: Position,
    /// Shape used to draw the entity.
    pub shape: Shape,
    /// Color used to draw the entity.
    pub color: EntityColor,
    /// Motion descriptor, if the entity may drift.
    pub drift: Option<Drift>,
}

/// New placement of a drifting entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriftPlacement {
    /// Entity that moved.
    pub entity: EntityId,
    /// Location after the drift step.
    pub position: Position,
    /// Motion descriptor after boundary reflection.
    pub drift: Drift,
}

/// Replacement appearance of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityStyle {
    /// Entity that is re-skinned.
    pub entity: EntityId,
    /// Shape to apply.
    pub shape: Shape,
    /// Color to apply.
    pub color: EntityColor,
}

/// Strategy used to pick entity shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ShapeMode {
    /// Every entity is a circle.
    #[default]
    Circles,
    /// Every entity is a square.
    Squares,
    /// Each entity flips a fair coin between circle and square.
    Mixed,
}

impl fmt::Display for ShapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Circles => "circles",
            Self::Squares => "squares",
            Self::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

impl FromStr for ShapeMode {
    type Err = ModeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "circles" | "dots" => Ok(Self::Circles),
            "squares" => Ok(Self::Squares),
            "mixed" | "both" => Ok(Self::Mixed),
            _ => Err(ModeParseError::UnknownShapeMode(value.to_owned())),
        }
    }
}

impl TryFrom<String> for ShapeMode {
    type Error = ModeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShapeMode> for String {
    fn from(mode: ShapeMode) -> Self {
        mode.to_string()
    }
}

/// Strategy used to pick entity colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColorMode {
    /// Every entity shares one color.
    Fixed(EntityColor),
    /// Each entity receives an independent random 24-bit color.
    Mixed,
}

impl Default for ColorMode {
    fn default() -> Self {
        Self::Fixed(EntityColor::BLUE)
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(color) if *color == EntityColor::RED => f.write_str("red"),
            Self::Fixed(color) if *color == EntityColor::BLUE => f.write_str("blue"),
            Self::Fixed(color) if *color == EntityColor::BLACK => f.write_str("black"),
            Self::Fixed(color) => write!(f, "{color}"),
            Self::Mixed => f.write_str("mixed"),
        }
    }
}

impl FromStr for ColorMode {
    type Err = ModeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "red" => Ok(Self::Fixed(EntityColor::RED)),
            "blue" => Ok(Self::Fixed(EntityColor::BLUE)),
            "black" => Ok(Self::Fixed(EntityColor::BLACK)),
            "mixed" | "many" => Ok(Self::Mixed),
            _ => normalized
                .parse::<EntityColor>()
                .map(Self::Fixed)
                .map_err(|_| ModeParseError::UnknownColorMode(value.to_owned())),
        }
    }
}

impl TryFrom<String> for ColorMode {
    type Error = ModeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColorMode> for String {
    fn from(mode: ColorMode) -> Self {
        mode.to_string()
    }
}

/// Rendered entity size in pixels, clamped to `10..=150`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct DotSize(u32);

impl DotSize {
    /// Smallest accepted size.
    pub const MIN: u32 = 10;
    /// Largest accepted size.
    pub const MAX: u32 = 150;

    /// Creates a size, clamping it into the accepted bounds.
    #[must_use]
    pub const fn new(pixels: u32) -> Self {
        if pixels < Self::MIN {
            Self(Self::MIN)
        } else if pixels > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(pixels)
        }
    }

    /// Size in pixels.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl Default for DotSize {
    fn default() -> Self {
        Self::new(75)
    }
}

impl From<u32> for DotSize {
    fn from(pixels: u32) -> Self {
        Self::new(pixels)
    }
}

impl From<DotSize> for u32 {
    fn from(size: DotSize) -> Self {
        size.get()
    }
}

/// Cosmetic configuration applied to generated entities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    /// How shapes are chosen.
    pub shape_mode: ShapeMode,
    /// How colors are chosen.
    pub color_mode: ColorMode,
    /// Rendered entity size.
    pub dot_size: DotSize,
}

/// Difficulty level; always at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Level(u32);

impl Level {
    /// Lowest reachable level.
    pub const MIN: Self = Self(1);

    /// Creates a level, raising zero to [`Level::MIN`].
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 {
            Self::MIN
        } else {
            Self(value)
        }
    }

    /// Numeric representation of the level.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Level directly above this one.
    #[must_use]
    pub const fn raised(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Level directly below this one, floored at [`Level::MIN`].
    #[must_use]
    pub const fn lowered(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }

    /// Whether the level cannot be lowered further.
    #[must_use]
    pub const fn is_floor(&self) -> bool {
        self.0 <= Self::MIN.0
    }

    /// Dot range derived from the level.
    #[must_use]
    pub const fn dot_range(&self) -> DotRange {
        DotRange::for_level(*self)
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::new(3)
    }
}

impl From<u32> for Level {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Level> for u32 {
    fn from(level: Level) -> Self {
        level.get()
    }
}

/// Inclusive range of entity counts a round may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DotRange {
    min: u32,
    max: u32,
}

impl DotRange {
    /// Creates a range, returning `None` when `min` exceeds `max`.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Option<Self> {
        if min > max {
            None
        } else {
            Some(Self { min, max })
        }
    }

    /// Range derived from a level: `min = level`, `max = 2·level` above
    /// level three and `level + 4` otherwise.
    #[must_use]
    pub const fn for_level(level: Level) -> Self {
        let min = level.get();
        let max = if min > 3 {
            min.saturating_mul(2)
        } else {
            min.saturating_add(4)
        };
        Self { min, max }
    }

    /// Smallest entity count.
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Largest entity count.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Number of distinct counts contained in the range.
    #[must_use]
    pub const fn span(&self) -> u32 {
        (self.max - self.min).saturating_add(1)
    }

    /// Reports whether `count` lies inside the range.
    #[must_use]
    pub const fn contains(&self, count: u32) -> bool {
        count >= self.min && count <= self.max
    }

    /// Range expressed as a standard inclusive range.
    #[must_use]
    pub const fn as_range(&self) -> RangeInclusive<u32> {
        self.min..=self.max
    }
}

/// Countdown length in whole seconds; always at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct TimeLimit(u32);

impl TimeLimit {
    /// Shortest reachable time limit.
    pub const MIN: Self = Self(1);

    /// Creates a time limit, raising zero to [`TimeLimit::MIN`].
    #[must_use]
    pub const fn from_secs(seconds: u32) -> Self {
        if seconds == 0 {
            Self::MIN
        } else {
            Self(seconds)
        }
    }

    /// Length in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u32 {
        self.0
    }

    /// One second shorter, or `None` at the floor.
    #[must_use]
    pub const fn shortened(self) -> Option<Self> {
        if self.0 <= Self::MIN.0 {
            None
        } else {
            Some(Self(self.0 - 1))
        }
    }

    /// One second longer.
    #[must_use]
    pub const fn lengthened(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for TimeLimit {
    fn default() -> Self {
        Self::from_secs(7)
    }
}

impl From<u32> for TimeLimit {
    fn from(seconds: u32) -> Self {
        Self::from_secs(seconds)
    }
}

impl From<TimeLimit> for u32 {
    fn from(limit: TimeLimit) -> Self {
        limit.seconds()
    }
}

/// Drift speed in viewport percent per drift step, clamped to `[0, 4]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct DriftSpeed(f32);

impl DriftSpeed {
    /// Entities do not move.
    pub const OFF: Self = Self(0.0);
    /// Fastest reachable speed.
    pub const MAX: Self = Self(MAX_DRIFT_SPEED);

    /// Creates a speed, clamping it into `[0, 4]`. NaN maps to zero.
    #[must_use]
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::OFF;
        }
        Self(value.clamp(0.0, MAX_DRIFT_SPEED))
    }

    /// Speed value.
    #[must_use]
    pub const fn get(&self) -> f32 {
        self.0
    }

    /// Whether entities move at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.0 > 0.0
    }

    /// Whether the speed sits at the cap.
    #[must_use]
    pub fn is_at_max(&self) -> bool {
        self.0 >= MAX_DRIFT_SPEED
    }

    /// One step faster, capped at the maximum.
    #[must_use]
    pub fn faster(self) -> Self {
        Self::new(self.0 + DRIFT_SPEED_STEP)
    }

    /// One step slower, floored at zero.
    #[must_use]
    pub fn slower(self) -> Self {
        Self::new(self.0 - DRIFT_SPEED_STEP)
    }
}

impl From<f32> for DriftSpeed {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<DriftSpeed> for f32 {
    fn from(speed: DriftSpeed) -> Self {
        speed.get()
    }
}

/// Outcome of a single round from the player's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    /// The guess matched the true count.
    Correct,
    /// The guess missed the true count.
    Incorrect,
    /// The round ended without a usable guess.
    NoAnswer,
}

impl Decision {
    /// Whether the decision counts toward the correct side of a streak.
    #[must_use]
    pub const fn is_correct(&self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// Correct and incorrect decisions counted in the current streak window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreakTally {
    correct: u32,
    incorrect: u32,
}

impl StreakTally {
    /// Creates a tally from explicit counts.
    #[must_use]
    pub const fn new(correct: u32, incorrect: u32) -> Self {
        Self { correct, incorrect }
    }

    /// Correct decisions in the window.
    #[must_use]
    pub const fn correct(&self) -> u32 {
        self.correct
    }

    /// Incorrect decisions in the window, including unanswered rounds.
    #[must_use]
    pub const fn incorrect(&self) -> u32 {
        self.incorrect
    }

    /// Number of decisions counted so far.
    #[must_use]
    pub const fn decisions(&self) -> u32 {
        self.correct + self.incorrect
    }

    /// Tally after counting one more decision.
    #[must_use]
    pub const fn counted(self, decision: Decision) -> Self {
        if decision.is_correct() {
            Self {
                correct: self.correct.saturating_add(1),
                incorrect: self.incorrect,
            }
        } else {
            Self {
                correct: self.correct,
                incorrect: self.incorrect.saturating_add(1),
            }
        }
    }

    /// Whether the window holds a multiple of [`STREAK_WINDOW`] decisions.
    #[must_use]
    pub const fn is_window_complete(&self) -> bool {
        let decisions = self.decisions();
        decisions > 0 && decisions % STREAK_WINDOW == 0
    }
}

/// Session-wide difficulty and score state.
///
/// The dot range is re-derived from the level on every level change; it can
/// diverge from the level only through an explicit range override.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerProgress {
    level: Level,
    time_limit: TimeLimit,
    drift_speed: DriftSpeed,
    range: DotRange,
    streak: StreakTally,
    session_score: u32,
    session_total: u32,
}

impl PlayerProgress {
    /// Creates progress for a fresh session.
    #[must_use]
    pub const fn new(level: Level, time_limit: TimeLimit, drift_speed: DriftSpeed) -> Self {
        Self {
            level,
            time_limit,
            drift_speed,
            range: DotRange::for_level(level),
            streak: StreakTally::new(0, 0),
            session_score: 0,
            session_total: 0,
        }
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Countdown length for new rounds.
    #[must_use]
    pub const fn time_limit(&self) -> TimeLimit {
        self.time_limit
    }

    /// Current drift speed.
    #[must_use]
    pub const fn drift_speed(&self) -> DriftSpeed {
        self.drift_speed
    }

    /// Entity count range for new rounds.
    #[must_use]
    pub const fn dot_range(&self) -> DotRange {
        self.range
    }

    /// Decisions counted in the current streak window.
    #[must_use]
    pub const fn streak(&self) -> StreakTally {
        self.streak
    }

    /// Correct answers in the session.
    #[must_use]
    pub const fn session_score(&self) -> u32 {
        self.session_score
    }

    /// Scored answers in the session.
    #[must_use]
    pub const fn session_total(&self) -> u32 {
        self.session_total
    }

    /// Progress at `level` with the range re-derived.
    #[must_use]
    pub const fn with_level(self, level: Level) -> Self {
        Self {
            level,
            range: DotRange::for_level(level),
            ..self
        }
    }

    /// Progress with a different countdown length.
    #[must_use]
    pub const fn with_time_limit(self, time_limit: TimeLimit) -> Self {
        Self { time_limit, ..self }
    }

    /// Progress with a different drift speed.
    #[must_use]
    pub const fn with_drift_speed(self, drift_speed: DriftSpeed) -> Self {
        Self {
            drift_speed,
            ..self
        }
    }

    /// Progress with an overridden dot range.
    #[must_use]
    pub const fn with_dot_range(self, range: DotRange) -> Self {
        Self { range, ..self }
    }

    /// Progress with a replaced streak window.
    #[must_use]
    pub const fn with_streak(self, streak: StreakTally) -> Self {
        Self { streak, ..self }
    }

    /// Progress after scoring `decision`. Unanswered rounds leave the score
    /// untouched.
    #[must_use]
    pub const fn scored(self, decision: Decision) -> Self {
        match decision {
            Decision::Correct => Self {
                session_score: self.session_score.saturating_add(1),
                session_total: self.session_total.saturating_add(1),
                ..self
            },
            Decision::Incorrect => Self {
                session_total: self.session_total.saturating_add(1),
                ..self
            },
            Decision::NoAnswer => self,
        }
    }

    /// Progress at the start of a new session: counters cleared and the range
    /// re-derived from the level, which is kept.
    #[must_use]
    pub const fn restarted(self) -> Self {
        Self {
            range: DotRange::for_level(self.level),
            streak: StreakTally::new(0, 0),
            session_score: 0,
            session_total: 0,
            ..self
        }
    }
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self::new(Level::default(), TimeLimit::default(), DriftSpeed::OFF)
    }
}

/// Contiguous run of candidate answers offered to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuessWindow {
    start: u32,
    len: u32,
}

impl GuessWindow {
    /// Creates a window of `len` consecutive values beginning at `start`.
    #[must_use]
    pub const fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    /// First candidate.
    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    /// Last candidate, or `None` for an empty window.
    #[must_use]
    pub const fn end(&self) -> Option<u32> {
        if self.len == 0 {
            None
        } else {
            Some(self.start + (self.len - 1))
        }
    }

    /// Number of candidates.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.len
    }

    /// Whether the window offers no candidates.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reports whether `value` is one of the candidates.
    #[must_use]
    pub const fn contains(&self, value: u32) -> bool {
        value >= self.start && value - self.start < self.len
    }

    /// Iterator over the candidates in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.start..self.start.saturating_add(self.len)
    }

    /// Candidates collected into a vector.
    #[must_use]
    pub fn values(&self) -> Vec<u32> {
        self.iter().collect()
    }
}

/// Current difficulty-machine state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyPhase {
    /// A round is in progress or between rounds normally.
    #[default]
    Active,
    /// The player must pick how to raise the difficulty.
    AwaitingPromotionChoice,
    /// The player may pick how to ease the difficulty.
    AwaitingDemotionChoice,
}

/// Knob offered after a perfect streak window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromotionChoice {
    /// Raise the level, widening the dot range.
    MoreDots,
    /// Shorten the countdown by one second.
    LessTime,
    /// Increase drift speed by one step.
    FasterDrift,
}

/// Knob offered after a weak streak window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemotionChoice {
    /// Lower the level.
    DownLevel,
    /// Lengthen the countdown by one second.
    MoreTime,
    /// Decrease drift speed by one step.
    SlowerDrift,
}

/// Which promotion knobs are enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PromotionOptions {
    /// Raising the level is always possible.
    pub more_dots: bool,
    /// Shortening the countdown; a no-op notice at the floor.
    pub less_time: bool,
    /// Faster drifting; disabled at the speed cap.
    pub faster_drift: bool,
}

impl PromotionOptions {
    /// Reports whether `choice` is enabled.
    #[must_use]
    pub const fn allows(&self, choice: PromotionChoice) -> bool {
        match choice {
            PromotionChoice::MoreDots => self.more_dots,
            PromotionChoice::LessTime => self.less_time,
            PromotionChoice::FasterDrift => self.faster_drift,
        }
    }
}

/// Which demotion knobs are enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DemotionOptions {
    /// Lowering the level; disabled at level one.
    pub down_level: bool,
    /// Lengthening the countdown is always possible.
    pub more_time: bool,
    /// Slower drifting; disabled when drift is off.
    pub slower_drift: bool,
}

impl DemotionOptions {
    /// Reports whether `choice` is enabled.
    #[must_use]
    pub const fn allows(&self, choice: DemotionChoice) -> bool {
        match choice {
            DemotionChoice::DownLevel => self.down_level,
            DemotionChoice::MoreTime => self.more_time,
            DemotionChoice::SlowerDrift => self.slower_drift,
        }
    }
}

/// How a weak streak window is resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemotionPolicy {
    /// Lower the level, then offer the demotion dialog.
    #[default]
    Offer,
    /// Lower the level and keep playing without a dialog.
    Immediate,
}

impl FromStr for DemotionPolicy {
    type Err = ModeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "offer" => Ok(Self::Offer),
            "immediate" => Ok(Self::Immediate),
            _ => Err(ModeParseError::UnknownDemotionPolicy(value.to_owned())),
        }
    }
}

/// Lifecycle stage of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Accepting guesses while the countdown runs.
    Running,
    /// A guess (possibly empty) resolved the round.
    Answered,
    /// The countdown reached zero.
    TimedOut,
}

/// Feedback shown after an answered round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundMessage {
    /// The guess was right.
    Correct,
    /// The guess was wrong; carries the true count.
    Incorrect {
        /// Number of entities that were shown.
        true_count: u32,
    },
}

impl fmt::Display for RoundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Correct => f.write_str("Correct!"),
            Self::Incorrect { true_count } => write!(f, "Incorrect - {true_count}!"),
        }
    }
}

/// Read-only view of the live round handed to systems.
#[derive(Clone, Copy, Debug)]
pub struct RoundView<'a> {
    id: RoundId,
    entities: &'a [Entity],
    phase: RoundPhase,
    paused: bool,
}

impl<'a> RoundView<'a> {
    /// Creates a new view over the provided round data.
    #[must_use]
    pub const fn new(id: RoundId, entities: &'a [Entity], phase: RoundPhase, paused: bool) -> Self {
        Self {
            id,
            entities,
            phase,
            paused,
        }
    }

    /// Identifier of the round.
    #[must_use]
    pub const fn id(&self) -> RoundId {
        self.id
    }

    /// Entities of the round in identifier order.
    #[must_use]
    pub const fn entities(&self) -> &'a [Entity] {
        self.entities
    }

    /// Lifecycle stage of the round.
    #[must_use]
    pub const fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Whether the round accepts guesses and is not suspended.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self.phase, RoundPhase::Running) && !self.paused
    }

    /// Whether any entity carries a drift descriptor.
    #[must_use]
    pub fn has_drift(&self) -> bool {
        self.entities.iter().any(|entity| entity.drift.is_some())
    }
}

/// Session configuration supplied when the engine is created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Level the first session starts at.
    pub starting_level: Level,
    /// Countdown length for new rounds.
    pub time_limit: TimeLimit,
    /// Initial drift speed.
    pub drift_speed: DriftSpeed,
    /// Cosmetic configuration.
    pub appearance: Appearance,
    /// How weak streak windows are resolved.
    pub demotion_policy: DemotionPolicy,
    /// Seed from which every random stream is derived.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_level: Level::default(),
            time_limit: TimeLimit::default(),
            drift_speed: DriftSpeed::OFF,
            appearance: Appearance::default(),
            demotion_policy: DemotionPolicy::default(),
            seed: DEFAULT_SEED,
        }
    }
}

/// Seed used when the configuration does not provide one.
pub const DEFAULT_SEED: u64 = 0x0d07_e571_3a7e;

/// Immutable view of everything a presentation layer displays.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Whether a session has been started.
    pub session_started: bool,
    /// Whether the running round is suspended.
    pub paused: bool,
    /// Identifier of the current round, if any.
    pub round: Option<RoundId>,
    /// Lifecycle stage of the current round, if any.
    pub round_phase: Option<RoundPhase>,
    /// Entities of the current round.
    pub entities: Vec<Entity>,
    /// Seconds left on the countdown.
    pub remaining_seconds: u32,
    /// Candidate answers of the current round.
    pub guess_candidates: Vec<u32>,
    /// Candidate chosen by the player, if any.
    pub chosen_guess: Option<u32>,
    /// Whether a guess would currently be accepted.
    pub guesses_enabled: bool,
    /// Feedback for the last answered round.
    pub message: Option<RoundMessage>,
    /// Difficulty and score state.
    pub progress: PlayerProgress,
    /// Difficulty-machine state.
    pub phase: DifficultyPhase,
    /// Enabled promotion knobs while a promotion is pending.
    pub promotion_options: Option<PromotionOptions>,
    /// Enabled demotion knobs while a demotion is pending.
    pub demotion_options: Option<DemotionOptions>,
    /// Cosmetic configuration.
    pub appearance: Appearance,
}

/// Single-owner timer handle driven by simulated time.
///
/// Arming always replaces the previous handle, so at most one callback is
/// outstanding per schedule. Each handle remembers the round it was armed for
/// and the owner stamps fired callbacks with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    interval: Duration,
    repeating: bool,
    armed: Option<ArmedSchedule>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ArmedSchedule {
    round: RoundId,
    interval: Duration,
    elapsed: Duration,
}

impl Schedule {
    /// Creates a disarmed schedule that fires every `period` once armed.
    #[must_use]
    pub const fn repeating(period: Duration) -> Self {
        Self {
            interval: period,
            repeating: true,
            armed: None,
        }
    }

    /// Creates a disarmed schedule that fires once, `delay` after arming.
    #[must_use]
    pub const fn one_shot(delay: Duration) -> Self {
        Self {
            interval: delay,
            repeating: false,
            armed: None,
        }
    }

    /// Arms the schedule for `round` with its default interval, cancelling
    /// any outstanding handle. Returns the round of the superseded handle.
    pub fn arm(&mut self, round: RoundId) -> Option<RoundId> {
        self.arm_with_interval(round, self.interval)
    }

    /// Arms the schedule for `round` with a custom interval, cancelling any
    /// outstanding handle. Returns the round of the superseded handle.
    pub fn arm_with_interval(&mut self, round: RoundId, interval: Duration) -> Option<RoundId> {
        let superseded = self.cancel();
        self.armed = Some(ArmedSchedule {
            round,
            interval,
            elapsed: Duration::ZERO,
        });
        superseded
    }

    /// Cancels the outstanding handle. Returns the round it was armed for.
    pub fn cancel(&mut self) -> Option<RoundId> {
        self.armed.take().map(|armed| armed.round)
    }

    /// Round the outstanding handle was armed for.
    #[must_use]
    pub fn armed_for(&self) -> Option<RoundId> {
        self.armed.map(|armed| armed.round)
    }

    /// Advances the schedule by `dt`, returning how many times it fired.
    ///
    /// A one-shot schedule fires at most once and disarms itself. A zero
    /// interval never fires.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        let repeating = self.repeating;
        let Some(armed) = self.armed.as_mut() else {
            return 0;
        };
        if armed.interval.is_zero() {
            return 0;
        }

        armed.elapsed = armed.elapsed.saturating_add(dt);
        if !repeating {
            if armed.elapsed >= armed.interval {
                self.armed = None;
                return 1;
            }
            return 0;
        }

        let mut fired = 0;
        while armed.elapsed >= armed.interval {
            armed.elapsed -= armed.interval;
            fired += 1;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn level_one_range_spans_four_counts() {
        let range = Level::new(1).dot_range();

        assert_eq!((range.min(), range.max()), (1, 4));
        assert_eq!(range.span(), 4);
    }

    #[test]
    fn level_five_range_doubles() {
        let range = Level::new(5).dot_range();

        assert_eq!((range.min(), range.max()), (5, 10));
    }

    #[test]
    fn level_zero_is_raised_to_floor() {
        assert_eq!(Level::new(0), Level::MIN);
        assert_eq!(Level::MIN.lowered(), Level::MIN);
        assert!(Level::MIN.is_floor());
    }

    proptest! {
        #[test]
        fn range_follows_level(level in 1u32..10_000) {
            let range = DotRange::for_level(Level::new(level));
            let expected_max = if level > 3 { 2 * level } else { level + 4 };

            prop_assert_eq!(range.min(), level);
            prop_assert_eq!(range.max(), expected_max);
            prop_assert!(range.min() <= range.max());
        }
    }

    #[test]
    fn inverted_range_is_refused() {
        assert!(DotRange::new(6, 5).is_none());
        assert_eq!(DotRange::new(5, 5).map(|range| range.span()), Some(1));
    }

    #[test]
    fn widest_range_span_saturates() {
        let range = DotRange::new(0, u32::MAX).expect("valid range");

        assert_eq!(range.span(), u32::MAX);
    }

    #[test]
    fn time_limit_floors_at_one_second() {
        assert_eq!(TimeLimit::from_secs(2).shortened(), Some(TimeLimit::MIN));
        assert_eq!(TimeLimit::MIN.shortened(), None);
        assert_eq!(TimeLimit::from_secs(0), TimeLimit::MIN);
    }

    #[test]
    fn drift_speed_steps_are_clamped() {
        assert_eq!(DriftSpeed::new(3.8).faster(), DriftSpeed::MAX);
        assert_eq!(DriftSpeed::new(0.2).slower(), DriftSpeed::OFF);
        assert_eq!(DriftSpeed::new(f32::NAN), DriftSpeed::OFF);
        assert!(!DriftSpeed::OFF.is_enabled());
    }

    #[test]
    fn streak_window_completes_every_five_decisions() {
        let mut tally = StreakTally::default();
        for _ in 0..4 {
            tally = tally.counted(Decision::Correct);
            assert!(!tally.is_window_complete());
        }
        tally = tally.counted(Decision::NoAnswer);

        assert!(tally.is_window_complete());
        assert_eq!((tally.correct(), tally.incorrect()), (4, 1));
    }

    #[test]
    fn scoring_ignores_unanswered_rounds() {
        let progress = PlayerProgress::default()
            .scored(Decision::Correct)
            .scored(Decision::Incorrect)
            .scored(Decision::NoAnswer);

        assert_eq!(progress.session_score(), 1);
        assert_eq!(progress.session_total(), 2);
    }

    #[test]
    fn restart_rederives_overridden_range() {
        let progress = PlayerProgress::default()
            .with_dot_range(DotRange::new(1, 30).expect("valid range"))
            .with_streak(StreakTally::new(2, 1))
            .scored(Decision::Correct)
            .restarted();

        assert_eq!(progress.dot_range(), Level::default().dot_range());
        assert_eq!(progress.streak(), StreakTally::default());
        assert_eq!(progress.session_total(), 0);
    }

    #[test]
    fn guess_window_membership() {
        let window = GuessWindow::new(5, 6);

        assert_eq!(window.values(), vec![5, 6, 7, 8, 9, 10]);
        assert_eq!(window.end(), Some(10));
        assert!(window.contains(7));
        assert!(!window.contains(4));
        assert!(!window.contains(11));
        assert_eq!(GuessWindow::new(3, 0).end(), None);
    }

    #[test]
    fn color_modes_parse_named_and_hex_values() {
        assert_eq!("Red".parse(), Ok(ColorMode::Fixed(EntityColor::RED)));
        assert_eq!("many".parse(), Ok(ColorMode::Mixed));
        assert_eq!(
            "#1a2B3c".parse(),
            Ok(ColorMode::Fixed(EntityColor::from_rgb(0x1a, 0x2b, 0x3c)))
        );
        assert!("teal".parse::<ColorMode>().is_err());
        assert_eq!(EntityColor::from_u24(0x12_34_56).to_string(), "#123456");
    }

    #[test]
    fn shape_modes_accept_legacy_names() {
        assert_eq!("dots".parse(), Ok(ShapeMode::Circles));
        assert_eq!("both".parse(), Ok(ShapeMode::Mixed));
        assert!("triangles".parse::<ShapeMode>().is_err());
    }

    #[test]
    fn round_messages_render_feedback() {
        assert_eq!(RoundMessage::Correct.to_string(), "Correct!");
        assert_eq!(
            RoundMessage::Incorrect { true_count: 7 }.to_string(),
            "Incorrect - 7!"
        );
    }

    #[test]
    fn repeating_schedule_fires_per_period() {
        let mut schedule = Schedule::repeating(Duration::from_millis(50));
        assert_eq!(schedule.advance(Duration::from_secs(1)), 0);

        let _ = schedule.arm(RoundId::new(1));
        assert_eq!(schedule.advance(Duration::from_millis(120)), 2);
        assert_eq!(schedule.advance(Duration::from_millis(30)), 1);
        assert_eq!(schedule.armed_for(), Some(RoundId::new(1)));
    }

    #[test]
    fn rearming_supersedes_previous_handle() {
        let mut schedule = Schedule::repeating(Duration::from_secs(1));
        let _ = schedule.arm(RoundId::new(1));
        assert_eq!(schedule.advance(Duration::from_millis(900)), 0);

        let superseded = schedule.arm(RoundId::new(2));

        assert_eq!(superseded, Some(RoundId::new(1)));
        assert_eq!(schedule.advance(Duration::from_millis(900)), 0);
        assert_eq!(schedule.advance(Duration::from_millis(100)), 1);
        assert_eq!(schedule.armed_for(), Some(RoundId::new(2)));
    }

    #[test]
    fn one_shot_schedule_disarms_after_firing() {
        let mut schedule = Schedule::one_shot(NEXT_ROUND_DELAY);
        let _ = schedule.arm(RoundId::new(4));

        assert_eq!(schedule.advance(Duration::from_secs(5)), 1);
        assert_eq!(schedule.armed_for(), None);
        assert_eq!(schedule.advance(Duration::from_secs(5)), 0);
    }

    #[test]
    fn zero_interval_never_fires() {
        let mut schedule = Schedule::repeating(Duration::ZERO);
        let _ = schedule.arm(RoundId::new(1));

        assert_eq!(schedule.advance(Duration::from_secs(1)), 0);
    }

    #[test]
    fn progress_serializes_with_bincode() {
        let progress = PlayerProgress::new(Level::new(4), TimeLimit::from_secs(5), DriftSpeed::new(1.5))
            .scored(Decision::Correct);

        let bytes = bincode::serialize(&progress).expect("progress serializes");
        let decoded: PlayerProgress = bincode::deserialize(&bytes).expect("progress deserializes");

        assert_eq!(decoded, progress);
    }
}
