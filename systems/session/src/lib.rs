#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game controller that drives the round lifecycle.
//!
//! The controller owns the world and every system. Each external input is
//! turned into a [`Command`] and pumped to quiescence: the world applies the
//! command, the resulting events are handed to the timer, the drift simulator
//! and the round builder, and whatever commands they answer with are queued
//! behind it. No command is applied while another one is in flight.

use std::{collections::VecDeque, time::Duration};

use dot_estimate_core::{
    ColorMode, Command, DemotionChoice, DotSize, DriftSpeed, Event, GameConfig, Level,
    PromotionChoice, RoundId, SessionSnapshot, ShapeMode, TimeLimit,
};
use dot_estimate_system_dot_generator::{DotGenerator, GenerationRequest};
use dot_estimate_system_drift::DriftSimulator;
use dot_estimate_system_guess_range::GuessRangeSelector;
use dot_estimate_system_round_timer::RoundTimer;
use dot_estimate_world::{self as world, query, World};
use sha2::{Digest, Sha256};

const DOT_STREAM_LABEL: &str = "dots";
const GUESS_WINDOW_STREAM_LABEL: &str = "guess-window";

/// Orchestrates the world and the round systems.
#[derive(Debug)]
pub struct GameController {
    world: World,
    generator: DotGenerator,
    selector: GuessRangeSelector,
    timer: RoundTimer,
    drift: DriftSimulator,
    journal: Vec<Event>,
}

impl GameController {
    /// Creates a controller whose random streams derive from `config.seed`.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            world: World::with_config(config),
            generator: DotGenerator::new(derive_labeled_seed(config.seed, DOT_STREAM_LABEL)),
            selector: GuessRangeSelector::new(derive_labeled_seed(
                config.seed,
                GUESS_WINDOW_STREAM_LABEL,
            )),
            timer: RoundTimer::default(),
            drift: DriftSimulator::default(),
            journal: Vec::new(),
        }
    }

    /// Read-only access to the authoritative world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Resets the session counters and starts the first round.
    pub fn start_session(&mut self) {
        self.dispatch(Command::StartSession);
    }

    /// Restarts the session; identical to [`GameController::start_session`].
    pub fn restart(&mut self) {
        self.start_session();
    }

    /// Replaces the live round with a freshly generated one.
    pub fn start_round(&mut self) {
        if let Some(command) = self.build_round() {
            self.dispatch(command);
        }
    }

    /// Submits the player's answer for the live round. `None` stands for an
    /// empty answer.
    pub fn submit_guess(&mut self, guess: Option<u32>) {
        if let Some(round) = query::round_id(&self.world) {
            self.dispatch(Command::SubmitGuess { round, guess });
        }
    }

    /// Runs the live countdown out, resolving the round without an answer.
    pub fn timeout(&mut self) {
        let Some(view) = query::round_view(&self.world) else {
            return;
        };
        if !view.is_live() {
            return;
        }
        let round = view.id();
        let remaining = query::remaining_seconds(&self.world).unwrap_or(0);
        for _ in 0..remaining {
            self.dispatch(Command::CountdownElapsed { round });
        }
    }

    /// Advances simulated time, firing every countdown, drift and transition
    /// callback that falls due.
    pub fn advance(&mut self, dt: Duration) {
        self.dispatch(Command::Tick { dt });
    }

    /// Suspends the running round.
    pub fn pause(&mut self) {
        self.dispatch(Command::Pause);
    }

    /// Resumes a suspended round.
    pub fn resume(&mut self) {
        self.dispatch(Command::Resume);
    }

    /// Start, pause and resume behind a single control.
    pub fn toggle_pause(&mut self) {
        if !query::session_started(&self.world) {
            self.start_session();
        } else if query::is_paused(&self.world) {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Resolves a pending promotion.
    pub fn choose_promotion(&mut self, choice: PromotionChoice) {
        self.dispatch(Command::ChoosePromotion { choice });
    }

    /// Resolves a pending demotion.
    pub fn choose_demotion(&mut self, choice: DemotionChoice) {
        self.dispatch(Command::ChooseDemotion { choice });
    }

    /// Closes a pending dialog and keeps going.
    pub fn dismiss_choice(&mut self) {
        self.dispatch(Command::DismissChoice);
    }

    /// Changes how entity shapes are chosen, restyling the live round.
    pub fn set_shape_mode(&mut self, mode: ShapeMode) {
        self.dispatch(Command::SetShapeMode { mode });
    }

    /// Changes how entity colors are chosen, restyling the live round.
    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.dispatch(Command::SetColorMode { mode });
    }

    /// Changes the rendered entity size.
    pub fn set_dot_size(&mut self, size: DotSize) {
        self.dispatch(Command::SetDotSize { size });
    }

    /// Overrides the countdown length from the next round on.
    pub fn set_time_limit(&mut self, time_limit: TimeLimit) {
        self.dispatch(Command::SetTimeLimit { time_limit });
    }

    /// Overrides the drift speed.
    pub fn set_drift_speed(&mut self, speed: DriftSpeed) {
        self.dispatch(Command::SetDriftSpeed { speed });
    }

    /// Overrides the level.
    pub fn set_level(&mut self, level: Level) {
        self.dispatch(Command::SetLevel { level });
    }

    /// Raises the level by one.
    pub fn raise_level(&mut self) {
        let level = query::progress(&self.world).level().raised();
        self.set_level(level);
    }

    /// Lowers the level by one, stopping at level one.
    pub fn lower_level(&mut self) {
        let level = query::progress(&self.world).level().lowered();
        self.set_level(level);
    }

    /// Overrides the dot range. An inverted range is rejected.
    pub fn set_dot_range(&mut self, min: u32, max: u32) {
        self.dispatch(Command::SetDotRange { min, max });
    }

    /// Captures everything a presentation layer displays.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        query::snapshot(&self.world)
    }

    /// Identifier of the live round, if any.
    #[must_use]
    pub fn current_round(&self) -> Option<RoundId> {
        query::round_id(&self.world)
    }

    /// Removes and returns every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.journal)
    }

    /// Applies `command` and every follow-up command it causes.
    pub fn dispatch(&mut self, command: Command) {
        let mut queue = VecDeque::from([command]);

        while let Some(command) = queue.pop_front() {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);
            if events.is_empty() {
                continue;
            }

            let mut follow_ups = Vec::new();
            self.timer.handle(&events, &mut follow_ups);
            let speed = query::progress(&self.world).drift_speed();
            self.drift.handle(
                &events,
                query::round_view(&self.world),
                speed,
                &mut follow_ups,
            );
            for event in &events {
                match event {
                    Event::RoundRequested => {
                        if let Some(command) = self.build_round() {
                            follow_ups.push(command);
                        }
                    }
                    Event::AppearanceChanged {
                        appearance,
                        styles_invalidated: true,
                    } => {
                        if let Some(view) = query::round_view(&self.world) {
                            let styles = self.generator.restyle(
                                view.entities(),
                                appearance.shape_mode,
                                appearance.color_mode,
                            );
                            follow_ups.push(Command::RestyleEntities {
                                round: view.id(),
                                styles,
                            });
                        }
                    }
                    _ => {}
                }
            }

            self.journal.extend(events);
            queue.extend(follow_ups);
        }
    }

    fn build_round(&mut self) -> Option<Command> {
        let progress = query::progress(&self.world);
        let appearance = query::appearance(&self.world);
        let range = progress.dot_range();
        let request = GenerationRequest {
            range,
            shape_mode: appearance.shape_mode,
            color_mode: appearance.color_mode,
        };

        let entities = self.generator.generate(&request);
        let true_count = u32::try_from(entities.len()).unwrap_or(u32::MAX);
        match self.selector.select(true_count, range.min(), range.max()) {
            Ok(guess_window) => Some(Command::BeginRound {
                entities,
                guess_window,
            }),
            Err(error) => {
                tracing::warn!(%error, "round generation skipped");
                None
            }
        }
    }
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
