#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Dot Estimate.
//!
//! The world owns the live round, the player's progress and the appearance
//! configuration. It is mutated exclusively through [`apply`], which validates
//! each [`Command`] and reports the outcome as [`Event`] values. Commands that
//! name a round other than the live one are ignored, which keeps late timer
//! callbacks from touching a newer round.

mod round;

use dot_estimate_core::{
    Appearance, ChoiceRejection, Command, ConfigurationError, Decision, DotRange, Entity, Event,
    GameConfig, GuessWindow, PlayerProgress, RoundId, RoundMessage, RoundRejection, TimeLimit,
    MAX_TIME_LIMIT_OVERRIDE, NEXT_ROUND_DELAY, WELCOME_BANNER,
};
use dot_estimate_system_difficulty::{self as difficulty, ChoiceOutcome, DifficultyState, Transition};

use round::{Answer, Round};

/// Represents the authoritative Dot Estimate world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    appearance: Appearance,
    difficulty: DifficultyState,
    session_started: bool,
    paused: bool,
    round: Option<Round>,
    next_round: RoundId,
    message: Option<RoundMessage>,
}

impl World {
    /// Creates a world using the default game configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&GameConfig::default())
    }

    /// Creates a world seeded from the provided configuration.
    #[must_use]
    pub fn with_config(config: &GameConfig) -> Self {
        let progress = PlayerProgress::new(
            config.starting_level,
            config.time_limit,
            config.drift_speed,
        );
        Self {
            banner: WELCOME_BANNER,
            appearance: config.appearance,
            difficulty: DifficultyState::new(progress, config.demotion_policy),
            session_started: false,
            paused: false,
            round: None,
            next_round: RoundId::new(1),
            message: None,
        }
    }

    fn progress(&self) -> PlayerProgress {
        self.difficulty.progress()
    }

    fn update_progress(&mut self, update: impl FnOnce(PlayerProgress) -> PlayerProgress) {
        self.difficulty = self.difficulty.with_progress(update(self.progress()));
    }

    fn live_round_mut(&mut self, id: RoundId) -> Option<&mut Round> {
        if self.paused {
            return None;
        }
        self.round
            .as_mut()
            .filter(|round| round.id() == id && round.is_running())
    }

    fn begin_round(
        &mut self,
        entities: Vec<Entity>,
        guess_window: GuessWindow,
        out_events: &mut Vec<Event>,
    ) {
        if !self.session_started {
            out_events.push(Event::RoundRejected {
                reason: RoundRejection::SessionNotStarted,
            });
            return;
        }
        if self.difficulty.is_awaiting_choice() {
            out_events.push(Event::RoundRejected {
                reason: RoundRejection::AwaitingChoice,
            });
            return;
        }

        let true_count = u32::try_from(entities.len()).unwrap_or(u32::MAX);
        if !guess_window.contains(true_count) {
            tracing::warn!(true_count, ?guess_window, "round rejected");
            out_events.push(Event::RoundRejected {
                reason: RoundRejection::WindowMissesCount {
                    true_count,
                    window: guess_window,
                },
            });
            return;
        }

        let id = self.next_round;
        self.next_round = id.next();
        let time_limit = self.progress().time_limit();
        let drifting = entities.iter().any(|entity| entity.drift.is_some());
        self.round = Some(Round::new(id, entities, guess_window, time_limit));
        self.paused = false;
        self.message = None;

        tracing::debug!(round = id.get(), true_count, "round started");
        out_events.push(Event::RoundStarted {
            round: id,
            true_count,
            guess_window,
            time_limit,
            drifting,
        });
    }

    fn record_decision(&mut self, round: RoundId, decision: Decision, out_events: &mut Vec<Event>) {
        let (state, transition) = difficulty::record_decision(self.difficulty, decision);
        self.difficulty = state;
        let progress = state.progress();

        out_events.push(Event::DecisionRecorded {
            decision,
            streak: progress.streak(),
        });
        if decision != Decision::NoAnswer {
            out_events.push(Event::ScoreChanged {
                score: progress.session_score(),
                total: progress.session_total(),
            });
        }

        match transition {
            Transition::Continue => schedule_next_round(round, out_events),
            Transition::Promotion { options } => {
                self.paused = true;
                out_events.push(Event::PromotionOffered { options });
            }
            Transition::Demotion { from, to, offer } => {
                out_events.push(Event::Demoted { from, to });
                out_events.push(Event::LevelChanged {
                    level: to,
                    range: progress.dot_range(),
                });
                match offer {
                    Some(options) => {
                        self.paused = true;
                        out_events.push(Event::DemotionOffered { options });
                    }
                    None => schedule_next_round(round, out_events),
                }
            }
        }
    }

    fn resolve_choice(
        &mut self,
        resolved: Result<(DifficultyState, Option<ChoiceOutcome>), ChoiceRejection>,
        out_events: &mut Vec<Event>,
    ) {
        let (state, outcome) = match resolved {
            Ok(resolved) => resolved,
            Err(reason) => {
                tracing::debug!(%reason, "choice rejected");
                out_events.push(Event::ChoiceRejected { reason });
                return;
            }
        };

        self.difficulty = state;
        let progress = state.progress();
        match outcome {
            Some(ChoiceOutcome::LevelChanged(level)) => out_events.push(Event::LevelChanged {
                level,
                range: progress.dot_range(),
            }),
            Some(ChoiceOutcome::TimeLimitChanged(time_limit)) => {
                out_events.push(Event::TimeLimitChanged { time_limit });
            }
            Some(ChoiceOutcome::TimeLimitAtFloor) => out_events.push(Event::TimeLimitAtFloor),
            Some(ChoiceOutcome::DriftSpeedChanged(speed)) => {
                out_events.push(Event::DriftSpeedChanged { speed });
            }
            None => {}
        }

        self.paused = false;
        out_events.push(Event::DifficultyResumed);
        out_events.push(Event::RoundRequested);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn schedule_next_round(after: RoundId, out_events: &mut Vec<Event>) {
    out_events.push(Event::NextRoundScheduled {
        after,
        delay: NEXT_ROUND_DELAY,
    });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartSession => {
            world.difficulty = world.difficulty.restarted();
            world.session_started = true;
            world.paused = false;
            world.round = None;
            world.message = None;
            let progress = world.progress();
            tracing::info!(
                starting_level = progress.level().get(),
                time_limit = progress.time_limit().seconds(),
                "session started"
            );
            out_events.push(Event::SessionStarted { progress });
            out_events.push(Event::RoundRequested);
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::BeginRound {
            entities,
            guess_window,
        } => world.begin_round(entities, guess_window, out_events),
        Command::SubmitGuess { round, guess } => {
            let Some(live) = world.live_round_mut(round) else {
                out_events.push(Event::GuessIgnored { round });
                return;
            };

            match live.answer(guess) {
                Answer::Scored {
                    guess,
                    decision,
                    message,
                } => {
                    world.message = Some(message);
                    out_events.push(Event::GuessAccepted {
                        round,
                        guess,
                        decision,
                    });
                    world.record_decision(round, decision, out_events);
                }
                Answer::Empty => {
                    out_events.push(Event::GuessSkipped { round });
                    world.record_decision(round, Decision::NoAnswer, out_events);
                }
            }
        }
        Command::CountdownElapsed { round } => {
            let Some(live) = world.live_round_mut(round) else {
                tracing::trace!(round = round.get(), "stale countdown ignored");
                return;
            };

            let remaining_seconds = live.count_down();
            out_events.push(Event::CountdownAdvanced {
                round,
                remaining_seconds,
            });
            if remaining_seconds == 0 {
                out_events.push(Event::RoundTimedOut { round });
                world.record_decision(round, Decision::NoAnswer, out_events);
            }
        }
        Command::AdvanceDrift { round, placements } => {
            if let Some(live) = world.live_round_mut(round) {
                live.place(&placements);
                out_events.push(Event::EntitiesDrifted { round });
            }
        }
        Command::RequestNextRound { after } => {
            let finished = world
                .round
                .as_ref()
                .is_some_and(|round| round.id() == after && !round.is_running());
            if finished
                && world.session_started
                && !world.paused
                && !world.difficulty.is_awaiting_choice()
            {
                out_events.push(Event::RoundRequested);
            }
        }
        Command::Pause => {
            let running = world.round.as_ref().filter(|round| round.is_running());
            if let (Some(round), false) = (running, world.paused) {
                let round = round.id();
                world.paused = true;
                out_events.push(Event::Paused { round });
            }
        }
        Command::Resume => {
            let running = world.round.as_ref().filter(|round| round.is_running());
            if let (Some(round), true) = (running, world.paused) {
                let round = round.id();
                world.paused = false;
                out_events.push(Event::Resumed { round });
            }
        }
        Command::ChoosePromotion { choice } => {
            let resolved = difficulty::choose_promotion(world.difficulty, choice)
                .map(|(state, outcome)| (state, Some(outcome)));
            world.resolve_choice(resolved, out_events);
        }
        Command::ChooseDemotion { choice } => {
            let resolved = difficulty::choose_demotion(world.difficulty, choice)
                .map(|(state, outcome)| (state, Some(outcome)));
            world.resolve_choice(resolved, out_events);
        }
        Command::DismissChoice => {
            let resolved = difficulty::dismiss(world.difficulty).map(|state| (state, None));
            world.resolve_choice(resolved, out_events);
        }
        Command::SetShapeMode { mode } => {
            world.appearance.shape_mode = mode;
            out_events.push(Event::AppearanceChanged {
                appearance: world.appearance,
                styles_invalidated: true,
            });
        }
        Command::SetColorMode { mode } => {
            world.appearance.color_mode = mode;
            out_events.push(Event::AppearanceChanged {
                appearance: world.appearance,
                styles_invalidated: true,
            });
        }
        Command::SetDotSize { size } => {
            world.appearance.dot_size = size;
            out_events.push(Event::AppearanceChanged {
                appearance: world.appearance,
                styles_invalidated: false,
            });
        }
        Command::RestyleEntities { round, styles } => {
            if let Some(current) = world.round.as_mut().filter(|current| current.id() == round) {
                current.restyle(&styles);
                out_events.push(Event::EntitiesRestyled { round });
            }
        }
        Command::SetTimeLimit { time_limit } => {
            let time_limit =
                TimeLimit::from_secs(time_limit.seconds().min(MAX_TIME_LIMIT_OVERRIDE));
            world.update_progress(|progress| progress.with_time_limit(time_limit));
            out_events.push(Event::TimeLimitChanged { time_limit });
        }
        Command::SetDriftSpeed { speed } => {
            world.update_progress(|progress| progress.with_drift_speed(speed));
            out_events.push(Event::DriftSpeedChanged { speed });
        }
        Command::SetLevel { level } => {
            world.update_progress(|progress| progress.with_level(level));
            out_events.push(Event::LevelChanged {
                level,
                range: level.dot_range(),
            });
        }
        Command::SetDotRange { min, max } => {
            let min = min.max(1);
            match DotRange::new(min, max) {
                Some(range) => {
                    world.update_progress(|progress| progress.with_dot_range(range));
                    out_events.push(Event::DotRangeChanged { range });
                }
                None => {
                    tracing::warn!(min, max, "dot range override rejected");
                    out_events.push(Event::ConfigurationRejected {
                        reason: ConfigurationError::InvertedRange { min, max },
                    });
                }
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use dot_estimate_core::{
        Appearance, DifficultyPhase, PlayerProgress, RoundId, RoundView, SessionSnapshot,
    };
    use dot_estimate_system_difficulty as difficulty;

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Difficulty and score state of the session.
    #[must_use]
    pub fn progress(world: &World) -> PlayerProgress {
        world.progress()
    }

    /// Current difficulty-machine phase.
    #[must_use]
    pub fn difficulty_phase(world: &World) -> DifficultyPhase {
        world.difficulty.phase()
    }

    /// Cosmetic configuration in effect.
    #[must_use]
    pub fn appearance(world: &World) -> Appearance {
        world.appearance
    }

    /// Whether a session has been started.
    #[must_use]
    pub fn session_started(world: &World) -> bool {
        world.session_started
    }

    /// Whether play is suspended, either by the player or by a pending choice.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Identifier of the live round, if any.
    #[must_use]
    pub fn round_id(world: &World) -> Option<RoundId> {
        world.round.as_ref().map(|round| round.id())
    }

    /// Seconds left on the live round's countdown.
    #[must_use]
    pub fn remaining_seconds(world: &World) -> Option<u32> {
        world.round.as_ref().map(|round| round.remaining_seconds())
    }

    /// Captures a read-only view of the live round.
    #[must_use]
    pub fn round_view(world: &World) -> Option<RoundView<'_>> {
        world.round.as_ref().map(|round| {
            RoundView::new(round.id(), round.entities(), round.phase(), world.paused)
        })
    }

    /// Captures everything a presentation layer displays.
    #[must_use]
    pub fn snapshot(world: &World) -> SessionSnapshot {
        let progress = world.progress();
        let phase = world.difficulty.phase();
        let round = world.round.as_ref();

        SessionSnapshot {
            session_started: world.session_started,
            paused: world.paused,
            round: round.map(|round| round.id()),
            round_phase: round.map(|round| round.phase()),
            entities: round.map(|round| round.entities().to_vec()).unwrap_or_default(),
            remaining_seconds: round.map_or(0, |round| round.remaining_seconds()),
            guess_candidates: round
                .map(|round| round.guess_window().values())
                .unwrap_or_default(),
            chosen_guess: round.and_then(|round| round.chosen()),
            guesses_enabled: round.is_some_and(|round| round.is_running()) && !world.paused,
            message: world.message,
            progress,
            phase,
            promotion_options: (phase == DifficultyPhase::AwaitingPromotionChoice)
                .then(|| difficulty::promotion_options(&progress)),
            demotion_options: (phase == DifficultyPhase::AwaitingDemotionChoice)
                .then(|| difficulty::demotion_options(&progress)),
            appearance: world.appearance,
        }
    }

    /// Number of entities in the live round.
    #[must_use]
    pub fn true_count(world: &World) -> Option<u32> {
        world.round.as_ref().map(|round| round.true_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dot_estimate_core::{
        DemotionChoice, DemotionPolicy, DifficultyPhase, DotSize, EntityColor, EntityId, Level,
        Position, PromotionChoice, RoundPhase, Shape, ShapeMode,
    };

    fn entities(count: u32) -> Vec<Entity> {
        (0..count)
            .map(|index| Entity {
                id: EntityId::new(index),
                position: Position::new(10.0, 10.0 + index as f32),
                shape: Shape::Circle,
                color: EntityColor::BLUE,
                drift: None,
            })
            .collect()
    }

    fn started_world(config: &GameConfig) -> World {
        let mut world = World::with_config(config);
        let mut events = Vec::new();
        apply(&mut world, Command::StartSession, &mut events);
        world
    }

    fn begin(world: &mut World, count: u32) -> RoundId {
        let mut events = Vec::new();
        apply(
            world,
            Command::BeginRound {
                entities: entities(count),
                guess_window: GuessWindow::new(1, 8),
            },
            &mut events,
        );
        query::round_id(world).expect("round started")
    }

    fn guess(world: &mut World, round: RoundId, value: u32) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::SubmitGuess {
                round,
                guess: Some(value),
            },
            &mut events,
        );
        events
    }

    #[test]
    fn start_session_requests_a_round() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(&mut world, Command::StartSession, &mut events);

        assert!(matches!(events[0], Event::SessionStarted { .. }));
        assert_eq!(events[1], Event::RoundRequested);
        assert!(query::session_started(&world));
    }

    #[test]
    fn rounds_before_session_start_are_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::BeginRound {
                entities: entities(3),
                guess_window: GuessWindow::new(1, 4),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::RoundRejected {
                reason: RoundRejection::SessionNotStarted
            }]
        );
    }

    #[test]
    fn window_missing_true_count_is_rejected() {
        let mut world = started_world(&GameConfig::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::BeginRound {
                entities: entities(9),
                guess_window: GuessWindow::new(1, 4),
            },
            &mut events,
        );

        assert!(matches!(
            events.as_slice(),
            [Event::RoundRejected {
                reason: RoundRejection::WindowMissesCount { true_count: 9, .. }
            }]
        ));
        assert_eq!(query::round_id(&world), None);
    }

    #[test]
    fn correct_guess_scores_and_schedules_next_round() {
        let mut world = started_world(&GameConfig::default());
        let round = begin(&mut world, 4);

        let events = guess(&mut world, round, 4);

        assert_eq!(
            events[0],
            Event::GuessAccepted {
                round,
                guess: 4,
                decision: Decision::Correct
            }
        );
        assert!(events.contains(&Event::ScoreChanged { score: 1, total: 1 }));
        assert_eq!(
            events.last(),
            Some(&Event::NextRoundScheduled {
                after: round,
                delay: NEXT_ROUND_DELAY
            })
        );
        let snapshot = query::snapshot(&world);
        assert_eq!(snapshot.message, Some(RoundMessage::Correct));
        assert_eq!(snapshot.chosen_guess, Some(4));
        assert!(!snapshot.guesses_enabled);
    }

    #[test]
    fn second_guess_in_a_round_is_ignored() {
        let mut world = started_world(&GameConfig::default());
        let round = begin(&mut world, 4);
        let _ = guess(&mut world, round, 2);

        let events = guess(&mut world, round, 4);

        assert_eq!(events, vec![Event::GuessIgnored { round }]);
        assert_eq!(query::progress(&world).session_total(), 1);
        assert_eq!(
            query::snapshot(&world).message,
            Some(RoundMessage::Incorrect { true_count: 4 })
        );
    }

    #[test]
    fn guess_outside_window_counts_as_no_answer() {
        let mut world = started_world(&GameConfig::default());
        let round = begin(&mut world, 4);

        let events = guess(&mut world, round, 40);

        assert_eq!(events[0], Event::GuessSkipped { round });
        assert_eq!(query::progress(&world).session_total(), 0);
        assert_eq!(query::progress(&world).streak().incorrect(), 1);
        assert_eq!(query::snapshot(&world).message, None);
    }

    #[test]
    fn countdown_reaching_zero_times_out() {
        let config = GameConfig {
            time_limit: TimeLimit::from_secs(2),
            ..GameConfig::default()
        };
        let mut world = started_world(&config);
        let round = begin(&mut world, 3);
        let mut events = Vec::new();

        apply(&mut world, Command::CountdownElapsed { round }, &mut events);
        apply(&mut world, Command::CountdownElapsed { round }, &mut events);
        apply(&mut world, Command::CountdownElapsed { round }, &mut events);

        assert!(events.contains(&Event::RoundTimedOut { round }));
        assert_eq!(query::remaining_seconds(&world), Some(0));
        assert_eq!(query::progress(&world).session_total(), 0);
        let advanced = events
            .iter()
            .filter(|event| matches!(event, Event::CountdownAdvanced { .. }))
            .count();
        assert_eq!(advanced, 2);
    }

    #[test]
    fn stale_countdown_does_not_touch_new_round() {
        let mut world = started_world(&GameConfig::default());
        let first = begin(&mut world, 3);
        let _ = guess(&mut world, first, 3);
        let second = begin(&mut world, 3);
        let mut events = Vec::new();

        apply(&mut world, Command::CountdownElapsed { round: first }, &mut events);

        assert!(events.is_empty());
        assert_ne!(first, second);
        assert_eq!(
            query::remaining_seconds(&world),
            Some(TimeLimit::default().seconds())
        );
    }

    #[test]
    fn pause_freezes_countdown_and_guesses() {
        let mut world = started_world(&GameConfig::default());
        let round = begin(&mut world, 3);
        let mut events = Vec::new();

        apply(&mut world, Command::Pause, &mut events);
        apply(&mut world, Command::CountdownElapsed { round }, &mut events);
        let ignored = guess(&mut world, round, 3);

        assert_eq!(events, vec![Event::Paused { round }]);
        assert_eq!(ignored, vec![Event::GuessIgnored { round }]);

        events.clear();
        apply(&mut world, Command::Resume, &mut events);
        apply(&mut world, Command::CountdownElapsed { round }, &mut events);
        assert_eq!(events[0], Event::Resumed { round });
        assert_eq!(query::remaining_seconds(&world), Some(6));
    }

    #[test]
    fn promotion_pauses_until_choice_resolves() {
        let mut world = started_world(&GameConfig::default());
        let mut last = RoundId::new(0);
        let mut events = Vec::new();
        for _ in 0..5 {
            last = begin(&mut world, 3);
            events = guess(&mut world, last, 3);
        }

        assert!(matches!(events.last(), Some(Event::PromotionOffered { .. })));
        assert!(query::is_paused(&world));
        assert!(query::snapshot(&world).promotion_options.is_some());

        let mut follow_up = Vec::new();
        apply(&mut world, Command::RequestNextRound { after: last }, &mut follow_up);
        assert!(follow_up.is_empty());

        apply(
            &mut world,
            Command::ChoosePromotion {
                choice: PromotionChoice::MoreDots,
            },
            &mut follow_up,
        );
        assert_eq!(
            follow_up,
            vec![
                Event::LevelChanged {
                    level: Level::new(4),
                    range: Level::new(4).dot_range()
                },
                Event::DifficultyResumed,
                Event::RoundRequested,
            ]
        );
        assert!(!query::is_paused(&world));
        assert_eq!(query::difficulty_phase(&world), DifficultyPhase::Active);
    }

    #[test]
    fn demotion_dialog_can_be_dismissed() {
        let config = GameConfig {
            demotion_policy: DemotionPolicy::Offer,
            ..GameConfig::default()
        };
        let mut world = started_world(&config);
        for _ in 0..5 {
            let round = begin(&mut world, 3);
            let _ = guess(&mut world, round, 2);
        }
        assert_eq!(
            query::difficulty_phase(&world),
            DifficultyPhase::AwaitingDemotionChoice
        );
        assert_eq!(query::progress(&world).level(), Level::new(2));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ChooseDemotion {
                choice: DemotionChoice::SlowerDrift,
            },
            &mut events,
        );
        apply(&mut world, Command::DismissChoice, &mut events);

        assert_eq!(
            events,
            vec![
                Event::ChoiceRejected {
                    reason: ChoiceRejection::DemotionUnavailable(DemotionChoice::SlowerDrift)
                },
                Event::DifficultyResumed,
                Event::RoundRequested,
            ]
        );
    }

    #[test]
    fn inverted_range_override_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(&mut world, Command::SetDotRange { min: 9, max: 4 }, &mut events);
        apply(&mut world, Command::SetDotRange { min: 2, max: 12 }, &mut events);

        assert_eq!(
            events[0],
            Event::ConfigurationRejected {
                reason: ConfigurationError::InvertedRange { min: 9, max: 4 }
            }
        );
        assert_eq!(query::progress(&world).dot_range(), DotRange::new(2, 12).expect("range"));
    }

    #[test]
    fn range_override_raises_zero_minimum_to_one() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(&mut world, Command::SetDotRange { min: 0, max: u32::MAX }, &mut events);
        apply(&mut world, Command::SetDotRange { min: 0, max: 0 }, &mut events);

        let range = DotRange::new(1, u32::MAX).expect("range");
        assert_eq!(events[0], Event::DotRangeChanged { range });
        assert_eq!(
            events[1],
            Event::ConfigurationRejected {
                reason: ConfigurationError::InvertedRange { min: 1, max: 0 }
            }
        );
        assert_eq!(query::progress(&world).dot_range(), range);
    }

    #[test]
    fn time_limit_override_is_clamped() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetTimeLimit {
                time_limit: TimeLimit::from_secs(40),
            },
            &mut events,
        );

        assert_eq!(query::progress(&world).time_limit().seconds(), MAX_TIME_LIMIT_OVERRIDE);
    }

    #[test]
    fn appearance_changes_flag_style_invalidation() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetShapeMode {
                mode: ShapeMode::Squares,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetDotSize {
                size: DotSize::new(500),
            },
            &mut events,
        );

        assert!(matches!(
            events[0],
            Event::AppearanceChanged {
                styles_invalidated: true,
                ..
            }
        ));
        assert!(matches!(
            events[1],
            Event::AppearanceChanged {
                styles_invalidated: false,
                ..
            }
        ));
        assert_eq!(query::appearance(&world).dot_size.get(), DotSize::MAX);
    }

    #[test]
    fn restart_clears_counters_and_round() {
        let mut world = started_world(&GameConfig::default());
        let round = begin(&mut world, 3);
        let _ = guess(&mut world, round, 3);
        let mut events = Vec::new();

        apply(&mut world, Command::StartSession, &mut events);

        let snapshot = query::snapshot(&world);
        assert_eq!(snapshot.progress.session_total(), 0);
        assert_eq!(snapshot.round, None);
        assert_eq!(snapshot.round_phase, None::<RoundPhase>);
        assert_eq!(snapshot.message, None);
    }
}
