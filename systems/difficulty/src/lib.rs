#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Adaptive difficulty reducer.
//!
//! Every function in this crate is pure: it consumes a [`DifficultyState`]
//! value and returns the successor state together with a description of what
//! changed. The world owns the state and stores whatever these reducers
//! return, so the difficulty machine never holds ambient mutable state.

use dot_estimate_core::{
    ChoiceRejection, Decision, DemotionChoice, DemotionOptions, DemotionPolicy, DifficultyPhase,
    DriftSpeed, Level, PlayerProgress, PromotionChoice, PromotionOptions, StreakTally, TimeLimit,
};

/// Snapshot of the difficulty machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyState {
    progress: PlayerProgress,
    phase: DifficultyPhase,
    policy: DemotionPolicy,
}

impl DifficultyState {
    /// Creates an active state over the provided progress.
    #[must_use]
    pub const fn new(progress: PlayerProgress, policy: DemotionPolicy) -> Self {
        Self {
            progress,
            phase: DifficultyPhase::Active,
            policy,
        }
    }

    /// Progress tracked by the machine.
    #[must_use]
    pub const fn progress(&self) -> PlayerProgress {
        self.progress
    }

    /// Current machine phase.
    #[must_use]
    pub const fn phase(&self) -> DifficultyPhase {
        self.phase
    }

    /// Policy applied to weak streak windows.
    #[must_use]
    pub const fn policy(&self) -> DemotionPolicy {
        self.policy
    }

    /// Whether the player must resolve a dialog before play continues.
    #[must_use]
    pub const fn is_awaiting_choice(&self) -> bool {
        !matches!(self.phase, DifficultyPhase::Active)
    }

    /// State with replaced progress, keeping the phase.
    #[must_use]
    pub const fn with_progress(self, progress: PlayerProgress) -> Self {
        Self { progress, ..self }
    }

    /// State for a fresh session: counters cleared, range re-derived and any
    /// pending dialog discarded.
    #[must_use]
    pub const fn restarted(self) -> Self {
        Self {
            progress: self.progress.restarted(),
            phase: DifficultyPhase::Active,
            policy: self.policy,
        }
    }
}

/// Consequence of recording a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Play continues unchanged.
    Continue,
    /// A perfect window requires a promotion choice.
    Promotion {
        /// Knobs the player may pick from.
        options: PromotionOptions,
    },
    /// A weak window lowered the level.
    Demotion {
        /// Level before the demotion.
        from: Level,
        /// Level after the demotion.
        to: Level,
        /// Knobs offered to ease further, when the policy offers a dialog.
        offer: Option<DemotionOptions>,
    },
}

/// Consequence of resolving a choice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChoiceOutcome {
    /// The level changed and the dot range was re-derived.
    LevelChanged(Level),
    /// The countdown length changed.
    TimeLimitChanged(TimeLimit),
    /// The countdown was already at its floor; nothing changed.
    TimeLimitAtFloor,
    /// The drift speed changed.
    DriftSpeedChanged(DriftSpeed),
}

/// Scores `decision`, counts it toward the streak window, and evaluates the
/// window once it holds five decisions.
#[must_use]
pub fn record_decision(state: DifficultyState, decision: Decision) -> (DifficultyState, Transition) {
    let streak = state.progress.streak().counted(decision);
    let progress = state.progress.scored(decision).with_streak(streak);
    let state = state.with_progress(progress);

    if !streak.is_window_complete() {
        return (state, Transition::Continue);
    }

    let progress = progress.with_streak(StreakTally::default());
    evaluate_window(state.with_progress(progress), streak)
}

fn evaluate_window(state: DifficultyState, window: StreakTally) -> (DifficultyState, Transition) {
    let progress = state.progress;

    if window.incorrect() == 0 {
        let options = promotion_options(&progress);
        tracing::info!(
            current_level = progress.level().get(),
            "perfect streak, promotion offered"
        );
        let state = DifficultyState {
            phase: DifficultyPhase::AwaitingPromotionChoice,
            ..state
        };
        return (state, Transition::Promotion { options });
    }

    let from = progress.level();
    if window.correct() < 2 && !from.is_floor() {
        let to = from.lowered();
        let progress = progress.with_level(to);
        tracing::info!(from = from.get(), to = to.get(), "weak streak, level lowered");
        let (phase, offer) = match state.policy {
            DemotionPolicy::Offer => (
                DifficultyPhase::AwaitingDemotionChoice,
                Some(demotion_options(&progress)),
            ),
            DemotionPolicy::Immediate => (DifficultyPhase::Active, None),
        };
        let state = DifficultyState {
            progress,
            phase,
            policy: state.policy,
        };
        return (state, Transition::Demotion { from, to, offer });
    }

    tracing::debug!(
        correct = window.correct(),
        incorrect = window.incorrect(),
        "streak window closed without transition"
    );
    (state, Transition::Continue)
}

/// Promotion knobs enabled for `progress`.
#[must_use]
pub fn promotion_options(progress: &PlayerProgress) -> PromotionOptions {
    PromotionOptions {
        more_dots: true,
        less_time: true,
        faster_drift: !progress.drift_speed().is_at_max(),
    }
}

/// Demotion knobs enabled for `progress`.
#[must_use]
pub fn demotion_options(progress: &PlayerProgress) -> DemotionOptions {
    DemotionOptions {
        down_level: !progress.level().is_floor(),
        more_time: true,
        slower_drift: progress.drift_speed().is_enabled(),
    }
}

/// Resolves a pending promotion with `choice`.
///
/// # Errors
///
/// Returns [`ChoiceRejection::NotAwaitingPromotion`] when no promotion is
/// pending and [`ChoiceRejection::PromotionUnavailable`] when the knob is
/// disabled. The state is unchanged in both cases.
pub fn choose_promotion(
    state: DifficultyState,
    choice: PromotionChoice,
) -> Result<(DifficultyState, ChoiceOutcome), ChoiceRejection> {
    if state.phase != DifficultyPhase::AwaitingPromotionChoice {
        return Err(ChoiceRejection::NotAwaitingPromotion);
    }
    let progress = state.progress;
    if !promotion_options(&progress).allows(choice) {
        return Err(ChoiceRejection::PromotionUnavailable(choice));
    }

    let (progress, outcome) = match choice {
        PromotionChoice::MoreDots => {
            let level = progress.level().raised();
            (progress.with_level(level), ChoiceOutcome::LevelChanged(level))
        }
        PromotionChoice::LessTime => match progress.time_limit().shortened() {
            Some(limit) => (
                progress.with_time_limit(limit),
                ChoiceOutcome::TimeLimitChanged(limit),
            ),
            None => {
                tracing::info!("can't decrease time below one second");
                (progress, ChoiceOutcome::TimeLimitAtFloor)
            }
        },
        PromotionChoice::FasterDrift => {
            let speed = progress.drift_speed().faster();
            (
                progress.with_drift_speed(speed),
                ChoiceOutcome::DriftSpeedChanged(speed),
            )
        }
    };

    Ok((resumed(state, progress), outcome))
}

/// Resolves a pending demotion with `choice`.
///
/// # Errors
///
/// Returns [`ChoiceRejection::NotAwaitingDemotion`] when no demotion is
/// pending and [`ChoiceRejection::DemotionUnavailable`] when the knob is
/// disabled. The state is unchanged in both cases.
pub fn choose_demotion(
    state: DifficultyState,
    choice: DemotionChoice,
) -> Result<(DifficultyState, ChoiceOutcome), ChoiceRejection> {
    if state.phase != DifficultyPhase::AwaitingDemotionChoice {
        return Err(ChoiceRejection::NotAwaitingDemotion);
    }
    let progress = state.progress;
    if !demotion_options(&progress).allows(choice) {
        return Err(ChoiceRejection::DemotionUnavailable(choice));
    }

    let (progress, outcome) = match choice {
        DemotionChoice::DownLevel => {
            let level = progress.level().lowered();
            (progress.with_level(level), ChoiceOutcome::LevelChanged(level))
        }
        DemotionChoice::MoreTime => {
            let limit = progress.time_limit().lengthened();
            (
                progress.with_time_limit(limit),
                ChoiceOutcome::TimeLimitChanged(limit),
            )
        }
        DemotionChoice::SlowerDrift => {
            let speed = progress.drift_speed().slower();
            (
                progress.with_drift_speed(speed),
                ChoiceOutcome::DriftSpeedChanged(speed),
            )
        }
    };

    Ok((resumed(state, progress), outcome))
}

/// Closes a pending dialog without changing any knob.
///
/// # Errors
///
/// Returns [`ChoiceRejection::NothingPending`] when the machine is active.
pub fn dismiss(state: DifficultyState) -> Result<DifficultyState, ChoiceRejection> {
    if !state.is_awaiting_choice() {
        return Err(ChoiceRejection::NothingPending);
    }
    Ok(resumed(state, state.progress))
}

fn resumed(state: DifficultyState, progress: PlayerProgress) -> DifficultyState {
    DifficultyState {
        progress,
        phase: DifficultyPhase::Active,
        policy: state.policy,
    }
}
