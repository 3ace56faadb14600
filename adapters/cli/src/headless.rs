//! Windowless sessions played by a scripted player.

use std::{fmt, time::Duration};

use anyhow::{anyhow, ensure, Result};
use dot_estimate_core::{
    DemotionChoice, DemotionOptions, DifficultyPhase, Event, PromotionChoice, PromotionOptions,
    SessionSnapshot, NEXT_ROUND_DELAY,
};
use dot_estimate_system_session::GameController;
use dot_estimate_world::query;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::config::HeadlessConfig;

const PLAYER_STREAM: u64 = 0x91a7;

/// Simulated player answering with a fixed accuracy after a normally
/// distributed delay.
#[derive(Debug)]
pub(crate) struct ScriptedPlayer {
    rng: ChaCha8Rng,
    accuracy: f64,
    reaction: Normal<f64>,
}

impl ScriptedPlayer {
    pub(crate) fn new(seed: u64, profile: &HeadlessConfig) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&profile.accuracy),
            "accuracy must lie within [0, 1] (received {})",
            profile.accuracy
        );
        let reaction = Normal::new(
            profile.reaction_ms as f64,
            profile.reaction_jitter_ms as f64,
        )
        .map_err(|error| anyhow!("invalid reaction time distribution: {error}"))?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(PLAYER_STREAM);

        Ok(Self {
            rng,
            accuracy: profile.accuracy,
            reaction,
        })
    }

    fn reaction_time(&mut self) -> Duration {
        let millis = self.reaction.sample(&mut self.rng).max(0.0).round();
        Duration::from_millis(millis as u64)
    }

    fn pick_guess(&mut self, truth: u32, candidates: &[u32]) -> u32 {
        if self.rng.gen_bool(self.accuracy) {
            return truth;
        }

        let wrong: Vec<u32> = candidates
            .iter()
            .copied()
            .filter(|candidate| *candidate != truth)
            .collect();
        wrong.choose(&mut self.rng).copied().unwrap_or(truth)
    }

    fn pick_promotion(&mut self, options: PromotionOptions) -> Option<PromotionChoice> {
        let enabled: Vec<_> = [
            PromotionChoice::MoreDots,
            PromotionChoice::LessTime,
            PromotionChoice::FasterDrift,
        ]
        .into_iter()
        .filter(|choice| options.allows(*choice))
        .collect();
        enabled.choose(&mut self.rng).copied()
    }

    fn pick_demotion(&mut self, options: DemotionOptions) -> Option<DemotionChoice> {
        let enabled: Vec<_> = [
            DemotionChoice::DownLevel,
            DemotionChoice::MoreTime,
            DemotionChoice::SlowerDrift,
        ]
        .into_iter()
        .filter(|choice| options.allows(*choice))
        .collect();
        enabled.choose(&mut self.rng).copied()
    }
}

/// Totals printed after a headless session.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct SessionSummary {
    rounds: u32,
    answered: u32,
    correct: u32,
    skipped: u32,
    timed_out: u32,
    promotions: u32,
    demotions: u32,
    final_level: u32,
    final_time_limit: u32,
    final_drift_speed: f32,
}

impl SessionSummary {
    fn absorb(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::RoundStarted { .. } => self.rounds += 1,
                Event::GuessAccepted { decision, .. } => {
                    self.answered += 1;
                    if decision.is_correct() {
                        self.correct += 1;
                    }
                }
                Event::GuessSkipped { .. } => self.skipped += 1,
                Event::RoundTimedOut { .. } => self.timed_out += 1,
                Event::PromotionOffered { .. } => self.promotions += 1,
                Event::Demoted { .. } => self.demotions += 1,
                _ => {}
            }
        }
    }

    fn finish(mut self, snapshot: &SessionSnapshot) -> Self {
        let progress = snapshot.progress;
        self.final_level = progress.level().get();
        self.final_time_limit = progress.time_limit().seconds();
        self.final_drift_speed = progress.drift_speed().get();
        self
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SESSION SUMMARY ===")?;
        writeln!(f, "  Rounds:      {}", self.rounds)?;
        writeln!(f, "  Score:       {} / {}", self.correct, self.answered)?;
        writeln!(f, "  Skipped:     {}", self.skipped)?;
        writeln!(f, "  Timed out:   {}", self.timed_out)?;
        writeln!(f, "  Promotions:  {}", self.promotions)?;
        writeln!(f, "  Demotions:   {}", self.demotions)?;
        writeln!(f, "  Final level: {}", self.final_level)?;
        writeln!(f, "  Time limit:  {}s", self.final_time_limit)?;
        write!(f, "  Drift speed: {:.1}", self.final_drift_speed)
    }
}

/// Plays `rounds` answers (or timeouts) and reports the outcome.
pub(crate) fn run(
    controller: &mut GameController,
    player: &mut ScriptedPlayer,
    rounds: u32,
) -> SessionSummary {
    let mut summary = SessionSummary::default();
    controller.start_session();

    for _ in 0..rounds {
        resolve_pending_choice(controller, player);

        let snapshot = controller.snapshot();
        let Some(truth) = query::true_count(controller.world()) else {
            tracing::warn!("no round available; stopping early");
            break;
        };

        let reaction = player.reaction_time();
        let time_left = Duration::from_secs(u64::from(snapshot.remaining_seconds));
        if reaction < time_left {
            controller.advance(reaction);
            let guess = player.pick_guess(truth, &snapshot.guess_candidates);
            controller.submit_guess(Some(guess));
        } else {
            controller.timeout();
        }
        controller.advance(NEXT_ROUND_DELAY);
        summary.absorb(&controller.drain_events());
    }

    summary.finish(&controller.snapshot())
}

fn resolve_pending_choice(controller: &mut GameController, player: &mut ScriptedPlayer) {
    let snapshot = controller.snapshot();
    match snapshot.phase {
        DifficultyPhase::Active => {}
        DifficultyPhase::AwaitingPromotionChoice => {
            match snapshot
                .promotion_options
                .and_then(|options| player.pick_promotion(options))
            {
                Some(choice) => controller.choose_promotion(choice),
                None => controller.dismiss_choice(),
            }
        }
        DifficultyPhase::AwaitingDemotionChoice => {
            match snapshot
                .demotion_options
                .and_then(|options| player.pick_demotion(options))
            {
                Some(choice) => controller.choose_demotion(choice),
                None => controller.dismiss_choice(),
            }
        }
    }
}
