#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Countdown and round-transition scheduling.
//!
//! The timer owns two single-handle schedules: a repeating one-second
//! countdown for the running round and a one-shot delay that requests the next
//! round once the current one is resolved. Every emitted command carries the
//! round the handle was armed for so the world can drop stale callbacks.

use dot_estimate_core::{Command, Event, RoundId, Schedule, COUNTDOWN_PERIOD, NEXT_ROUND_DELAY};

/// System that converts elapsed time into countdown and transition commands.
#[derive(Debug)]
pub struct RoundTimer {
    countdown: Schedule,
    transition: Schedule,
}

impl Default for RoundTimer {
    fn default() -> Self {
        Self {
            countdown: Schedule::repeating(COUNTDOWN_PERIOD),
            transition: Schedule::one_shot(NEXT_ROUND_DELAY),
        }
    }
}

impl RoundTimer {
    /// Round the countdown is currently armed for.
    #[must_use]
    pub fn countdown_armed_for(&self) -> Option<RoundId> {
        self.countdown.armed_for()
    }

    /// Round whose resolution is waiting for the transition delay.
    #[must_use]
    pub fn transition_pending_for(&self) -> Option<RoundId> {
        self.transition.armed_for()
    }

    /// Consumes world events and emits countdown and transition commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RoundStarted { round, .. } => {
                    let _ = self.transition.cancel();
                    if let Some(superseded) = self.countdown.arm(*round) {
                        tracing::debug!(
                            superseded = superseded.get(),
                            round = round.get(),
                            "countdown handle replaced"
                        );
                    }
                }
                Event::Resumed { round } => {
                    let _ = self.countdown.arm(*round);
                }
                Event::Paused { .. }
                | Event::GuessAccepted { .. }
                | Event::GuessSkipped { .. }
                | Event::RoundTimedOut { .. } => {
                    let _ = self.countdown.cancel();
                }
                Event::SessionStarted { .. } => {
                    let _ = self.countdown.cancel();
                    let _ = self.transition.cancel();
                }
                Event::NextRoundScheduled { after, delay } => {
                    let _ = self.transition.arm_with_interval(*after, *delay);
                }
                Event::TimeAdvanced { dt } => {
                    if let Some(round) = self.countdown.armed_for() {
                        for _ in 0..self.countdown.advance(*dt) {
                            out.push(Command::CountdownElapsed { round });
                        }
                    }
                    if let Some(after) = self.transition.armed_for() {
                        if self.transition.advance(*dt) > 0 {
                            out.push(Command::RequestNextRound { after });
                        }
                    }
                }
                _ => {}
            }
        }
    }
}
