#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Drift system that moves entities on a fixed cadence while a round runs.

use dot_estimate_core::{
    AxisSign, Command, Drift, DriftPlacement, DriftSpeed, Event, Position, RoundId, RoundView,
    Schedule, DRIFT_PERIOD, LEFT_BOUND, TOP_BOUND,
};

/// Advances one entity by a single drift step, reflecting at the viewport
/// bounds.
///
/// Each axis reflects independently: a coordinate reaching zero or its bound
/// inverts the direction on that axis and is clamped back inside.
#[must_use]
pub fn step(position: Position, drift: Drift, speed: DriftSpeed) -> (Position, Drift) {
    let distance = speed.get() * drift.magnitude();
    let (top, sign_y) = reflect(
        position.top() + drift.sign_y().factor() * distance,
        TOP_BOUND,
        drift.sign_y(),
    );
    let (left, sign_x) = reflect(
        position.left() + drift.sign_x().factor() * distance,
        LEFT_BOUND,
        drift.sign_x(),
    );
    (Position::new(top, left), drift.with_signs(sign_x, sign_y))
}

fn reflect(value: f32, bound: f32, sign: AxisSign) -> (f32, AxisSign) {
    if value <= 0.0 || value >= bound {
        (value.clamp(0.0, bound), sign.flipped())
    } else {
        (value, sign)
    }
}

/// System that owns the drift schedule and publishes entity placements.
#[derive(Debug)]
pub struct DriftSimulator {
    schedule: Schedule,
}

impl Default for DriftSimulator {
    fn default() -> Self {
        Self {
            schedule: Schedule::repeating(DRIFT_PERIOD),
        }
    }
}

impl DriftSimulator {
    /// Round the drift schedule is currently armed for.
    #[must_use]
    pub fn armed_for(&self) -> Option<RoundId> {
        self.schedule.armed_for()
    }

    /// Consumes world events and the live round view to emit drift commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        round: Option<RoundView<'_>>,
        speed: DriftSpeed,
        out: &mut Vec<Command>,
    ) {
        let mut steps = 0;

        for event in events {
            match event {
                Event::RoundStarted {
                    round: started,
                    drifting,
                    ..
                } => {
                    if *drifting && speed.is_enabled() {
                        self.arm(*started);
                    } else {
                        let _ = self.schedule.cancel();
                    }
                }
                Event::Resumed { round: resumed } => {
                    if round.is_some_and(|view| view.id() == *resumed && view.has_drift())
                        && speed.is_enabled()
                    {
                        self.arm(*resumed);
                    }
                }
                Event::DriftSpeedChanged { speed: changed } => match round {
                    Some(view) if view.is_live() && view.has_drift() && changed.is_enabled() => {
                        self.arm(view.id());
                    }
                    _ => {
                        let _ = self.schedule.cancel();
                    }
                },
                Event::Paused { .. }
                | Event::RoundTimedOut { .. }
                | Event::GuessAccepted { .. }
                | Event::GuessSkipped { .. }
                | Event::SessionStarted { .. } => {
                    let _ = self.schedule.cancel();
                }
                Event::TimeAdvanced { dt } => {
                    steps += self.schedule.advance(*dt);
                }
                _ => {}
            }
        }

        if steps == 0 {
            return;
        }
        let Some(view) = round else {
            return;
        };
        if self.schedule.armed_for() != Some(view.id()) || !view.is_live() {
            return;
        }

        let placements: Vec<DriftPlacement> = view
            .entities()
            .iter()
            .filter_map(|entity| {
                let mut drift = entity.drift?;
                let mut position = entity.position;
                for _ in 0..steps {
                    (position, drift) = step(position, drift, speed);
                }
                Some(DriftPlacement {
                    entity: entity.id,
                    position,
                    drift,
                })
            })
            .collect();

        if !placements.is_empty() {
            out.push(Command::AdvanceDrift {
                round: view.id(),
                placements,
            });
        }
    }

    fn arm(&mut self, round: RoundId) {
        let superseded = self.schedule.arm(round);
        tracing::debug!(
            round = round.get(),
            superseded = superseded.map(|id| id.get()),
            "drift schedule armed"
        );
    }
}
