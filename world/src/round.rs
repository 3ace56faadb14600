//! State of the round currently shown to the player.

use dot_estimate_core::{
    Decision, DriftPlacement, Entity, EntityStyle, GuessWindow, RoundId, RoundMessage, RoundPhase,
    TimeLimit,
};

/// Live round owned by the world.
///
/// The entity list is replaced wholesale when the next round begins; only
/// drift placements and appearance restyles mutate it in place.
#[derive(Clone, Debug)]
pub(crate) struct Round {
    id: RoundId,
    entities: Vec<Entity>,
    guess_window: GuessWindow,
    chosen: Option<u32>,
    phase: RoundPhase,
    remaining_seconds: u32,
}

/// Result of resolving a round with a player answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Answer {
    /// The answer was one of the candidates.
    Scored {
        guess: u32,
        decision: Decision,
        message: RoundMessage,
    },
    /// The answer was empty or not a candidate.
    Empty,
}

impl Round {
    pub(crate) fn new(
        id: RoundId,
        entities: Vec<Entity>,
        guess_window: GuessWindow,
        time_limit: TimeLimit,
    ) -> Self {
        Self {
            id,
            entities,
            guess_window,
            chosen: None,
            phase: RoundPhase::Running,
            remaining_seconds: time_limit.seconds(),
        }
    }

    pub(crate) const fn id(&self) -> RoundId {
        self.id
    }

    pub(crate) fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub(crate) const fn guess_window(&self) -> GuessWindow {
        self.guess_window
    }

    pub(crate) const fn chosen(&self) -> Option<u32> {
        self.chosen
    }

    pub(crate) const fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub(crate) const fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub(crate) fn true_count(&self) -> u32 {
        u32::try_from(self.entities.len()).unwrap_or(u32::MAX)
    }

    pub(crate) const fn is_running(&self) -> bool {
        matches!(self.phase, RoundPhase::Running)
    }

    /// Decrements the countdown by one second and reports the new value.
    /// Reaching zero times the round out.
    pub(crate) fn count_down(&mut self) -> u32 {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.phase = RoundPhase::TimedOut;
        }
        self.remaining_seconds
    }

    /// Resolves the round with the player's answer, freezing the countdown.
    pub(crate) fn answer(&mut self, guess: Option<u32>) -> Answer {
        self.phase = RoundPhase::Answered;
        let Some(guess) = guess.filter(|value| self.guess_window.contains(*value)) else {
            return Answer::Empty;
        };

        self.chosen = Some(guess);
        let true_count = self.true_count();
        if guess == true_count {
            Answer::Scored {
                guess,
                decision: Decision::Correct,
                message: RoundMessage::Correct,
            }
        } else {
            Answer::Scored {
                guess,
                decision: Decision::Incorrect,
                message: RoundMessage::Incorrect { true_count },
            }
        }
    }

    pub(crate) fn place(&mut self, placements: &[DriftPlacement]) {
        for placement in placements {
            if let Some(entity) = self.entity_mut(placement) {
                entity.position = placement.position;
                entity.drift = Some(placement.drift);
            }
        }
    }

    pub(crate) fn restyle(&mut self, styles: &[EntityStyle]) {
        for style in styles {
            if let Some(entity) = self
                .entities
                .iter_mut()
                .find(|entity| entity.id == style.entity)
            {
                entity.shape = style.shape;
                entity.color = style.color;
            }
        }
    }

    fn entity_mut(&mut self, placement: &DriftPlacement) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|entity| entity.id == placement.entity && entity.drift.is_some())
    }
}
