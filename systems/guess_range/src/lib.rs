#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Selection of the candidate answers offered for a round.

use std::ops::RangeInclusive;

use dot_estimate_core::{GuessWindow, MAX_GUESS_CANDIDATES};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Caller precondition violations detected while selecting a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GuessRangeError {
    /// The lower bound exceeded the upper bound.
    #[error("minimum dot count {min} exceeds maximum {max}")]
    InvertedRange {
        /// Requested lower bound.
        min: u32,
        /// Requested upper bound.
        max: u32,
    },
    /// The true count lies outside the range.
    #[error("true count {true_count} lies outside {min}..={max}")]
    CountOutOfRange {
        /// Number of entities in the round.
        true_count: u32,
        /// Lower bound of the range.
        min: u32,
        /// Upper bound of the range.
        max: u32,
    },
}

/// Number of candidates offered for a range: its span capped at
/// [`MAX_GUESS_CANDIDATES`].
///
/// # Errors
///
/// Returns [`GuessRangeError::InvertedRange`] when `min > max`.
pub fn window_size(min: u32, max: u32) -> Result<u32, GuessRangeError> {
    if min > max {
        return Err(GuessRangeError::InvertedRange { min, max });
    }
    Ok((max - min).saturating_add(1).min(MAX_GUESS_CANDIDATES))
}

/// Every window start that keeps `true_count` inside a window of
/// [`window_size`] candidates lying within `min..=max`.
///
/// # Errors
///
/// Returns an error when the range is inverted or does not contain
/// `true_count`.
pub fn valid_starts(
    true_count: u32,
    min: u32,
    max: u32,
) -> Result<RangeInclusive<u32>, GuessRangeError> {
    let size = window_size(min, max)?;
    if true_count < min || true_count > max {
        return Err(GuessRangeError::CountOutOfRange {
            true_count,
            min,
            max,
        });
    }

    let lower = min.max((true_count + 1).saturating_sub(size));
    let upper = true_count.min(max + 1 - size);
    Ok(lower..=upper)
}

/// Seeded selector choosing uniformly among the valid windows.
#[derive(Clone, Debug)]
pub struct GuessRangeSelector {
    rng: ChaCha8Rng,
}

impl GuessRangeSelector {
    /// Creates a selector whose choices are reproducible from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Picks one window containing `true_count` within `min..=max`.
    ///
    /// # Errors
    ///
    /// Propagates the precondition violations reported by [`valid_starts`].
    pub fn select(
        &mut self,
        true_count: u32,
        min: u32,
        max: u32,
    ) -> Result<GuessWindow, GuessRangeError> {
        let size = window_size(min, max)?;
        let starts = valid_starts(true_count, min, max)?;
        let start = self.rng.gen_range(starts);
        Ok(GuessWindow::new(start, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn level_one_offers_every_count() {
        let mut selector = GuessRangeSelector::new(7);
        let window = selector.select(3, 1, 4).expect("valid range");

        assert_eq!(window.values(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn level_five_offers_the_whole_span() {
        let mut selector = GuessRangeSelector::new(11);
        let window = selector.select(7, 5, 10).expect("valid range");

        assert_eq!(window.values(), vec![5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn single_count_range_yields_single_candidate() {
        let mut selector = GuessRangeSelector::new(3);
        let window = selector.select(9, 9, 9).expect("valid range");

        assert_eq!(window.values(), vec![9]);
    }

    #[test]
    fn wide_ranges_are_capped_at_eight_candidates() {
        assert_eq!(window_size(10, 20), Ok(8));
        assert_eq!(valid_starts(10, 10, 20), Ok(10..=10));
        assert_eq!(valid_starts(20, 10, 20), Ok(13..=13));
        assert_eq!(valid_starts(15, 10, 20), Ok(10..=13));
    }

    #[test]
    fn precondition_violations_are_reported() {
        let mut selector = GuessRangeSelector::new(0);

        assert_eq!(
            selector.select(5, 6, 5),
            Err(GuessRangeError::InvertedRange { min: 6, max: 5 })
        );
        assert_eq!(
            selector.select(2, 3, 7),
            Err(GuessRangeError::CountOutOfRange {
                true_count: 2,
                min: 3,
                max: 7
            })
        );
    }

    #[test]
    fn identical_seeds_choose_identical_windows() {
        let mut first = GuessRangeSelector::new(42);
        let mut second = GuessRangeSelector::new(42);

        for count in 10..=30 {
            assert_eq!(first.select(count, 10, 30), second.select(count, 10, 30));
        }
    }

    proptest! {
        #[test]
        fn window_contains_count_within_range(
            min in 0u32..500,
            span in 0u32..40,
            offset in 0u32..40,
            seed in any::<u64>(),
        ) {
            let max = min + span;
            let true_count = min + offset % (span + 1);
            let mut selector = GuessRangeSelector::new(seed);

            let window = selector.select(true_count, min, max).expect("valid input");

            prop_assert!(window.contains(true_count));
            prop_assert_eq!(window.len(), (span + 1).min(MAX_GUESS_CANDIDATES));
            prop_assert!(window.start() >= min);
            prop_assert!(window.end().expect("non-empty window") <= max);
        }
    }
}
