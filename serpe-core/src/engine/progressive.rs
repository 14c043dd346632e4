//! Per-trigger evolution of a pattern: offset, lengthening and onset-count
//! transformation.

use rand_pcg::Pcg32;

use crate::types::pattern::{
    bell_curve_onsets, concentrate_step, dilcue, dilute_step, euclidean, random_with, rng_for,
    MAX_STEPS,
};
use crate::types::{Metric, Pattern};

/// How a transformation reaches its next onset count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// Regenerate `E(n, steps)` from scratch
    Euclidean,
    /// Regenerate `D(n, steps)` from scratch
    Dilcue,
    /// Flip a single position of the previous pattern by indispensability
    Flip(Metric),
}

/// The evolution a progressive suffix asks for, with its parameters resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Progression {
    Offset { step: i64 },
    Lengthen { block: usize },
    Transform { target: usize, strategy: Strategy },
}

/// Coarse kind, for summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvolutionKind {
    Offset,
    Lengthening,
    Transformation,
}

impl Progression {
    pub fn kind(&self) -> EvolutionKind {
        match self {
            Progression::Offset { .. } => EvolutionKind::Offset,
            Progression::Lengthen { .. } => EvolutionKind::Lengthening,
            Progression::Transform { .. } => EvolutionKind::Transformation,
        }
    }
}

/// Mutable evolution state for one progressive expression.
///
/// Only [`EvolutionRecord::advance`] changes the derived pattern; everything
/// else reads it.
#[derive(Debug, Clone)]
pub struct EvolutionRecord {
    base: Pattern,
    progression: Progression,
    current: Pattern,
    offset: i64,
    onsets: usize,
    trigger_count: u64,
    seed: u64,
    rng: Pcg32,
}

impl EvolutionRecord {
    /// Start evolving from `base`. `seed` only matters for lengthening.
    pub fn new(base: Pattern, progression: Progression, seed: u64) -> Self {
        let onsets = base.onset_count();
        EvolutionRecord {
            current: base.clone(),
            base,
            progression,
            offset: 0,
            onsets,
            trigger_count: 0,
            seed,
            rng: rng_for(seed, "lengthen"),
        }
    }

    pub fn base(&self) -> &Pattern {
        &self.base
    }

    pub fn current(&self) -> &Pattern {
        &self.current
    }

    pub fn progression(&self) -> Progression {
        self.progression
    }

    pub fn kind(&self) -> EvolutionKind {
        self.progression.kind()
    }

    pub fn trigger_count(&self) -> u64 {
        self.trigger_count
    }

    /// Accumulated rotation (offset evolutions only)
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Whether further triggers can still change the pattern
    pub fn is_settled(&self) -> bool {
        match self.progression {
            Progression::Offset { step } => step == 0,
            Progression::Lengthen { block } => block == 0 || self.current.len() >= MAX_STEPS,
            Progression::Transform { target, .. } => self.onsets == target.min(self.base.len()),
        }
    }

    /// Apply one trigger. Returns whether the pattern changed.
    pub fn advance(&mut self) -> bool {
        self.trigger_count += 1;
        let next = match self.progression {
            Progression::Offset { step } => self.next_offset(step),
            Progression::Lengthen { block } => self.next_lengthening(block),
            Progression::Transform { target, strategy } => self.next_transformation(target, strategy),
        };

        match next {
            Some(pattern) if pattern != self.current => {
                tracing::debug!(
                    kind = ?self.kind(),
                    trigger = self.trigger_count,
                    pattern = %pattern,
                    "evolved"
                );
                self.current = pattern;
                true
            }
            _ => {
                tracing::debug!(kind = ?self.kind(), trigger = self.trigger_count, "no change");
                false
            }
        }
    }

    /// Back to the base pattern, as if never triggered
    pub fn reset(&mut self) {
        self.current = self.base.clone();
        self.offset = 0;
        self.onsets = self.base.onset_count();
        self.trigger_count = 0;
        self.rng = rng_for(self.seed, "lengthen");
    }

    fn next_offset(&mut self, step: i64) -> Option<Pattern> {
        if step == 0 {
            return None;
        }
        let len = self.base.len() as i64;
        self.offset = (self.offset + step.rem_euclid(len)).rem_euclid(len);
        Some(self.base.rotate(self.offset))
    }

    fn next_lengthening(&mut self, block: usize) -> Option<Pattern> {
        let room = MAX_STEPS - self.current.len();
        let size = block.min(room);
        if size == 0 {
            return None;
        }
        let onsets = bell_curve_onsets(size, &mut self.rng);
        let addition = random_with(onsets, size, &mut self.rng);
        self.current.concat(&addition).ok()
    }

    fn next_transformation(&mut self, target: usize, strategy: Strategy) -> Option<Pattern> {
        let steps = self.current.len();
        let target = target.min(steps);
        if self.onsets == target {
            return None;
        }
        let adding = target > self.onsets;
        self.onsets = if adding { self.onsets + 1 } else { self.onsets - 1 };

        let pattern = match strategy {
            Strategy::Euclidean => euclidean(self.onsets, steps),
            Strategy::Dilcue => dilcue(self.onsets, steps),
            Strategy::Flip(metric) if adding => concentrate_step(&self.current, metric)?,
            Strategy::Flip(metric) => dilute_step(&self.current, metric)?,
        };
        Some(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::pattern::barlow;

    fn transform(target: usize, strategy: Strategy) -> Progression {
        Progression::Transform { target, strategy }
    }

    #[test]
    fn test_euclidean_transformation_to_full() {
        let mut record = EvolutionRecord::new(euclidean(1, 8), transform(8, Strategy::Euclidean), 0);
        for expected in 2..=8 {
            assert!(record.advance());
            assert_eq!(record.current().onset_count(), expected);
            assert_eq!(record.current(), &euclidean(expected, 8));
        }
        assert_eq!(record.current().to_string(), "11111111");
        assert!(record.is_settled());
    }

    #[test]
    fn test_transformation_freezes_at_target() {
        let mut record = EvolutionRecord::new(euclidean(3, 8), transform(4, Strategy::Euclidean), 0);
        assert!(record.advance());
        let settled = record.current().clone();
        for _ in 0..5 {
            assert!(!record.advance());
            assert_eq!(record.current(), &settled);
        }
        assert_eq!(record.trigger_count(), 6);
    }

    #[test]
    fn test_barlow_flips_one_position_each_step() {
        let start = barlow(1, 8);
        let mut record = EvolutionRecord::new(start, transform(4, Strategy::Flip(Metric::Barlow)), 0);
        let mut previous = record.current().clone();
        for _ in 0..3 {
            record.advance();
            let flipped = previous
                .iter()
                .zip(record.current().iter())
                .filter(|(a, b)| a != b)
                .count();
            assert_eq!(flipped, 1);
            previous = record.current().clone();
        }
        assert_eq!(record.current().to_string(), "10101001");
    }

    #[test]
    fn test_dilution_towards_zero() {
        let mut record = EvolutionRecord::new(
            "10001001".parse().unwrap(),
            transform(0, Strategy::Flip(Metric::Barlow)),
            0,
        );
        record.advance();
        assert_eq!(record.current().to_string(), "10000001");
        record.advance();
        record.advance();
        assert_eq!(record.current().onset_count(), 0);
        assert!(!record.advance());
    }

    #[test]
    fn test_dilcue_regenerates() {
        let mut record = EvolutionRecord::new(dilcue(2, 8), transform(3, Strategy::Dilcue), 0);
        record.advance();
        assert_eq!(record.current(), &dilcue(3, 8));
    }

    #[test]
    fn test_offset_accumulates() {
        let base = euclidean(3, 8);
        let mut record = EvolutionRecord::new(base.clone(), Progression::Offset { step: 1 }, 0);
        record.advance();
        assert_eq!(record.current(), &base.rotate(1));
        record.advance();
        assert_eq!(record.current(), &base.rotate(2));
        assert_eq!(record.offset(), 2);
        for _ in 0..6 {
            record.advance();
        }
        assert_eq!(record.current(), &base);
    }

    #[test]
    fn test_negative_offset() {
        let base = euclidean(3, 8);
        let mut record = EvolutionRecord::new(base.clone(), Progression::Offset { step: -2 }, 0);
        record.advance();
        assert_eq!(record.current(), &base.rotate(-2));
    }

    #[test]
    fn test_zero_offset_never_changes() {
        let base = euclidean(3, 8);
        let mut record = EvolutionRecord::new(base.clone(), Progression::Offset { step: 0 }, 0);
        for _ in 0..20 {
            assert!(!record.advance());
        }
        assert_eq!(record.current(), &base);
    }

    #[test]
    fn test_lengthening_is_monotonic() {
        let base = euclidean(3, 8);
        let mut record = EvolutionRecord::new(base.clone(), Progression::Lengthen { block: 4 }, 11);
        let mut previous = record.current().clone();
        for round in 1..=5 {
            record.advance();
            let current = record.current();
            assert_eq!(current.len(), 8 + 4 * round);
            assert_eq!(&current.steps()[..previous.len()], previous.steps());
            let block = &current.steps()[previous.len()..];
            let onsets = block.iter().filter(|&&s| s).count();
            assert!(onsets >= 1 && onsets <= 3);
            previous = current.clone();
        }
    }

    #[test]
    fn test_lengthening_stops_at_max() {
        let mut record =
            EvolutionRecord::new(Pattern::rests(120), Progression::Lengthen { block: 16 }, 1);
        record.advance();
        assert_eq!(record.current().len(), MAX_STEPS);
        assert!(!record.advance());
        assert!(record.is_settled());
    }

    #[test]
    fn test_reset_replays_identically() {
        let mut record = EvolutionRecord::new(euclidean(3, 8), Progression::Lengthen { block: 5 }, 4);
        record.advance();
        record.advance();
        let grown = record.current().clone();
        record.reset();
        assert_eq!(record.current(), &euclidean(3, 8));
        assert_eq!(record.trigger_count(), 0);
        record.advance();
        record.advance();
        assert_eq!(record.current(), &grown);
    }
}
