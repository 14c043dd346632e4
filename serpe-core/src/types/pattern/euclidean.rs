//! Bjorklund algorithm for Euclidean rhythm generation.

use super::core::{clamp_steps, Pattern};

/// Distribute `pulses` as evenly as possible across `steps` slots.
/// Returns a Vec<bool> where `true` = pulse, `false` = rest.
pub fn bjorklund(pulses: usize, steps: usize) -> Vec<bool> {
    if steps == 0 {
        return vec![];
    }
    if pulses >= steps {
        return vec![true; steps];
    }
    if pulses == 0 {
        return vec![false; steps];
    }

    // Pair groups off the way the Euclidean algorithm divides (pulses, steps - pulses)
    let mut pattern: Vec<Vec<bool>> = vec![vec![true]; pulses];
    let mut remainder: Vec<Vec<bool>> = vec![vec![false]; steps - pulses];

    while remainder.len() > 1 {
        let paired = pattern.len().min(remainder.len());
        let leftover_pattern = pattern.split_off(paired);
        let leftover_remainder = remainder.split_off(paired);

        for (group, tail) in pattern.iter_mut().zip(remainder) {
            group.extend(tail);
        }

        remainder = if leftover_pattern.is_empty() {
            leftover_remainder
        } else {
            leftover_pattern
        };
    }

    pattern.into_iter().chain(remainder).flatten().collect()
}

/// `E(onsets, steps)`: maximally even pattern, rotated so the first onset is on
/// the downbeat. Steps are clamped to `1..=128`, onsets to `0..=steps`.
pub fn euclidean(onsets: usize, steps: usize) -> Pattern {
    let steps = clamp_steps(steps);
    let onsets = onsets.min(steps);
    Pattern::from_steps(bjorklund(onsets, steps)).align_to_downbeat()
}

/// `D(onsets, steps)`: the anti-Euclidean complement,
/// `invert(E(steps - onsets, steps))`.
pub fn dilcue(onsets: usize, steps: usize) -> Pattern {
    let steps = clamp_steps(steps);
    let onsets = onsets.min(steps);
    euclidean(steps - onsets, steps).invert()
}
