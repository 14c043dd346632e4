//! Barlow indispensability scoring and the Barlow / Wolrab generators.
//!
//! Scores are a heuristic metric hierarchy: the downbeat is always strongest,
//! positions that divide the bar evenly or sit on common musical fractions
//! follow, and the remaining positions get a symmetric fallback with a small
//! deterministic jitter so that no two positions tie by accident.

use super::core::{clamp_steps, Pattern};

/// Score of position 0
pub const DOWNBEAT_SCORE: f64 = 10.0;
/// Multiplier for the `gcd(position, steps) / steps` term
pub const GCD_SCALE: f64 = 10.0;
pub const HALF_WEIGHT: f64 = 5.0;
pub const QUARTER_WEIGHT: f64 = 3.0;
pub const THIRD_WEIGHT: f64 = 2.5;
pub const EIGHTH_WEIGHT: f64 = 1.5;
pub const SIXTH_WEIGHT: f64 = 1.0;
/// Minimum score of the last position (the pickup into the next bar)
pub const PICKUP_SCORE: f64 = 7.0;

/// Scores below this fall through to the symmetry term
const FALLBACK_THRESHOLD: f64 = 0.5;
const CENTER_WEIGHT: f64 = 0.3;
const EDGE_WEIGHT: f64 = 0.2;
const JITTER_MOD3: f64 = 0.01;
const JITTER_MOD5: f64 = 0.005;
const FLOOR_BASE: f64 = 0.1;
const FLOOR_SLOPE: f64 = 0.001;

/// Canonical fractions of the bar and the weight each one carries.
/// Order matters: on equal distance the earlier entry wins.
pub const MUSICAL_FRACTIONS: [(f64, f64); 11] = [
    (1.0 / 2.0, HALF_WEIGHT),
    (1.0 / 4.0, QUARTER_WEIGHT),
    (3.0 / 4.0, QUARTER_WEIGHT),
    (1.0 / 3.0, THIRD_WEIGHT),
    (2.0 / 3.0, THIRD_WEIGHT),
    (1.0 / 8.0, EIGHTH_WEIGHT),
    (3.0 / 8.0, EIGHTH_WEIGHT),
    (5.0 / 8.0, EIGHTH_WEIGHT),
    (7.0 / 8.0, EIGHTH_WEIGHT),
    (1.0 / 6.0, SIXTH_WEIGHT),
    (5.0 / 6.0, SIXTH_WEIGHT),
];

/// Which end of the indispensability ranking a generator prefers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Metric {
    /// Most indispensable positions first
    Barlow,
    /// Least indispensable positions first
    Wolrab,
}

/// Indispensability of `position` (0-indexed) within a bar of `steps` steps
pub fn indispensability(position: usize, steps: usize) -> f64 {
    if position == 0 {
        return DOWNBEAT_SCORE;
    }
    let steps_f = steps as f64;
    let mut score = 0.0;

    let divisor = gcd(position, steps);
    if divisor > 1 {
        score = divisor as f64 / steps_f * GCD_SCALE;
    }

    let ratio = position as f64 / steps_f;
    let mut closest = f64::INFINITY;
    let mut fraction_weight = 0.0;
    for &(fraction, weight) in MUSICAL_FRACTIONS.iter() {
        let distance = (ratio - fraction).abs();
        if distance < closest {
            closest = distance;
            fraction_weight = weight;
        }
    }
    if closest <= 0.5 / steps_f {
        score = score.max(fraction_weight);
    }

    if score < FALLBACK_THRESHOLD {
        let half = steps_f / 2.0;
        let center_distance = (position as f64 - half).abs() / half;
        let edge_distance = position.min(steps - position) as f64 / half;
        score = (1.0 - center_distance * CENTER_WEIGHT) + edge_distance * EDGE_WEIGHT;
        score += (position % 3) as f64 * JITTER_MOD3 + (position % 5) as f64 * JITTER_MOD5;
    }

    if position == steps - 1 {
        score = score.max(PICKUP_SCORE);
    }

    score.max(FLOOR_BASE + position as f64 * FLOOR_SLOPE)
}

/// Scores for every position of a `steps`-step bar
pub fn indispensability_table(steps: usize) -> Vec<f64> {
    (0..steps).map(|p| indispensability(p, steps)).collect()
}

/// Positions ordered by preference for `metric`: descending score for Barlow,
/// ascending for Wolrab. Ties keep the lower index first.
pub fn ranked_positions(steps: usize, metric: Metric) -> Vec<usize> {
    let scores = indispensability_table(steps);
    let mut positions: Vec<usize> = (0..steps).collect();
    match metric {
        Metric::Barlow => positions.sort_by(|&a, &b| scores[b].total_cmp(&scores[a])),
        Metric::Wolrab => positions.sort_by(|&a, &b| scores[a].total_cmp(&scores[b])),
    }
    positions
}

/// `B(onsets, steps)`: the `onsets` most indispensable positions
pub fn barlow(onsets: usize, steps: usize) -> Pattern {
    select(onsets, steps, Metric::Barlow)
}

/// `W(onsets, steps)`: the `onsets` least indispensable positions
pub fn wolrab(onsets: usize, steps: usize) -> Pattern {
    select(onsets, steps, Metric::Wolrab)
}

fn select(onsets: usize, steps: usize, metric: Metric) -> Pattern {
    let steps = clamp_steps(steps);
    let onsets = onsets.min(steps);
    let chosen: Vec<usize> = ranked_positions(steps, metric)
        .into_iter()
        .take(onsets)
        .collect();
    Pattern::from_positions(&chosen, steps)
}

/// Add exactly one onset: the empty position with the highest (Barlow) or
/// lowest (Wolrab) score. `None` when the pattern is already full.
pub fn concentrate_step(pattern: &Pattern, metric: Metric) -> Option<Pattern> {
    let position = ranked_positions(pattern.len(), metric)
        .into_iter()
        .find(|&p| !pattern.is_onset(p))?;
    let mut steps = pattern.steps().to_vec();
    steps[position] = true;
    Some(Pattern::from_steps(steps))
}

/// Remove exactly one onset: the onset with the lowest (Barlow) or highest
/// (Wolrab) score. Barlow keeps the downbeat until it is the last onset left.
/// `None` when the pattern has no onsets.
pub fn dilute_step(pattern: &Pattern, metric: Metric) -> Option<Pattern> {
    let scores = indispensability_table(pattern.len());
    let onsets = pattern.onset_positions();
    let keep_downbeat = metric == Metric::Barlow && onsets.len() > 1;

    let candidates = onsets.into_iter().filter(|&p| !(keep_downbeat && p == 0));
    // min_by returns the first of equal elements, so ties go to the lower index
    let position = match metric {
        Metric::Barlow => candidates.min_by(|&a, &b| scores[a].total_cmp(&scores[b])),
        Metric::Wolrab => candidates.min_by(|&a, &b| scores[b].total_cmp(&scores[a])),
    }?;

    let mut steps = pattern.steps().to_vec();
    steps[position] = false;
    Some(Pattern::from_steps(steps))
}

fn gcd(a: usize, b: usize) -> usize {
    num_integer::gcd(a, b)
}
