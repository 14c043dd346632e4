//! Seeded random placement and the bell-curve onset counts used for growth.

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg32;

use super::core::{clamp_steps, Pattern};

/// `R(onsets, steps, seed)`: `onsets` distinct positions drawn uniformly.
/// The same seed always yields the same pattern.
pub fn random(onsets: usize, steps: usize, seed: u64) -> Pattern {
    let mut rng = Pcg32::seed_from_u64(seed);
    random_with(onsets, steps, &mut rng)
}

/// Random placement driven by a caller-owned generator
pub fn random_with<R: Rng + ?Sized>(onsets: usize, steps: usize, rng: &mut R) -> Pattern {
    let steps = clamp_steps(steps);
    let onsets = onsets.min(steps);
    let positions = index::sample(rng, steps, onsets).into_vec();
    Pattern::from_positions(&positions, steps)
}

/// Onset count for a fresh block of `steps` positions, drawn from a normal
/// distribution centred on the block midpoint with `sigma = (steps - 2) / 6`.
/// Clamped to `1..=steps-1` so a block is never empty or full (a one-step
/// block always gets its single onset).
pub fn bell_curve_onsets<R: Rng + ?Sized>(steps: usize, rng: &mut R) -> usize {
    let mean = steps as f64 / 2.0;
    let sigma = (steps as f64 - 2.0).max(0.0) / 6.0;
    let drawn = Normal::new(mean, sigma)
        .map(|dist| dist.sample(rng))
        .unwrap_or(mean);
    let upper = steps.saturating_sub(1).max(1);
    (drawn.round().max(0.0) as usize).clamp(1, upper)
}

/// Derive a generator for a named stream from a base seed (FNV-1a over the name)
pub fn rng_for(seed: u64, name: &str) -> Pcg32 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
    let hash = name
        .bytes()
        .fold(FNV_OFFSET, |acc, b| (acc ^ b as u64).wrapping_mul(FNV_PRIME));
    Pcg32::seed_from_u64(seed ^ hash)
}
