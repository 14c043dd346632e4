//! Binary rhythm patterns and the generator families that produce them.
//!
//! Every generator is a pure function of small integer parameters. Step counts
//! are clamped to `1..=MAX_STEPS` and onset counts to `0..=steps`.

mod accent;
mod barlow;
mod codec;
mod core;
mod euclidean;
mod morse;
mod polygon;
mod preset;
mod random;


pub use accent::{AccentMode, AccentSequence};
pub use barlow::{
    barlow, concentrate_step, dilute_step, indispensability, indispensability_table,
    ranked_positions, wolrab, Metric, MUSICAL_FRACTIONS,
};
pub use codec::{decode, Radix};
pub use core::{clamp_steps, CombineOp, Pattern, PatternError, MAX_STEPS};
pub use euclidean::{bjorklund, dilcue, euclidean};
pub use morse::{morse, morse_code};
pub use polygon::polygon;
pub use preset::{preset, PRESET_NAMES};
pub use random::{bell_curve_onsets, random, random_with, rng_for};
