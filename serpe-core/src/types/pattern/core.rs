//! Core Pattern struct and implementation.

use num_integer::Integer;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest pattern the engine will produce or accept.
pub const MAX_STEPS: usize = 128;

/// Errors raised when building a pattern directly (outside the notation parser)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern length {0} is outside 1..={MAX_STEPS}")]
    Length(usize),
    #[error("invalid digit '{0}'")]
    InvalidDigit(char),
    #[error("no digits to decode")]
    NoDigits,
    #[error("decimal value {0} does not fit in {MAX_STEPS} steps")]
    Overflow(String),
    #[error("combined length {0} exceeds {MAX_STEPS} steps")]
    CombinedTooLong(usize),
}

/// How two patterns are merged by [`Pattern::combine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombineOp {
    /// Logical OR (`A + B`)
    Add,
    /// `A AND NOT B` (`A - B`)
    Subtract,
}

/// An ordered, fixed-length sequence of onsets (`true`) and rests (`false`).
///
/// Length is always within `1..=MAX_STEPS`. Patterns are never mutated in
/// place by the engine: every transformation returns a new value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pattern {
    steps: Vec<bool>,
}

impl Pattern {
    /// Build a pattern, rejecting lengths outside `1..=MAX_STEPS`
    pub fn new(steps: Vec<bool>) -> Result<Self, PatternError> {
        if steps.is_empty() || steps.len() > MAX_STEPS {
            return Err(PatternError::Length(steps.len()));
        }
        Ok(Pattern { steps })
    }

    /// Internal constructor for callers that already respect the length bound
    pub(crate) fn from_steps(steps: Vec<bool>) -> Self {
        debug_assert!(!steps.is_empty() && steps.len() <= MAX_STEPS);
        Pattern { steps }
    }

    /// All-rest pattern. `len` is clamped to `1..=MAX_STEPS`.
    pub fn rests(len: usize) -> Self {
        Pattern::from_steps(vec![false; clamp_steps(len)])
    }

    /// All-onset pattern. `len` is clamped to `1..=MAX_STEPS`.
    pub fn onsets(len: usize) -> Self {
        Pattern::from_steps(vec![true; clamp_steps(len)])
    }

    /// Build from onset positions; positions outside `0..len` are ignored
    pub fn from_positions(positions: &[usize], len: usize) -> Self {
        let mut steps = vec![false; clamp_steps(len)];
        for &pos in positions {
            if let Some(step) = steps.get_mut(pos) {
                *step = true;
            }
        }
        Pattern::from_steps(steps)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[bool] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<bool> {
        self.steps
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.steps.iter().copied()
    }

    pub fn is_onset(&self, index: usize) -> bool {
        self.steps.get(index).copied().unwrap_or(false)
    }

    pub fn onset_count(&self) -> usize {
        self.steps.iter().filter(|&&s| s).count()
    }

    pub fn onset_positions(&self) -> Vec<usize> {
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(i, &s)| s.then_some(i))
            .collect()
    }

    /// Rotate by `offset` steps. Positive offsets move every step later:
    /// `out[(i + offset) mod len] = self[i]`.
    pub fn rotate(&self, offset: i64) -> Pattern {
        let len = self.len() as i64;
        let shift = offset.rem_euclid(len) as usize;
        if shift == 0 {
            return self.clone();
        }
        let mut steps = self.steps.clone();
        steps.rotate_right(shift);
        Pattern::from_steps(steps)
    }

    /// Rotate so that the first onset lands on step 0 (no-op without onsets)
    pub fn align_to_downbeat(&self) -> Pattern {
        match self.steps.iter().position(|&s| s) {
            Some(first) if first > 0 => self.rotate(-(first as i64)),
            _ => self.clone(),
        }
    }

    /// Bitwise complement
    pub fn invert(&self) -> Pattern {
        Pattern::from_steps(self.steps.iter().map(|s| !s).collect())
    }

    pub fn reverse(&self) -> Pattern {
        let mut steps = self.steps.clone();
        steps.reverse();
        Pattern::from_steps(steps)
    }

    /// Pad with rests or truncate to `len` (clamped to `1..=MAX_STEPS`)
    pub fn resize(&self, len: usize) -> Pattern {
        let mut steps = self.steps.clone();
        steps.resize(clamp_steps(len), false);
        Pattern::from_steps(steps)
    }

    /// Repeat cyclically until `len` steps (clamped to `1..=MAX_STEPS`)
    pub fn expand_cyclic(&self, len: usize) -> Pattern {
        let len = clamp_steps(len);
        Pattern::from_steps((0..len).map(|i| self.steps[i % self.len()]).collect())
    }

    /// Append `other`, failing when the result would exceed `MAX_STEPS`
    pub fn concat(&self, other: &Pattern) -> Result<Pattern, PatternError> {
        let total = self.len() + other.len();
        if total > MAX_STEPS {
            return Err(PatternError::CombinedTooLong(total));
        }
        let mut steps = self.steps.clone();
        steps.extend_from_slice(&other.steps);
        Ok(Pattern::from_steps(steps))
    }

    /// Expand both patterns cyclically to their least common multiple length
    /// and merge them position-wise.
    pub fn combine(&self, other: &Pattern, op: CombineOp) -> Result<Pattern, PatternError> {
        let target = self.len().lcm(&other.len());
        if target > MAX_STEPS {
            return Err(PatternError::CombinedTooLong(target));
        }
        let left = self.expand_cyclic(target);
        let right = other.expand_cyclic(target);
        let steps = left
            .iter()
            .zip(right.iter())
            .map(|(a, b)| match op {
                CombineOp::Add => a || b,
                CombineOp::Subtract => a && !b,
            })
            .collect();
        Ok(Pattern::from_steps(steps))
    }

    /// Fraction of steps that are onsets
    pub fn density(&self) -> f64 {
        self.onset_count() as f64 / self.len() as f64
    }

    /// Step grid for terminals: `x` for onsets, `.` for rests
    #[cfg(feature = "colored")]
    pub fn grid(&self) -> String {
        use colored::Colorize;
        self.steps
            .iter()
            .map(|&s| {
                if s {
                    "x".bright_yellow().bold().to_string()
                } else {
                    ".".bright_black().to_string()
                }
            })
            .collect()
    }

    // Plain grid for non-colored builds (WASM)
    #[cfg(not(feature = "colored"))]
    pub fn grid(&self) -> String {
        self.steps.iter().map(|&s| if s { 'x' } else { '.' }).collect()
    }
}

/// Clamp a requested step count into `1..=MAX_STEPS`
pub fn clamp_steps(steps: usize) -> usize {
    steps.clamp(1, MAX_STEPS)
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &s in &self.steps {
            f.write_str(if s { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    /// Parse a plain binary string such as `10010010`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let steps = s
            .trim()
            .chars()
            .map(|c| match c {
                '1' => Ok(true),
                '0' => Ok(false),
                other => Err(PatternError::InvalidDigit(other)),
            })
            .collect::<Result<Vec<bool>, _>>()?;
        Pattern::new(steps)
    }
}

impl TryFrom<Vec<bool>> for Pattern {
    type Error = PatternError;

    fn try_from(steps: Vec<bool>) -> Result<Self, Self::Error> {
        Pattern::new(steps)
    }
}

impl AsRef<[bool]> for Pattern {
    fn as_ref(&self) -> &[bool] {
        &self.steps
    }
}
