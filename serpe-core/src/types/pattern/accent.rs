//! Accent layers over a rhythm.
//!
//! An accent pattern has its own length and never changes the rhythm it
//! decorates. In the default onset-indexed mode it is consumed one entry per
//! onset, so a 3-entry accent over a 5-onset rhythm only lines up again after
//! 15 onsets (three rhythm cycles). [`AccentSequence`] precomputes that whole
//! polymetric cycle.

use num_integer::Integer;
use std::fmt;

use super::core::Pattern;

/// How accent entries are matched against rhythm steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccentMode {
    /// The k-th onset (counted across cycles) takes `accent[k mod len]`
    #[default]
    OnsetIndexed,
    /// Onset step `i` takes `accent[i mod len]`
    StepIndexed,
}

/// Full accent cycle for a rhythm / accent pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccentSequence {
    rhythm: Pattern,
    accent: Pattern,
    mode: AccentMode,
    table: Vec<bool>,
}

impl AccentSequence {
    pub fn new(rhythm: &Pattern, accent: &Pattern, mode: AccentMode) -> Self {
        let table = match mode {
            AccentMode::OnsetIndexed => onset_indexed_table(rhythm, accent),
            AccentMode::StepIndexed => step_indexed_table(rhythm, accent),
        };
        AccentSequence {
            rhythm: rhythm.clone(),
            accent: accent.clone(),
            mode,
            table,
        }
    }

    /// Steps before the rhythm and accent realign
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn mode(&self) -> AccentMode {
        self.mode
    }

    pub fn rhythm(&self) -> &Pattern {
        &self.rhythm
    }

    pub fn accent(&self) -> &Pattern {
        &self.accent
    }

    /// Accent flags for the whole cycle (`true` only on accented onsets)
    pub fn table(&self) -> &[bool] {
        &self.table
    }

    /// Whether the step at `step` (any non-negative step count) is accented
    pub fn is_accented_at(&self, step: usize) -> bool {
        self.table[step % self.table.len()]
    }

    /// Accent flags for one rhythm cycle starting at global step `start`
    pub fn accent_map_for_cycle(&self, start: usize) -> Vec<bool> {
        (0..self.rhythm.len())
            .map(|i| self.is_accented_at(start + i))
            .collect()
    }

    /// Index of the onset at `step` within the full cycle, `None` on rests
    pub fn onset_number_at(&self, step: usize) -> Option<usize> {
        let step = step % self.table.len();
        let len = self.rhythm.len();
        if !self.rhythm.is_onset(step % len) {
            return None;
        }
        Some((0..step).filter(|s| self.rhythm.is_onset(s % len)).count())
    }
}

/// `X` accented onset, `o` plain onset, `.` rest
impl fmt::Display for AccentSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.rhythm.len();
        for (step, &accented) in self.table.iter().enumerate() {
            let c = match (self.rhythm.is_onset(step % len), accented) {
                (true, true) => 'X',
                (true, false) => 'o',
                (false, _) => '.',
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

fn onset_indexed_table(rhythm: &Pattern, accent: &Pattern) -> Vec<bool> {
    let onsets = rhythm.onset_count();
    if onsets == 0 {
        return vec![false; rhythm.len()];
    }
    let cycles = onsets.lcm(&accent.len()) / onsets;
    let mut onset_index = 0;
    (0..rhythm.len() * cycles)
        .map(|step| {
            if !rhythm.is_onset(step % rhythm.len()) {
                return false;
            }
            let accented = accent.is_onset(onset_index % accent.len());
            onset_index += 1;
            accented
        })
        .collect()
}

fn step_indexed_table(rhythm: &Pattern, accent: &Pattern) -> Vec<bool> {
    let len = rhythm.len().lcm(&accent.len());
    (0..len)
        .map(|step| rhythm.is_onset(step % rhythm.len()) && accent.is_onset(step % accent.len()))
        .collect()
}
