//! Angular re-quantization of a pattern onto a different step count.
//!
//! Each onset is treated as a point on the circle (`p / steps` of a turn) and
//! snapped to the nearest position of the new grid. Onsets that land on the
//! same position merge, so the onset count can shrink.

use num_rational::Ratio;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::types::pattern::MAX_STEPS;
use crate::types::Pattern;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantizeError {
    #[error("quantize target {0} is outside 1..={MAX_STEPS}")]
    TargetOutOfRange(usize),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuantizationResult {
    pub pattern: Pattern,
    pub original_steps: usize,
    pub new_steps: usize,
    pub clockwise: bool,
    pub original_onset_count: usize,
    pub quantized_onset_count: usize,
}

/// Summary numbers for displaying how lossy a quantization was
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuantizationMetrics {
    /// quantized / original onsets (1.0 when there were none)
    pub onset_preservation_ratio: f64,
    /// new density minus old density
    pub density_change: f64,
    /// onsets lost to collisions
    pub conflict_count: usize,
    pub has_conflicts: bool,
}

impl QuantizationResult {
    pub fn metrics(&self) -> QuantizationMetrics {
        let conflict_count = self.original_onset_count - self.quantized_onset_count;
        let onset_preservation_ratio = if self.original_onset_count == 0 {
            1.0
        } else {
            self.quantized_onset_count as f64 / self.original_onset_count as f64
        };
        let old_density = self.original_onset_count as f64 / self.original_steps as f64;
        let new_density = self.quantized_onset_count as f64 / self.new_steps as f64;
        QuantizationMetrics {
            onset_preservation_ratio,
            density_change: new_density - old_density,
            conflict_count,
            has_conflicts: conflict_count > 0,
        }
    }
}

/// Project `pattern` onto `new_steps` positions.
///
/// Clockwise keeps the reading direction; counter-clockwise mirrors each
/// angle (`2π - θ`). An unchanged step count returns the input as is.
pub fn quantize(
    pattern: &Pattern,
    new_steps: usize,
    clockwise: bool,
) -> Result<QuantizationResult, QuantizeError> {
    if new_steps == 0 || new_steps > MAX_STEPS {
        return Err(QuantizeError::TargetOutOfRange(new_steps));
    }

    let original_steps = pattern.len();
    let original_onset_count = pattern.onset_count();
    let quantized = if new_steps == original_steps {
        pattern.clone()
    } else {
        let positions: BTreeSet<usize> = pattern
            .onset_positions()
            .into_iter()
            .map(|p| project(p, original_steps, new_steps, clockwise))
            .collect();
        let positions: Vec<usize> = positions.into_iter().collect();
        Pattern::from_positions(&positions, new_steps)
    };

    tracing::trace!(
        from = original_steps,
        to = new_steps,
        clockwise,
        kept = quantized.onset_count(),
        of = original_onset_count,
        "quantized"
    );

    Ok(QuantizationResult {
        quantized_onset_count: quantized.onset_count(),
        pattern: quantized,
        original_steps,
        new_steps,
        clockwise,
        original_onset_count,
    })
}

/// Nearest grid position for `position`, rounding half away from zero
fn project(position: usize, from: usize, to: usize, clockwise: bool) -> usize {
    let turns = if clockwise || position == 0 {
        position
    } else {
        from - position
    };
    Ratio::new(turns * to, from).round().to_integer() % to
}
