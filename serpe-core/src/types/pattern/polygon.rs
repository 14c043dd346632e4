//! Regular polygon rhythms: vertices of an n-gon inscribed in the step circle.

use num_rational::Ratio;

use super::core::{clamp_steps, Pattern};

/// `P(sides, offset, steps)`: onsets at `round(i * steps / sides)` for each
/// vertex `i`, rotated `offset` steps later. Rounding is exact (half away from
/// zero) so results never depend on float error.
pub fn polygon(sides: usize, offset: i64, steps: usize) -> Pattern {
    let steps = clamp_steps(steps);
    let sides = sides.min(steps);
    let positions: Vec<usize> = (0..sides)
        .map(|i| Ratio::new(i * steps, sides).round().to_integer() % steps)
        .collect();
    Pattern::from_positions(&positions, steps).rotate(offset)
}
