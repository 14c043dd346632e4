use rand_pcg::Pcg32;

use crate::engine::progressive::{Progression, Strategy};
use crate::engine::quantize::{quantize, QuantizationResult};
use crate::parser::ast::{Expression, Family, ProgressiveKind};
use crate::parser::error::{Span, UpiError, UpiErrorKind};
use crate::types::pattern::{
    barlow, bell_curve_onsets, clamp_steps, dilcue, euclidean, polygon, random, random_with, rng_for,
    wolrab,
};
use crate::types::{Metric, Pattern, PatternError};

/// What an expression evaluates to
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub pattern: Pattern,
    pub accent: Option<Pattern>,
    /// The outermost quantization step, if the expression had one
    pub quantization: Option<QuantizationResult>,
}

/// Supplies the current pattern of a progressive sub-expression.
///
/// Evaluation itself is stateless; whoever owns the evolution state decides
/// what a progressive node currently looks like.
pub trait ProgressResolver {
    fn resolve(&mut self, progression: Progression, base: Pattern) -> Pattern;
}

/// Resolver for one-off evaluation: progressive nodes show their base pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressResolver for NoProgress {
    fn resolve(&mut self, _progression: Progression, base: Pattern) -> Pattern {
        base
    }
}

/// Turns expression trees into patterns
#[derive(Debug, Clone)]
pub struct Evaluator {
    seed: u64,
}

impl Evaluator {
    /// `seed` drives `R()` calls that do not give their own seed
    pub fn new(seed: u64) -> Self {
        Evaluator { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Evaluate without evolution state
    pub fn eval(&self, expr: &Expression) -> Result<Evaluation, UpiError> {
        self.eval_with(expr, &mut NoProgress)
    }

    /// Evaluate, asking `progress` for the state of progressive nodes.
    /// A scene list evaluates its first scene.
    pub fn eval_with(
        &self,
        expr: &Expression,
        progress: &mut dyn ProgressResolver,
    ) -> Result<Evaluation, UpiError> {
        let mut walk = Walk {
            evaluator: self,
            progress,
            quantization: None,
        };
        let (accent, body) = match expr {
            Expression::Accented { accent, body } => (Some(walk.pattern(accent)?), body.as_ref()),
            other => (None, other),
        };
        let pattern = walk.pattern(body)?;
        Ok(Evaluation {
            pattern,
            accent,
            quantization: walk.quantization,
        })
    }
}

struct Walk<'a> {
    evaluator: &'a Evaluator,
    progress: &'a mut dyn ProgressResolver,
    quantization: Option<QuantizationResult>,
}

impl Walk<'_> {
    fn pattern(&mut self, expr: &Expression) -> Result<Pattern, UpiError> {
        match expr {
            Expression::Literal(pattern) => Ok(pattern.clone()),
            Expression::Generator {
                family,
                params,
                span,
            } => Ok(self.generate(*family, params, *span)),
            Expression::BellRandom { steps, seed, span } => Ok(self.bell_random(*steps, *seed, *span)),
            // accents only matter at the top; nested ones decorate nothing
            Expression::Accented { body, .. } => self.pattern(body),
            Expression::Quantized {
                body,
                steps,
                clockwise,
                span,
            } => {
                let inner = self.pattern(body)?;
                let result = quantize(&inner, *steps, *clockwise)
                    .map_err(|err| UpiError::new(UpiErrorKind::OutOfRange, err.to_string(), *span))?;
                let pattern = result.pattern.clone();
                self.quantization = Some(result);
                Ok(pattern)
            }
            Expression::Progressive { kind, body } => {
                let base = self.pattern(body)?;
                let progression = progression_for(*kind, body);
                Ok(self.progress.resolve(progression, base))
            }
            Expression::Combination {
                op,
                left,
                right,
                span,
            } => {
                let left = self.pattern(left)?;
                let right = self.pattern(right)?;
                left.combine(&right, *op).map_err(|err| combine_error(err, *span))
            }
            Expression::Concat { parts, span } => {
                let mut strung: Option<Pattern> = None;
                for part in parts {
                    let next = self.pattern(part)?;
                    strung = Some(match strung {
                        Some(head) => head.concat(&next).map_err(|err| combine_error(err, *span))?,
                        None => next,
                    });
                }
                Ok(strung.unwrap_or_else(|| Pattern::rests(1)))
            }
            Expression::Invert(body) => Ok(self.pattern(body)?.invert()),
            Expression::Reverse(body) => Ok(self.pattern(body)?.reverse()),
            Expression::Rotate { body, offset } => Ok(self.pattern(body)?.rotate(*offset)),
            Expression::SceneList(scenes) => match scenes.first() {
                Some(first) => self.pattern(first),
                None => Ok(Pattern::rests(1)),
            },
        }
    }

    /// Unseeded random calls draw from a stream named after the call and its
    /// position in the text, so two identical calls differ.
    fn stream(&self, call: String, span: Span) -> Pcg32 {
        rng_for(self.evaluator.seed, &format!("{}@{}", call, span.offset))
    }

    fn generate(&self, family: Family, params: &[i64], span: Span) -> Pattern {
        let arg = |index: usize| params.get(index).map(|&v| count(v));
        let first = arg(0).unwrap_or(0);
        let second = arg(1).unwrap_or(0);

        tracing::trace!(family = ?family, ?params, "generating");
        match family {
            Family::Euclidean => euclidean(first, second).rotate(params.get(2).copied().unwrap_or(0)),
            Family::Barlow => barlow(first, second),
            Family::Wolrab => wolrab(first, second),
            Family::Dilcue => dilcue(first, second),
            Family::Polygon => {
                let offset = params.get(1).copied().unwrap_or(0);
                polygon(first, offset, arg(2).unwrap_or(first))
            }
            Family::Random => match params.get(2) {
                Some(&seed) => random(first, second, seed as u64),
                None => {
                    let mut rng = self.stream(format!("R({},{})", first, second), span);
                    random_with(first, second, &mut rng)
                }
            },
        }
    }

    fn bell_random(&self, steps: usize, seed: Option<u64>, span: Span) -> Pattern {
        let steps = clamp_steps(steps);
        let mut rng = match seed {
            Some(seed) => rng_for(seed, "R(r)"),
            None => self.stream(format!("R(r,{})", steps), span),
        };
        let onsets = bell_curve_onsets(steps, &mut rng);
        tracing::trace!(steps, onsets, "bell-curve random");
        random_with(onsets, steps, &mut rng)
    }
}

/// Resolve a progressive suffix against the expression it decorates.
///
/// `>N` regenerates Euclidean and Dilcue bases; every other base evolves by
/// single indispensability flips (Barlow unless the base or an explicit
/// transformer letter says Wolrab).
pub fn progression_for(kind: ProgressiveKind, body: &Expression) -> Progression {
    match kind {
        ProgressiveKind::Offset(step) => Progression::Offset { step },
        ProgressiveKind::Lengthen(block) => Progression::Lengthen { block },
        ProgressiveKind::Transform { target, family } => {
            let base_family = match body {
                Expression::Generator { family, .. } => Some(*family),
                _ => None,
            };
            let strategy = match family.or(base_family) {
                Some(Family::Euclidean) => Strategy::Euclidean,
                Some(Family::Dilcue) => Strategy::Dilcue,
                other => Strategy::Flip(other.and_then(Family::metric).unwrap_or(Metric::Barlow)),
            };
            Progression::Transform { target, strategy }
        }
    }
}

fn count(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

fn combine_error(err: PatternError, span: Span) -> UpiError {
    UpiError::new(UpiErrorKind::CombinedTooLong, err.to_string(), span)
}
