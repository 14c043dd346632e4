use std::fmt;

use super::error::Span;
use crate::types::{CombineOp, Metric, Pattern};

/// Generator families addressable by a single letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Family {
    Euclidean,
    Barlow,
    Wolrab,
    Dilcue,
    Polygon,
    Random,
}

impl Family {
    /// Case-insensitive lookup of a generator letter
    pub fn from_letter(name: &str) -> Option<Family> {
        match name {
            "E" | "e" => Some(Family::Euclidean),
            "B" | "b" => Some(Family::Barlow),
            "W" | "w" => Some(Family::Wolrab),
            "D" | "d" => Some(Family::Dilcue),
            "P" | "p" => Some(Family::Polygon),
            "R" | "r" => Some(Family::Random),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Family::Euclidean => 'E',
            Family::Barlow => 'B',
            Family::Wolrab => 'W',
            Family::Dilcue => 'D',
            Family::Polygon => 'P',
            Family::Random => 'R',
        }
    }

    /// Accepted argument counts
    pub fn arity(self) -> (usize, usize) {
        match self {
            Family::Barlow | Family::Wolrab | Family::Dilcue => (2, 2),
            Family::Euclidean | Family::Polygon | Family::Random => (2, 3),
        }
    }

    /// Indispensability ordering used for single-step evolution, if any
    pub fn metric(self) -> Option<Metric> {
        match self {
            Family::Barlow => Some(Metric::Barlow),
            Family::Wolrab => Some(Metric::Wolrab),
            _ => None,
        }
    }
}

/// Per-trigger evolution requested by a suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProgressiveKind {
    /// `+N`: rotate N further steps every trigger
    Offset(i64),
    /// `*N`: append an N-step block every trigger
    Lengthen(usize),
    /// `>N` (optionally `B>N` etc.): move the onset count one step toward N
    Transform {
        target: usize,
        family: Option<Family>,
    },
}

/// Expression tree built by the parser
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Binary literal, codec, onset array or preset, already resolved
    Literal(Pattern),
    /// Validated generator call, e.g. `E(3,8)`
    Generator {
        family: Family,
        params: Vec<i64>,
        span: Span,
    },
    /// `R(r,steps)` or `R(r,steps,seed)`: random placement with a
    /// bell-curve onset count
    BellRandom {
        steps: usize,
        seed: Option<u64>,
        span: Span,
    },
    /// `{accent}body`
    Accented {
        accent: Box<Expression>,
        body: Box<Expression>,
    },
    /// `body;N` (clockwise) or `body;-N`
    Quantized {
        body: Box<Expression>,
        steps: usize,
        clockwise: bool,
        span: Span,
    },
    Progressive {
        kind: ProgressiveKind,
        body: Box<Expression>,
    },
    Combination {
        op: CombineOp,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    /// Space-separated patterns played one after another
    Concat { parts: Vec<Expression>, span: Span },
    /// `~body`, `inv body` or `comp body`
    Invert(Box<Expression>),
    /// `rev body`
    Reverse(Box<Expression>),
    /// `body@N`
    Rotate { body: Box<Expression>, offset: i64 },
    /// `a | b | c`
    SceneList(Vec<Expression>),
}

impl Expression {
    pub fn generator(family: Family, params: Vec<i64>, span: Span) -> Self {
        Expression::Generator {
            family,
            params,
            span,
        }
    }

    pub fn accented(accent: Expression, body: Expression) -> Self {
        Expression::Accented {
            accent: Box::new(accent),
            body: Box::new(body),
        }
    }

    pub fn quantized(body: Expression, steps: usize, clockwise: bool, span: Span) -> Self {
        Expression::Quantized {
            body: Box::new(body),
            steps,
            clockwise,
            span,
        }
    }

    pub fn progressive(kind: ProgressiveKind, body: Expression) -> Self {
        Expression::Progressive {
            kind,
            body: Box::new(body),
        }
    }

    pub fn combination(op: CombineOp, left: Expression, right: Expression, span: Span) -> Self {
        Expression::Combination {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        }
    }

    pub fn invert(body: Expression) -> Self {
        Expression::Invert(Box::new(body))
    }

    pub fn reverse(body: Expression) -> Self {
        Expression::Reverse(Box::new(body))
    }

    pub fn rotate(body: Expression, offset: i64) -> Self {
        Expression::Rotate {
            body: Box::new(body),
            offset,
        }
    }

    /// Whether evaluation needs per-key evolution state
    pub fn is_progressive(&self) -> bool {
        match self {
            Expression::Progressive { .. } => true,
            Expression::Literal(_)
            | Expression::Generator { .. }
            | Expression::BellRandom { .. } => false,
            Expression::Accented { accent, body } => {
                accent.is_progressive() || body.is_progressive()
            }
            Expression::Quantized { body, .. }
            | Expression::Invert(body)
            | Expression::Reverse(body)
            | Expression::Rotate { body, .. } => body.is_progressive(),
            Expression::Combination { left, right, .. } => {
                left.is_progressive() || right.is_progressive()
            }
            Expression::Concat { parts, .. } => parts.iter().any(Expression::is_progressive),
            Expression::SceneList(scenes) => scenes.iter().any(Expression::is_progressive),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(pattern) => write!(f, "{}", pattern),
            Expression::Generator { family, params, .. } => {
                let args: Vec<String> = params.iter().map(|p| p.to_string()).collect();
                write!(f, "{}({})", family.letter(), args.join(","))
            }
            Expression::BellRandom { steps, seed, .. } => match seed {
                Some(seed) => write!(f, "R(r,{},{})", steps, seed),
                None => write!(f, "R(r,{})", steps),
            },
            Expression::Accented { accent, body } => write!(f, "{{{}}}{}", accent, body),
            Expression::Quantized {
                body,
                steps,
                clockwise,
                ..
            } => {
                let sign = if *clockwise { "" } else { "-" };
                write!(f, "{};{}{}", body, sign, steps)
            }
            Expression::Progressive { kind, body } => match kind {
                ProgressiveKind::Offset(step) => write!(f, "{}+{}", body, step),
                ProgressiveKind::Lengthen(block) => write!(f, "{}*{}", body, block),
                ProgressiveKind::Transform { target, family } => match family {
                    Some(family) => write!(f, "{}{}>{}", body, family.letter(), target),
                    None => write!(f, "{}>{}", body, target),
                },
            },
            Expression::Combination { op, left, right, .. } => {
                let symbol = match op {
                    CombineOp::Add => "+",
                    CombineOp::Subtract => "-",
                };
                write!(f, "{}{}{}", left, symbol, right)
            }
            Expression::Concat { parts, .. } => {
                let parts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
                write!(f, "{}", parts.join(" "))
            }
            Expression::Invert(body) => write!(f, "~{}", body),
            Expression::Reverse(body) => write!(f, "rev {}", body),
            Expression::Rotate { body, offset } => write!(f, "{}@{}", body, offset),
            Expression::SceneList(scenes) => {
                let parts: Vec<String> = scenes.iter().map(|s| s.to_string()).collect();
                write!(f, "{}", parts.join("|"))
            }
        }
    }
}
