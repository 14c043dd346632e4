// serpe-core/src/parser/mod.rs

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod notation_parser;

#[cfg(test)]
mod evaluator_tests;

pub use ast::{Expression, Family, ProgressiveKind};
pub use error::{Span, UpiError, UpiErrorKind};
pub use evaluator::{progression_for, Evaluation, Evaluator, NoProgress, ProgressResolver};
pub use lexer::{Lexer, SpannedToken, Token};
pub use notation_parser::{parse, parse_expression, Parsed, Parser};
