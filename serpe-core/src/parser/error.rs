use std::fmt;
use thiserror::Error;

/// Location of a token in the notation text (character offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize) -> Self {
        Span { offset, len }
    }

    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Smallest span covering both
    pub fn to(&self, other: Span) -> Span {
        let end = self.end().max(other.end());
        let offset = self.offset.min(other.offset);
        Span::new(offset, end - offset)
    }

    /// Same span moved `by` characters to the right
    pub fn shifted(&self, by: usize) -> Span {
        Span::new(self.offset + by, self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.offset, self.end())
    }
}

/// What went wrong while reading notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpiErrorKind {
    UnknownGenerator,
    OutOfRange,
    OnsetsExceedSteps,
    EmptyLiteral,
    Unterminated,
    UnexpectedToken,
    InvalidDigit,
    Arity,
    CombinedTooLong,
    MultipleProgressive,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error at {span}: {message}")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpiError {
    pub kind: UpiErrorKind,
    pub message: String,
    pub span: Span,
}

impl UpiError {
    pub fn new(kind: UpiErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    /// Same error with its span moved `by` characters (scene segments are
    /// parsed on their own and shifted back into the full text)
    pub fn shifted(mut self, by: usize) -> Self {
        self.span = self.span.shifted(by);
        self
    }
}
