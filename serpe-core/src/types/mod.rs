// serpe-core/src/types/mod.rs

pub mod pattern;

pub use pattern::{AccentMode, AccentSequence, CombineOp, Metric, Pattern, PatternError, Radix};
