//! # Serpe Core
//!
//! WASM-compatible engine for a compact rhythm notation: binary, hex, octal
//! and decimal literals, Euclidean, Barlow, Wolrab, Dilcue, polygon and
//! random generators, combinations, accents, angular quantization, and
//! per-trigger progressive evolution with scene lists.
//!
//! ## Features
//!
//! - **serde**: Enable JSON serialization for web interop
//! - **wasm**: Enable WASM bindings via wasm-bindgen
//! - **colored**: Enable colored terminal grids (disabled in WASM)
//!
//! ## Example
//!
//! ```
//! use serpe_core::{EngineConfig, Session};
//!
//! let mut session = Session::new(EngineConfig::default());
//! let result = session.parse("E(3,8)+1");
//! assert_eq!(result.pattern.unwrap().to_string(), "10010010");
//! assert_eq!(session.trigger("E(3,8)+1").unwrap().to_string(), "01001001");
//! ```

pub mod config;
pub mod engine;
pub mod parser;
pub mod types;
pub mod wasm;

// Re-export commonly used types
pub use config::{EngineConfig, EvictionKind};
pub use engine::{quantize, ParseResult, QuantizationResult, QuantizeError, Session, StateSummary};
pub use parser::{UpiError, UpiErrorKind};
pub use types::{AccentMode, AccentSequence, Pattern, PatternError, Radix};

pub use wasm::{tokenize_for_highlighting, HighlightSpan};
