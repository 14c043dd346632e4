//! # Serpe
//!
//! Terminal front end for the Serpe rhythm notation. The engine itself lives
//! in `serpe-core`; this crate adds an interactive REPL with a command
//! registry, a file watcher that re-submits notation on change, and TOML
//! configuration loading.
//!
//! ## Modules
//!
//! - `commands`: REPL command registry and the session commands
//!   (`tick`, `reset`, `state`, `quantize`, `accents`, ...).
//! - `config`: engine settings from a TOML file plus overrides.
//! - `repl`: the Read-Eval-Print Loop and notation file watcher.

pub mod commands;
pub mod config;
pub mod repl;

pub use serpe_core::{EngineConfig, ParseResult, Pattern, Session};
