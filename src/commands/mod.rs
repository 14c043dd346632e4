//! Command registry for REPL commands
//!
//! Provides a clean, extensible pattern for handling REPL commands.

pub mod general;
pub mod session;

use colored::*;
use serpe_core::{EngineConfig, ParseResult, Session};

/// Result of executing a command
#[derive(Debug)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// Not a command, try parsing as notation
    NotACommand,
    /// Error occurred
    Error(String),
    /// Watch a file for changes
    Watch(String),
}

/// Context passed to command handlers
pub struct CommandContext {
    pub session: Session,
    /// Notation most recently entered, the default target of `tick` and friends
    pub current: Option<String>,
}

impl CommandContext {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            session: Session::new(config),
            current: None,
        }
    }

    /// Parse notation and make it current when valid
    pub fn submit(&mut self, text: &str) -> ParseResult {
        let result = self.session.parse(text);
        if result.is_valid {
            self.current = Some(text.to_string());
        }
        result
    }

    /// `args` when given, otherwise the current notation
    pub fn target(&self, args: &str) -> Result<String, String> {
        if !args.is_empty() {
            return Ok(args.to_string());
        }
        self.current
            .clone()
            .ok_or_else(|| "No current notation. Enter one first or pass it as an argument".to_string())
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = if input.len() > prefix.len() {
                    input[prefix.len()..].trim()
                } else {
                    ""
                };
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Session commands
    registry.register("tick", session::cmd_tick);
    registry.register("reset all", session::cmd_reset_all);
    registry.register("reset", session::cmd_reset);
    registry.register("forget", session::cmd_forget);
    registry.register("state", session::cmd_state);
    registry.register("quantize", session::cmd_quantize);
    registry.register("accents", session::cmd_accents);

    // General commands
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);
    registry.register("watch", general::cmd_watch);
    registry.register("seed", general::cmd_seed);
    registry.register("capacity", general::cmd_capacity);

    registry
}

/// Multi-line rendering of a parse or trigger result for the terminal
pub fn render_result(result: &ParseResult) -> String {
    let Some(pattern) = result.pattern.as_ref().filter(|_| result.is_valid) else {
        let message = result.error_message.as_deref().unwrap_or("invalid notation");
        return format!("{} {}", "Parse error:".bright_red().bold(), message.red());
    };

    let mut lines = vec![
        format!("{}  {}", pattern.grid(), pattern.to_string().bright_white()),
        format!(
            "{} steps, {} onsets   {}  {}  {}",
            pattern.len(),
            pattern.onset_count(),
            pattern.to_hex().cyan(),
            pattern.to_octal().cyan(),
            pattern.to_decimal().cyan()
        ),
    ];
    if let Some(accent) = &result.accent_pattern {
        lines.push(format!("accent {}", accent.to_string().yellow()));
    }
    if result.scene_count > 1 {
        lines.push(format!(
            "scene {}/{}",
            result.scene_index + 1,
            result.scene_count
        ));
    }
    if let Some(q) = &result.quantization {
        let metrics = q.metrics();
        lines.push(format!(
            "quantized {} -> {} steps ({}), {} of {} onsets kept",
            q.original_steps,
            q.new_steps,
            if q.clockwise { "clockwise" } else { "counter-clockwise" },
            q.quantized_onset_count,
            q.original_onset_count
        ));
        if metrics.has_conflicts {
            lines.push(format!("{} onsets merged", metrics.conflict_count).yellow().to_string());
        }
    }
    for warning in &result.warnings {
        lines.push(format!("{} {}", "warning:".yellow().bold(), warning));
    }
    lines.join("\n")
}
