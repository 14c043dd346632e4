//! REPL (Read-Eval-Print Loop) for Serpe notation

use crate::commands::{create_registry, render_result, CommandContext, CommandRegistry, CommandResult};
use crate::repl::watcher::{notation_lines, NotationWatcher};
use anyhow::{anyhow, Result};
use colored::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use notify::Event;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RustylineResult};
use serpe_core::EngineConfig;
use std::path::Path;
use std::thread;

pub mod watcher;

/// Types of events the REPL loop handles
enum ReplEvent {
    Input(Result<String, ReadlineError>),
}

/// Interactive REPL over one notation session
pub struct Repl {
    editor: Option<DefaultEditor>,
    registry: CommandRegistry,
    ctx: CommandContext,

    // Event channels
    tx_input: Sender<ReplEvent>,
    rx_input: Receiver<ReplEvent>,
    tx_watcher: Sender<notify::Result<Event>>,
    rx_watcher: Receiver<notify::Result<Event>>,

    // File watcher
    watcher: Option<NotationWatcher>,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(config: EngineConfig) -> RustylineResult<Self> {
        let editor = DefaultEditor::new()?;
        let (tx_input, rx_input) = unbounded();
        let (tx_watcher, rx_watcher) = unbounded();

        Ok(Repl {
            editor: Some(editor),
            registry: create_registry(),
            ctx: CommandContext::new(config),
            tx_input,
            rx_input,
            tx_watcher,
            rx_watcher,
            watcher: None,
        })
    }

    /// Handle one input line. Returns false when the REPL should stop.
    fn handle_line(&mut self, line: &str) -> bool {
        match self.registry.execute(line, &mut self.ctx) {
            CommandResult::Success => {}
            CommandResult::Message(msg) => println!("{}", msg),
            CommandResult::Exit => {
                println!("{}", "Goodbye!".bright_cyan());
                return false;
            }
            CommandResult::Error(e) => {
                println!("{} {}", "Error:".bright_red().bold(), e.red());
            }
            CommandResult::Watch(path) => self.watch(&path),
            CommandResult::NotACommand => {
                let result = self.ctx.submit(line);
                println!("{}", render_result(&result));
            }
        }
        true
    }

    fn watch(&mut self, path: &str) {
        if self.watcher.is_none() {
            match NotationWatcher::new(self.tx_watcher.clone()) {
                Ok(w) => self.watcher = Some(w),
                Err(e) => println!("{} Failed to create watcher: {}", "Error:".red(), e),
            }
        }

        let Some(w) = self.watcher.as_mut() else {
            return;
        };
        match w.watch(path) {
            Ok(()) => {
                println!(
                    "Watching {} for changes ({} file(s) watched)",
                    path.bright_green(),
                    w.paths().len()
                );
                self.reload(Path::new(path));
            }
            Err(e) => println!("{} Failed to watch {}: {}", "Error:".red(), path, e),
        }
    }

    /// Re-submit every notation line of `path`. Lines already known keep
    /// their evolution state.
    fn reload(&mut self, path: &Path) {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                println!("{} Failed to read file: {}", "Error:".red(), e);
                return;
            }
        };

        let mut last_valid = None;
        for line in notation_lines(&contents) {
            let result = self.ctx.session.parse(line);
            if result.is_valid {
                println!("{} {}", line.cyan(), result.pattern.map(|p| p.to_string()).unwrap_or_default());
                last_valid = Some(line.to_string());
            } else {
                println!(
                    "{} {}: {}",
                    "Error:".red(),
                    line,
                    result.error_message.unwrap_or_default()
                );
            }
        }
        if last_valid.is_some() {
            self.ctx.current = last_valid;
        }
        tracing::info!(path = %path.display(), stored = self.ctx.session.len(), "reloaded notation file");
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!("{}", "Serpe Rhythm Notation".bright_cyan().bold());
        println!(
            "Type patterns like: {}, {}, {}",
            "E(3,8)".cyan(),
            "B(5,13)>8".cyan(),
            "{101}E(5,8)|tresillo".cyan()
        );
        println!(
            "Type '{}' for more information, '{}' or {} to exit.\n",
            "help".bright_green(),
            "quit".bright_red(),
            "Ctrl+C".bright_red()
        );

        // Move editor to thread
        let mut editor = self
            .editor
            .take()
            .ok_or_else(|| anyhow!("REPL is already running"))?;
        let tx_input = self.tx_input.clone();

        thread::spawn(move || loop {
            let prompt = format!("{} ", "serpe>".bright_magenta().bold());
            let readline = editor.readline(&prompt);

            match readline {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        let _ = editor.add_history_entry(&line);
                    }
                    if tx_input.send(ReplEvent::Input(Ok(line))).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx_input.send(ReplEvent::Input(Err(err)));
                    break;
                }
            }
        });

        loop {
            crossbeam_channel::select! {
                recv(self.rx_input) -> msg => match msg {
                    Ok(ReplEvent::Input(Ok(line))) => {
                        if line.is_empty() {
                            continue;
                        }
                        if !self.handle_line(&line) {
                            break;
                        }
                    }
                    Ok(ReplEvent::Input(Err(ReadlineError::Interrupted | ReadlineError::Eof))) => {
                        println!("{}", "Goodbye!".bright_cyan());
                        break;
                    }
                    Ok(ReplEvent::Input(Err(err))) => {
                        println!(
                            "{} {}",
                            "Error reading input:".bright_red().bold(),
                            err.to_string().red()
                        );
                    }
                    Err(_) => break, // Channel closed
                },

                recv(self.rx_watcher) -> msg => match msg {
                    Ok(Ok(event)) => {
                        use notify::EventKind;
                        if let EventKind::Modify(_) | EventKind::Create(_) = event.kind {
                            for path in event.paths {
                                println!("File changed: {}", path.display());
                                self.reload(&path);
                            }
                        }
                    }
                    Ok(Err(e)) => println!("{} Watch error: {}", "Error:".red(), e),
                    Err(_) => break, // Channel closed
                }
            }
        }

        Ok(())
    }
}

/// Convenience function to start the REPL
pub fn start(config: EngineConfig) -> Result<()> {
    let mut repl = Repl::new(config).map_err(|e| anyhow!("Failed to initialize REPL: {}", e))?;
    repl.run()
}
