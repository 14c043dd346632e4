//! General REPL commands (help, quit, watch, seed, capacity)

use crate::commands::{CommandContext, CommandResult};
use colored::*;

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `watch [file]` command
pub fn cmd_watch(args: &str, _ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: watch <file>".to_string());
    }
    CommandResult::Watch(args.to_string())
}

/// Handle `seed` command
pub fn cmd_seed(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Message(format!("Seed: {:#x}", ctx.session.config().seed))
}

/// Handle `capacity` command
pub fn cmd_capacity(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let store = ctx.session.store();
    CommandResult::Message(format!(
        "State store: {}/{} entries ({} eviction)",
        store.len(),
        store.capacity(),
        store.policy_name()
    ))
}

/// Print help information
fn print_help() {
    println!("{}", "Serpe Notation Help".bold());
    println!("{}", "===================".bold());
    println!();
    println!("{}", "Patterns:".green());
    println!("  {}        - Binary literal (1 = onset)", "10010010".cyan());
    println!("  {}          - Binary literal padded to 8 steps", "101:8".cyan());
    println!("  {}  - Hex, octal, decimal codecs", "0x94:8  o44  d73  73".cyan());
    println!("  {}         - Morse (. = onset, - = onset + rest)", "M:SOS".cyan());
    println!("  {}      - Onset positions", "[0,3,6]:8".cyan());
    println!("  {}  - Presets", "tresillo  cinquillo  tri..oct".cyan());
    println!();
    println!("{}", "Generators:".green());
    println!("  {}          - Euclidean (E(3,8,1) rotates)", "E(3,8)".cyan());
    println!("  {}          - Barlow indispensability", "B(3,8)".cyan());
    println!("  {}          - Wolrab (anti-metric)", "W(3,8)".cyan());
    println!("  {}          - Dilcue (anti-Euclidean)", "D(3,8)".cyan());
    println!("  {}      - Polygon: sides, offset, steps", "P(5,0,8)".cyan());
    println!("  {}       - Random: onsets, steps, seed", "R(3,8,1)".cyan());
    println!("  {}         - Random with a bell-curve onset count", "R(r,8)".cyan());
    println!();
    println!("{}", "Operators:".green());
    println!("  {}   - Combine (OR) / subtract", "E(3,8)+E(2,8)  a-b".cyan());
    println!("  {}         - Invert (also inv, comp)", "~E(3,8)".cyan());
    println!("  {}     - Reverse", "rev E(3,8)".cyan());
    println!("  {}  - String patterns together", "1010 E(3,8)".cyan());
    println!("  {}        - Rotate later by 2", "E(3,8)@2".cyan());
    println!("  {}   - Quantize to 12 steps (-12 counter-clockwise)", "E(5,17);12".cyan());
    println!("  {}     - Accent the onsets", "{101}E(5,8)".cyan());
    println!();
    println!("{}", "Progressive (advance with tick):".green());
    println!("  {}        - Rotate one step further each tick (or %1)", "E(3,8)+1".cyan());
    println!("  {}        - Grow by a random 4-step block", "E(3,8)*4".cyan());
    println!("  {}        - Move one onset toward 8", "E(1,8)>8".cyan());
    println!("  {}       - Same, evolving by Barlow flips", "E(1,8)B>5".cyan());
    println!("  {}  - Scenes, one per tick", "E(3,8)|B(5,13)".cyan());
    println!();
    println!("{}", "Commands:".green());
    println!("  {}  - Advance the current (or given) notation", "tick [text]".yellow());
    println!("  {} - Back to the base pattern", "reset [text]".yellow());
    println!("  {}       - Reset every stored notation", "reset all".yellow());
    println!("  {} - Drop stored state", "forget [text]".yellow());
    println!("  {} - Show evolution state", "state [text]".yellow());
    println!("  {} - Re-quantize a binary pattern", "quantize <bits> <steps> [ccw]".yellow());
    println!("  {} - Show the accent cycle", "accents [text]".yellow());
    println!("  {} - Re-submit every line on change", "watch <file>".yellow());
    println!("  {}  - Show engine settings", "seed, capacity".yellow());
    println!("  {}    - Leave", "quit, exit".yellow());
}
