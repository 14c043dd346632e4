//! Session commands: trigger, reset and inspect stored notation state

use crate::commands::{render_result, CommandContext, CommandResult};
use colored::*;
use serpe_core::{AccentMode, AccentSequence};

/// Handle `tick [text]` command
pub fn cmd_tick(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let text = match ctx.target(args) {
        Ok(text) => text,
        Err(e) => return CommandResult::Error(e),
    };
    let result = ctx.session.trigger_result(&text);
    if result.is_valid {
        ctx.current = Some(text);
    }
    CommandResult::Message(render_result(&result))
}

/// Handle `reset [text]` command
pub fn cmd_reset(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let text = match ctx.target(args) {
        Ok(text) => text,
        Err(e) => return CommandResult::Error(e),
    };
    if ctx.session.reset(&text) {
        CommandResult::Message(format!("{} reset", text.bright_green()))
    } else {
        CommandResult::Message(format!("{} has no evolution state", text))
    }
}

/// Handle `reset all` command
pub fn cmd_reset_all(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.session.reset_all();
    CommandResult::Message(format!("Reset all {} stored notations", ctx.session.len()))
}

/// Handle `forget [text]` command
pub fn cmd_forget(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let text = match ctx.target(args) {
        Ok(text) => text,
        Err(e) => return CommandResult::Error(e),
    };
    if ctx.session.forget(&text) {
        CommandResult::Message(format!("Forgot {}", text))
    } else {
        CommandResult::Message(format!("{} has no evolution state", text))
    }
}

/// Handle `state [text]` command
pub fn cmd_state(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let text = match ctx.target(args) {
        Ok(text) => text,
        Err(e) => return CommandResult::Error(e),
    };
    let Some(summary) = ctx.session.state(&text) else {
        return CommandResult::Message(format!("{} has no evolution state", text));
    };

    let kind = summary
        .kind
        .map(|k| format!("{:?}", k).to_lowercase())
        .unwrap_or_else(|| "static".to_string());
    let mut output = format!(
        "{}\n  kind: {}\n  triggers: {}\n  scene: {}/{}",
        text.bold(),
        kind,
        summary.trigger_count,
        summary.scene_index + 1,
        summary.scene_count
    );
    if let Some(pattern) = summary.pattern {
        output.push_str(&format!("\n  pattern: {}", pattern));
    }
    CommandResult::Message(output)
}

/// Handle `quantize <notation> <steps> [ccw]` command
pub fn cmd_quantize(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let (source, steps, clockwise) = match parts.as_slice() {
        [source, steps] => (*source, *steps, true),
        [source, steps, "ccw"] => (*source, *steps, false),
        _ => return CommandResult::Error("Usage: quantize <notation> <steps> [ccw]".to_string()),
    };
    let Ok(steps) = steps.parse::<usize>() else {
        return CommandResult::Error(format!("Invalid step count '{}'", steps));
    };

    let parsed = ctx.session.parse(source);
    let Some(pattern) = parsed.pattern else {
        return CommandResult::Error(parsed.error_message.unwrap_or_default());
    };
    match ctx.session.quantize(&pattern, steps, clockwise) {
        Ok(result) => {
            let metrics = result.metrics();
            CommandResult::Message(format!(
                "{} -> {}\n  onsets kept: {}/{} ({:.0}%), density change {:+.3}",
                pattern,
                result.pattern.to_string().bright_white(),
                result.quantized_onset_count,
                result.original_onset_count,
                metrics.onset_preservation_ratio * 100.0,
                metrics.density_change
            ))
        }
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `accents [text]` command
pub fn cmd_accents(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let text = match ctx.target(args) {
        Ok(text) => text,
        Err(e) => return CommandResult::Error(e),
    };
    let result = ctx.session.parse(&text);
    let (Some(pattern), Some(accent)) = (result.pattern, result.accent_pattern) else {
        return CommandResult::Error(format!("{} has no accent pattern", text));
    };

    let onsets = AccentSequence::new(&pattern, &accent, AccentMode::OnsetIndexed);
    let steps = AccentSequence::new(&pattern, &accent, AccentMode::StepIndexed);
    CommandResult::Message(format!(
        "onset-indexed ({} steps): {}\nstep-indexed  ({} steps): {}",
        onsets.len(),
        onsets,
        steps.len(),
        steps
    ))
}
