//! The host-facing surface: `parse`, `trigger` and `quantize`, backed by a
//! per-session state store.

use super::progressive::EvolutionKind;
use super::quantize::{quantize, QuantizationResult, QuantizeError};
use super::scene::SceneState;
use super::store::StateStore;
use crate::config::EngineConfig;
use crate::parser::{parse, Evaluation, Evaluator, Expression, UpiError};
use crate::types::pattern::rng_for;
use crate::types::Pattern;

use rand::RngCore;

/// Outcome of parsing one notation text. Never an `Err`: failures are
/// reported through `is_valid` and `error_message`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseResult {
    pub is_valid: bool,
    pub pattern: Option<Pattern>,
    pub accent_pattern: Option<Pattern>,
    pub raw_text: String,
    pub error_message: Option<String>,
    pub scene_index: usize,
    pub scene_count: usize,
    pub progressive: bool,
    pub quantization: Option<QuantizationResult>,
    /// Messages for scene segments that were replaced by rests
    pub warnings: Vec<String>,
}

impl ParseResult {
    fn valid(text: &str, rendered: Rendered) -> Self {
        ParseResult {
            is_valid: true,
            pattern: Some(rendered.evaluation.pattern),
            accent_pattern: rendered.evaluation.accent,
            raw_text: text.to_string(),
            error_message: None,
            scene_index: rendered.scene_index,
            scene_count: rendered.scene_count,
            progressive: rendered.progressive,
            quantization: rendered.evaluation.quantization,
            warnings: rendered.warnings,
        }
    }

    fn invalid(text: &str, error: &UpiError) -> Self {
        ParseResult {
            is_valid: false,
            pattern: None,
            accent_pattern: None,
            raw_text: text.to_string(),
            error_message: Some(error.to_string()),
            scene_index: 0,
            scene_count: 0,
            progressive: false,
            quantization: None,
            warnings: Vec::new(),
        }
    }
}

/// Snapshot of one key's evolution
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateSummary {
    pub kind: Option<EvolutionKind>,
    pub trigger_count: u64,
    pub scene_index: usize,
    pub scene_count: usize,
    pub pattern: Option<Pattern>,
}

struct Rendered {
    evaluation: Evaluation,
    scene_index: usize,
    scene_count: usize,
    progressive: bool,
    warnings: Vec<String>,
}

impl Rendered {
    fn from_state(state: &SceneState, evaluation: Evaluation) -> Self {
        Rendered {
            evaluation,
            scene_index: state.current_index(),
            scene_count: state.len(),
            progressive: state.is_progressive(),
            warnings: state.warnings().iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// One independent notation session.
///
/// Texts with progressive suffixes or scene lists get an entry in the
/// session's store the first time they parse successfully; parsing the same
/// text again reuses that entry unchanged.
#[derive(Debug)]
pub struct Session {
    config: EngineConfig,
    store: StateStore,
    evaluator: Evaluator,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(EngineConfig::default())
    }
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Session {
            store: StateStore::from_config(&config),
            evaluator: Evaluator::new(config.seed),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of texts holding evolution state
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Resolve `text` to its current pattern without advancing anything
    pub fn parse(&mut self, text: &str) -> ParseResult {
        match self.render(text, false) {
            Ok(rendered) => ParseResult::valid(text, rendered),
            Err(err) => {
                tracing::debug!(text, error = %err, "parse failed");
                ParseResult::invalid(text, &err)
            }
        }
    }

    /// Advance `text` by one trigger and return the new pattern.
    ///
    /// Texts without evolution state come back unchanged.
    pub fn trigger(&mut self, text: &str) -> Result<Pattern, UpiError> {
        Ok(self.render(text, true)?.evaluation.pattern)
    }

    /// Like [`Session::trigger`] but with the full parse metadata
    pub fn trigger_result(&mut self, text: &str) -> ParseResult {
        match self.render(text, true) {
            Ok(rendered) => ParseResult::valid(text, rendered),
            Err(err) => ParseResult::invalid(text, &err),
        }
    }

    pub fn quantize(
        &self,
        pattern: &Pattern,
        new_steps: usize,
        clockwise: bool,
    ) -> Result<QuantizationResult, QuantizeError> {
        quantize(pattern, new_steps, clockwise)
    }

    /// Put `text` back to its base pattern and first scene.
    /// Returns whether the text had state.
    pub fn reset(&mut self, text: &str) -> bool {
        match self.store.get_mut(text) {
            Some(state) => {
                state.reset();
                true
            }
            None => false,
        }
    }

    pub fn reset_all(&mut self) {
        self.store.reset_all();
    }

    /// Drop the state for `text` entirely
    pub fn forget(&mut self, text: &str) -> bool {
        self.store.remove(text).is_some()
    }

    pub fn state(&self, text: &str) -> Option<StateSummary> {
        let state = self.store.peek(text)?;
        let scene = state.current_scene();
        Some(StateSummary {
            kind: state.evolution_kind(),
            trigger_count: state.trigger_count(),
            scene_index: state.current_index(),
            scene_count: state.len(),
            pattern: state
                .last_pattern()
                .or_else(|| scene.evolution().map(|record| record.current()))
                .cloned(),
        })
    }

    fn render(&mut self, text: &str, advance: bool) -> Result<Rendered, UpiError> {
        if let Some(state) = self.store.get_mut(text) {
            let evaluation = if advance {
                state.trigger(&self.evaluator)?
            } else {
                state.render(&self.evaluator)?
            };
            return Ok(Rendered::from_state(state, evaluation));
        }

        let parsed = parse(text)?;
        let stateful = matches!(parsed.expression, Expression::SceneList(_))
            || parsed.expression.is_progressive();
        if !stateful {
            return Ok(Rendered {
                evaluation: self.evaluator.eval(&parsed.expression)?,
                scene_index: 0,
                scene_count: 1,
                progressive: false,
                warnings: Vec::new(),
            });
        }

        // evaluate before storing so a failure leaves the store untouched
        let seed = rng_for(self.config.seed, text).next_u64();
        let mut state = SceneState::new(parsed.expression, seed, parsed.warnings);
        let mut evaluation = state.render(&self.evaluator)?;
        if advance {
            evaluation = state.trigger(&self.evaluator)?;
        }
        let rendered = Rendered::from_state(&state, evaluation);
        if let Some(evicted) = self.store.insert(text.to_string(), state) {
            tracing::debug!(evicted = %evicted, "store full");
        }
        Ok(rendered)
    }
}
