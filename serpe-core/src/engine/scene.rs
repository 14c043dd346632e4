//! Scene lists: an ordered set of expressions that take turns on every
//! trigger, each carrying its own evolution state.

use rand::RngCore;

use super::progressive::{EvolutionKind, EvolutionRecord, Progression};
use crate::parser::{Evaluation, Evaluator, Expression, ProgressResolver, UpiError};
use crate::types::pattern::rng_for;
use crate::types::Pattern;

/// One entry of a scene list
#[derive(Debug, Clone)]
pub struct Scene {
    expression: Expression,
    evolution: Option<EvolutionRecord>,
    seed: u64,
}

impl Scene {
    fn new(expression: Expression, seed: u64) -> Self {
        Scene {
            expression,
            evolution: None,
            seed,
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Evolution state, once the scene has been rendered with a progressive suffix
    pub fn evolution(&self) -> Option<&EvolutionRecord> {
        self.evolution.as_ref()
    }

    fn render(&mut self, evaluator: &Evaluator) -> Result<Evaluation, UpiError> {
        let mut slot = RecordSlot {
            slot: &mut self.evolution,
            seed: self.seed,
        };
        evaluator.eval_with(&self.expression, &mut slot)
    }
}

/// Hands the evaluator the scene's evolution record, creating it on first use
struct RecordSlot<'a> {
    slot: &'a mut Option<EvolutionRecord>,
    seed: u64,
}

impl ProgressResolver for RecordSlot<'_> {
    fn resolve(&mut self, progression: Progression, base: Pattern) -> Pattern {
        let seed = self.seed;
        self.slot
            .get_or_insert_with(|| EvolutionRecord::new(base, progression, seed))
            .current()
            .clone()
    }
}

/// Evolution state for one notation text.
///
/// A text without `|` is a single-scene list, so triggering it keeps
/// returning to scene 0 and only its evolution moves.
#[derive(Debug, Clone)]
pub struct SceneState {
    scenes: Vec<Scene>,
    current: usize,
    triggers: u64,
    warnings: Vec<UpiError>,
    last: Option<Pattern>,
}

impl SceneState {
    /// Build from a parsed expression. `seed` is split per scene.
    pub fn new(expression: Expression, seed: u64, warnings: Vec<UpiError>) -> Self {
        let expressions = match expression {
            Expression::SceneList(scenes) if !scenes.is_empty() => scenes,
            other => vec![other],
        };
        let scenes = expressions
            .into_iter()
            .enumerate()
            .map(|(index, expression)| {
                let scene_seed = rng_for(seed, &format!("scene {}", index)).next_u64();
                Scene::new(expression, scene_seed)
            })
            .collect();
        SceneState {
            scenes,
            current: 0,
            triggers: 0,
            warnings,
            last: None,
        }
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_scene(&self) -> &Scene {
        &self.scenes[self.current]
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn trigger_count(&self) -> u64 {
        self.triggers
    }

    /// Errors of scene segments that were degraded to rests
    pub fn warnings(&self) -> &[UpiError] {
        &self.warnings
    }

    /// Pattern of the most recent render
    pub fn last_pattern(&self) -> Option<&Pattern> {
        self.last.as_ref()
    }

    /// Evolution kind of the current scene, if it is progressive
    pub fn evolution_kind(&self) -> Option<EvolutionKind> {
        self.current_scene().evolution().map(EvolutionRecord::kind)
    }

    /// Whether any scene carries evolution state
    pub fn is_progressive(&self) -> bool {
        self.scenes.iter().any(|s| s.expression.is_progressive())
    }

    /// Evaluate the current scene without advancing anything
    pub fn render(&mut self, evaluator: &Evaluator) -> Result<Evaluation, UpiError> {
        let evaluation = self.scenes[self.current].render(evaluator)?;
        self.last = Some(evaluation.pattern.clone());
        Ok(evaluation)
    }

    /// Advance the current scene's evolution, move to the next scene and
    /// render it.
    pub fn trigger(&mut self, evaluator: &Evaluator) -> Result<Evaluation, UpiError> {
        self.triggers += 1;
        if let Some(record) = self.scenes[self.current].evolution.as_mut() {
            record.advance();
        }
        self.current = (self.current + 1) % self.scenes.len();
        tracing::trace!(scene = self.current, of = self.scenes.len(), "scene advanced");
        self.render(evaluator)
    }

    /// Back to scene 0 with every evolution at its base
    pub fn reset(&mut self) {
        self.current = 0;
        self.triggers = 0;
        self.last = None;
        for scene in &mut self.scenes {
            if let Some(record) = scene.evolution.as_mut() {
                record.reset();
            }
        }
    }
}
