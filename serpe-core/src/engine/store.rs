//! Bounded map from raw notation text to its evolution state.

use std::collections::HashMap;
use std::fmt;

use super::scene::SceneState;
use crate::config::{EngineConfig, EvictionKind};

/// Access bookkeeping for one stored entry, on a logical clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessStats {
    pub inserted_at: u64,
    pub last_access: u64,
    pub hits: u64,
}

/// Chooses which entry to drop when the store is full
pub trait EvictionPolicy: fmt::Debug + Send {
    fn name(&self) -> &'static str;

    /// Index into `candidates` of the entry to evict
    fn select_victim(&self, candidates: &[AccessStats]) -> Option<usize>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Lru;

impl EvictionPolicy for Lru {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn select_victim(&self, candidates: &[AccessStats]) -> Option<usize> {
        candidates
            .iter()
            .enumerate()
            .min_by_key(|(_, stats)| stats.last_access)
            .map(|(index, _)| index)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Lfu;

impl EvictionPolicy for Lfu {
    fn name(&self) -> &'static str {
        "lfu"
    }

    fn select_victim(&self, candidates: &[AccessStats]) -> Option<usize> {
        candidates
            .iter()
            .enumerate()
            .min_by_key(|(_, stats)| (stats.hits, stats.last_access))
            .map(|(index, _)| index)
    }
}

impl EvictionKind {
    pub fn policy(self) -> Box<dyn EvictionPolicy> {
        match self {
            EvictionKind::Lru => Box::new(Lru),
            EvictionKind::Lfu => Box::new(Lfu),
        }
    }
}

#[derive(Debug)]
struct Entry {
    state: SceneState,
    stats: AccessStats,
}

/// Keyed evolution state with a capacity bound.
///
/// Keys are the exact notation text. Looking an entry up counts as an access;
/// [`StateStore::peek`] does not.
#[derive(Debug)]
pub struct StateStore {
    entries: HashMap<String, Entry>,
    capacity: usize,
    clock: u64,
    policy: Box<dyn EvictionPolicy>,
}

impl StateStore {
    /// A zero capacity is treated as one
    pub fn new(capacity: usize, policy: Box<dyn EvictionPolicy>) -> Self {
        StateStore {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            clock: 0,
            policy,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        StateStore::new(config.store_capacity, config.eviction.policy())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn stats(&self, key: &str) -> Option<AccessStats> {
        self.entries.get(key).map(|entry| entry.stats)
    }

    /// Look up without touching the access statistics
    pub fn peek(&self, key: &str) -> Option<&SceneState> {
        self.entries.get(key).map(|entry| &entry.state)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut SceneState> {
        let now = self.tick();
        let entry = self.entries.get_mut(key)?;
        entry.stats.last_access = now;
        entry.stats.hits += 1;
        tracing::debug!(key, hits = entry.stats.hits, "reusing state");
        Some(&mut entry.state)
    }

    /// Store `state` under `key`, evicting another entry first when full.
    /// Returns the evicted key, if any.
    pub fn insert(&mut self, key: String, state: SceneState) -> Option<String> {
        let evicted = if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict()
        } else {
            None
        };

        let now = self.tick();
        tracing::debug!(key = %key, scenes = state.len(), "storing state");
        self.entries.insert(
            key,
            Entry {
                state,
                stats: AccessStats {
                    inserted_at: now,
                    last_access: now,
                    hits: 0,
                },
            },
        );
        evicted
    }

    pub fn remove(&mut self, key: &str) -> Option<SceneState> {
        self.entries.remove(key).map(|entry| entry.state)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Every stored state back to its start
    pub fn reset_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.state.reset();
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict(&mut self) -> Option<String> {
        let (keys, stats): (Vec<&String>, Vec<AccessStats>) = self
            .entries
            .iter()
            .map(|(key, entry)| (key, entry.stats))
            .unzip();
        let victim = self.policy.select_victim(&stats)?;
        let key = keys.get(victim).map(|key| (*key).clone())?;
        self.entries.remove(&key);
        tracing::debug!(key = %key, policy = self.policy.name(), "evicted state");
        Some(key)
    }
}
