//! Engine configuration.

/// Which entry the state store drops when it is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EvictionKind {
    /// Least recently used
    #[default]
    Lru,
    /// Least frequently used, ties broken by age
    Lfu,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Maximum number of notation texts with live evolution state
    pub store_capacity: usize,
    pub eviction: EvictionKind,
    /// Base seed for unseeded `R()` calls and lengthening
    pub seed: u64,
}

pub const DEFAULT_STORE_CAPACITY: usize = 100;
pub const DEFAULT_SEED: u64 = 0x5E_E9E;

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            store_capacity: DEFAULT_STORE_CAPACITY,
            eviction: EvictionKind::Lru,
            seed: DEFAULT_SEED,
        }
    }
}

impl EngineConfig {
    pub fn with_capacity(mut self, store_capacity: usize) -> Self {
        self.store_capacity = store_capacity;
        self
    }

    pub fn with_eviction(mut self, eviction: EvictionKind) -> Self {
        self.eviction = eviction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
