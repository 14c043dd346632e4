// serpe-core/src/engine/mod.rs

pub mod progressive;
pub mod quantize;
pub mod scene;
pub mod session;
pub mod store;

pub use progressive::{EvolutionKind, EvolutionRecord, Progression, Strategy};
pub use quantize::{quantize, QuantizationMetrics, QuantizationResult, QuantizeError};
pub use scene::{Scene, SceneState};
pub use session::{ParseResult, Session, StateSummary};
pub use store::{AccessStats, EvictionPolicy, Lfu, Lru, StateStore};
