//! Loading engine settings from TOML with command-line overrides

use anyhow::{Context, Result};
use serpe_core::EngineConfig;
use std::path::Path;

/// Read `path` as an `EngineConfig`; missing fields keep their defaults
pub fn load(path: &Path) -> Result<EngineConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing config {}", path.display()))
}

pub fn parse(text: &str) -> Result<EngineConfig> {
    Ok(toml::from_str(text)?)
}

/// Start from the file (or defaults) and apply individual overrides
pub fn resolve(
    path: Option<&Path>,
    capacity: Option<usize>,
    seed: Option<u64>,
) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(capacity) = capacity {
        config.store_capacity = capacity;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }
    tracing::debug!(?config, "engine configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpe_core::EvictionKind;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse("store_capacity = 8\neviction = \"lfu\"\n").unwrap();
        assert_eq!(config.store_capacity, 8);
        assert_eq!(config.eviction, EvictionKind::Lfu);
        assert_eq!(config.seed, EngineConfig::default().seed);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_bad_eviction_is_rejected() {
        assert!(parse("eviction = \"fifo\"").is_err());
    }

    #[test]
    fn test_overrides() {
        let config = resolve(None, Some(3), Some(42)).unwrap();
        assert_eq!(config.store_capacity, 3);
        assert_eq!(config.seed, 42);
        assert_eq!(config.eviction, EvictionKind::Lru);
    }
}
