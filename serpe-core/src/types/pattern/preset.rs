//! Named rhythms usable directly in notation.

use super::core::Pattern;
use super::euclidean::euclidean;
use super::polygon::polygon;

/// Every preset name, in the order `help` lists them
pub const PRESET_NAMES: [&str; 7] = ["tresillo", "cinquillo", "tri", "pent", "hex", "hept", "oct"];

/// Resolve a preset by (case-insensitive) name
pub fn preset(name: &str) -> Option<Pattern> {
    let pattern = match name.to_ascii_lowercase().as_str() {
        "tresillo" => euclidean(3, 8),
        "cinquillo" => euclidean(5, 8),
        "tri" => polygon(3, 0, 3),
        "pent" => polygon(5, 0, 5),
        "hex" => polygon(6, 0, 6),
        "hept" => polygon(7, 0, 7),
        "oct" => polygon(8, 0, 8),
        _ => return None,
    };
    Some(pattern)
}
