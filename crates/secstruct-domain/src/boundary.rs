//! Boundary module - a detected section start in raw filing text

use serde::{Deserialize, Serialize};

/// A detected start-of-section marker.
///
/// Boundaries are produced by running several competing header patterns over
/// the full filing text. Raw output contains duplicates across strategies;
/// the detector's filtering pass guarantees at most one boundary per distinct
/// item number, keeps part-level headers only when real content follows, and
/// drops near-duplicates, before sorting by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Name of the detection strategy that produced this match
    pub strategy: String,

    /// Fixed confidence weight of the strategy (0.5–0.9)
    pub confidence: f64,

    /// Byte offset of the match start in the filing text
    pub position: usize,

    /// Byte offset just past the matched header
    pub end_position: usize,

    /// Item designator ("1", "1A", "7", ...). None for part-level headers.
    pub item_number: Option<String>,

    /// Cleaned header text
    pub title: String,

    /// Up to 100 bytes of text preceding the match (diagnostic only)
    pub context_before: String,

    /// Up to 100 bytes of text following the match (diagnostic only)
    pub context_after: String,
}

impl Boundary {
    /// Human-readable label: "Item 1A" for item boundaries, the title otherwise.
    pub fn label(&self) -> String {
        match &self.item_number {
            Some(num) => format!("Item {}", num),
            None => self.title.clone(),
        }
    }
}
