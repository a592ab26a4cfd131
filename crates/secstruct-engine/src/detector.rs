//! Boundary detection - locating section starts in unstructured filing text
//!
//! Several header conventions coexist in the wild: box-drawn headers, bold
//! uppercase headers, plain "Item N." lines, table-of-contents entries with
//! trailing page numbers, and bare "PART I/II" dividers. Every strategy runs
//! over the full text independently; overlapping and conflicting matches are
//! expected and resolved afterwards by confidence, content lookahead, and
//! near-duplicate suppression.

use regex::{Regex, RegexBuilder};
use secstruct_domain::Boundary;
use std::collections::HashMap;
use tracing::{debug, info};

/// Bytes of surrounding text captured for diagnostics.
const CONTEXT_BYTES: usize = 100;

/// Lookahead window when checking that a PART header is followed by content.
const PART_LOOKAHEAD_BYTES: usize = 1000;

/// Minimum non-decorative bytes required within the lookahead window.
const PART_MIN_CONTENT: usize = 100;

/// Survivors closer than this to an earlier-kept boundary are dropped as noise.
const MIN_BOUNDARY_DISTANCE: usize = 200;

/// One header-detection pattern with its fixed confidence weight.
#[derive(Debug, Clone)]
pub struct DetectionStrategy {
    /// Strategy name, recorded on every boundary it produces
    pub name: &'static str,

    /// Compiled header pattern
    pub pattern: Regex,

    /// Fixed confidence weight (0.5-0.9)
    pub confidence: f64,

    /// Whether group 1 of the pattern captures an item designator
    pub captures_item: bool,
}

impl DetectionStrategy {
    fn compile(name: &'static str, pattern: &str, confidence: f64, captures_item: bool) -> Self {
        // The default table is static and known-good; a bad custom pattern
        // would surface here at construction, not during detection.
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()
            .unwrap_or_else(|e| panic!("invalid detection pattern '{}': {}", name, e));
        Self {
            name,
            pattern,
            confidence,
            captures_item,
        }
    }

    /// The fixed, ordered strategy table covering SEC filing conventions.
    pub fn defaults() -> Vec<DetectionStrategy> {
        vec![
            // Box-drawn headers (Microsoft-style formatting)
            Self::compile(
                "boxed_headers",
                r"[│┃║]\s*ITEM\s+(\d+[A-C]?)\.\s*([^│┃║\n]+?)\s*[│┃║]",
                0.9,
                true,
            ),
            // Bold/uppercase headers
            Self::compile(
                "bold_headers",
                r"(?:^|\n)\s*ITEM\s+(\d+[A-C]?)\.\s*([A-Z][A-Z\s,'\-]+?)(?:\s*\n|$)",
                0.8,
                true,
            ),
            // Standard mixed-case headers
            Self::compile(
                "standard_headers",
                r"(?:^|\n)\s*Item\s+(\d+[A-C]?)\.\s*([A-Z][A-Za-z\s,'\-]+?)(?:\s*\n|$)",
                0.7,
                true,
            ),
            // Table-of-contents entries with a trailing page number
            Self::compile(
                "toc_entries",
                r"(?:^|\n)\s*Item\s+(\d+[A-C]?)\.\s*([A-Za-z][A-Za-z\s,'\-]+?)\s+(\d+)\s*(?:\n|$)",
                0.6,
                true,
            ),
            // Bare part dividers; no item number
            Self::compile(
                "part_headers",
                r"(?:^|\n)\s*PART\s+[IVX]+\s*(?:\n|$)",
                0.5,
                false,
            ),
        ]
    }
}

/// Scans filing text for section boundaries using the strategy table.
pub struct BoundaryDetector {
    strategies: Vec<DetectionStrategy>,
}

impl Default for BoundaryDetector {
    fn default() -> Self {
        Self::new(DetectionStrategy::defaults())
    }
}

impl BoundaryDetector {
    /// Create a detector over a custom strategy table.
    pub fn new(strategies: Vec<DetectionStrategy>) -> Self {
        Self { strategies }
    }

    /// Detect section boundaries.
    ///
    /// Never fails: a pattern with no matches simply contributes nothing, and
    /// an empty result signals "no structure found" to the caller, which
    /// falls back to whole-document processing.
    pub fn detect(&self, text: &str) -> Vec<Boundary> {
        let mut raw = Vec::new();

        for strategy in &self.strategies {
            for m in strategy.pattern.captures_iter(text) {
                let whole = match m.get(0) {
                    Some(w) => w,
                    None => continue,
                };

                let (item_number, title) = if strategy.captures_item {
                    let item = match m.get(1) {
                        Some(g) => g.as_str().to_uppercase(),
                        None => continue,
                    };
                    let title = m
                        .get(2)
                        .map(|g| g.as_str().trim().to_string())
                        .unwrap_or_default();
                    (Some(item), title)
                } else {
                    (None, whole.as_str().trim().to_string())
                };

                raw.push(Boundary {
                    strategy: strategy.name.to_string(),
                    confidence: strategy.confidence,
                    position: whole.start(),
                    end_position: whole.end(),
                    item_number,
                    title,
                    context_before: slice_before(text, whole.start()),
                    context_after: slice_after(text, whole.end()),
                });
            }
        }

        raw.sort_by_key(|b| b.position);
        debug!(matches = raw.len(), "raw boundary matches collected");

        let filtered = self.filter(text, raw);
        info!(boundaries = filtered.len(), "section boundaries detected");
        filtered
    }

    /// Resolution pass: dedup by item number, gate part headers on following
    /// content, then suppress near-duplicates.
    fn filter(&self, text: &str, raw: Vec<Boundary>) -> Vec<Boundary> {
        let mut kept: Vec<Boundary> = Vec::new();
        // item number (or normalized part title) -> index into `kept`
        let mut seen: HashMap<String, usize> = HashMap::new();

        for boundary in raw {
            match &boundary.item_number {
                Some(item) => {
                    let key = item.clone();
                    match seen.get(&key) {
                        // Earlier positions win ties because input is
                        // position-sorted and replacement is strict.
                        Some(&idx) if kept[idx].confidence >= boundary.confidence => {}
                        Some(&idx) => {
                            kept[idx] = boundary;
                        }
                        None => {
                            seen.insert(key, kept.len());
                            kept.push(boundary);
                        }
                    }
                }
                None => {
                    let key = boundary.title.to_uppercase();
                    if seen.contains_key(&key) {
                        continue;
                    }
                    // Table-of-contents references and decorative repeats have
                    // nothing but box art after them.
                    if !has_following_content(text, boundary.position) {
                        continue;
                    }
                    seen.insert(key, kept.len());
                    kept.push(boundary);
                }
            }
        }

        kept.sort_by_key(|b| b.position);

        let mut result: Vec<Boundary> = Vec::new();
        for boundary in kept {
            let too_close = result
                .iter()
                .any(|existing| boundary.position - existing.position < MIN_BOUNDARY_DISTANCE);
            if !too_close {
                result.push(boundary);
            }
        }
        result
    }
}

/// True when at least `PART_MIN_CONTENT` non-decorative bytes follow within
/// the lookahead window.
fn has_following_content(text: &str, position: usize) -> bool {
    let end = floor_char_boundary(text, (position + PART_LOOKAHEAD_BYTES).min(text.len()));
    let window = &text[position..end];
    let substantial = window
        .chars()
        .filter(|c| !c.is_whitespace() && !is_decoration(*c))
        .count();
    substantial > PART_MIN_CONTENT
}

fn is_decoration(c: char) -> bool {
    matches!(
        c,
        '│' | '┃' | '║' | '╔' | '╗' | '╚' | '╝' | '╭' | '╮' | '╰' | '╯' | '─' | '═' | '•'
            | '-' | '=' | '_'
    )
}

fn slice_before(text: &str, position: usize) -> String {
    let start = floor_char_boundary(text, position.saturating_sub(CONTEXT_BYTES));
    text[start..position].to_string()
}

fn slice_after(text: &str, position: usize) -> String {
    let end = floor_char_boundary(text, (position + CONTEXT_BYTES).min(text.len()));
    text[position..end].to_string()
}

/// Largest char boundary at or below `index`.
pub(crate) fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(len: usize) -> String {
        "The registrant discusses material developments in detail here. "
            .repeat(len / 64 + 1)
    }

    #[test]
    fn test_detects_standard_headers() {
        let text = format!(
            "Item 1. Business\n{}\nItem 1A. Risk Factors\n{}\nItem 2. Properties\n{}",
            filler(400),
            filler(400),
            filler(400)
        );
        let boundaries = BoundaryDetector::default().detect(&text);
        let items: Vec<_> = boundaries
            .iter()
            .filter_map(|b| b.item_number.as_deref())
            .collect();
        assert_eq!(items, vec!["1", "1A", "2"]);
    }

    #[test]
    fn test_sorted_by_position() {
        let text = format!(
            "Item 2. Properties\n{}\nItem 1. Business\n{}",
            filler(400),
            filler(400)
        );
        let boundaries = BoundaryDetector::default().detect(&text);
        assert!(boundaries.windows(2).all(|w| w[0].position <= w[1].position));
    }

    #[test]
    fn test_dedup_keeps_highest_confidence() {
        // The same item appears both as a boxed header (0.9) and a standard
        // header (0.7); only the boxed match may survive.
        let text = format!(
            "Item 1A. Risk Factors\n{}\n│ ITEM 1A. RISK FACTORS │\n{}",
            filler(400),
            filler(400)
        );
        let boundaries = BoundaryDetector::default().detect(&text);
        let risk: Vec<_> = boundaries
            .iter()
            .filter(|b| b.item_number.as_deref() == Some("1A"))
            .collect();
        assert_eq!(risk.len(), 1);
        assert_eq!(risk[0].strategy, "boxed_headers");
        assert!((risk[0].confidence - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_part_header_without_content_dropped() {
        // A PART header followed only by box art is a decorative repeat.
        let text = format!("PART I\n{}\n\nPART II\n════════════\n──────\n", filler(600));
        let boundaries = BoundaryDetector::default().detect(&text);
        let parts: Vec<_> = boundaries
            .iter()
            .filter(|b| b.item_number.is_none())
            .collect();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].title.to_uppercase().contains("PART I"));
    }

    #[test]
    fn test_near_duplicates_suppressed() {
        // An item header hugging a PART divider is the same boundary twice;
        // only the earlier one survives the distance pass.
        let text = format!("PART I\nItem 1. Business\n{}", filler(1200));
        let boundaries = BoundaryDetector::default().detect(&text);
        assert_eq!(boundaries.len(), 1);
    }

    #[test]
    fn test_no_boundaries_is_empty_not_error() {
        let boundaries = BoundaryDetector::default().detect("plain prose, no headers at all");
        assert!(boundaries.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(BoundaryDetector::default().detect("").is_empty());
    }

    #[test]
    fn test_toc_entry_loses_to_real_header() {
        let text = format!(
            "Item 7. Management's Discussion and Analysis   45\n{}\nITEM 7. MANAGEMENT'S DISCUSSION AND ANALYSIS\n{}",
            filler(400),
            filler(400)
        );
        let boundaries = BoundaryDetector::default().detect(&text);
        let item7: Vec<_> = boundaries
            .iter()
            .filter(|b| b.item_number.as_deref() == Some("7"))
            .collect();
        assert_eq!(item7.len(), 1);
        assert!(item7[0].confidence > 0.6);
    }

    #[test]
    fn test_context_snippets_bounded() {
        let text = format!("{}\nItem 1. Business\n{}", filler(400), filler(400));
        let boundaries = BoundaryDetector::default().detect(&text);
        assert_eq!(boundaries.len(), 1);
        assert!(boundaries[0].context_before.len() <= CONTEXT_BYTES);
        assert!(boundaries[0].context_after.len() <= CONTEXT_BYTES);
    }

    #[test]
    fn test_floor_char_boundary_multibyte() {
        let text = "a─b";
        // '─' is 3 bytes starting at index 1
        assert_eq!(floor_char_boundary(text, 2), 1);
        assert_eq!(floor_char_boundary(text, 99), text.len());
    }
}
