//! Processing status reported by the model for a chunk
//!
//! The remote model reports its own completion bookkeeping as a free-text
//! convention ("completed", "partial_item_2", "stopped_at_item_7A"). That
//! string is parsed exactly once, here, into an explicit variant so the
//! processor's state machine pattern-matches instead of substring-parsing.

use std::fmt;

/// Self-reported completion status of one chunk-processing attempt.
///
/// The field is advisory: the combiner extracts structured content regardless,
/// so an unrecognized status is carried as [`ProcessingStatus::Unknown`]
/// rather than treated as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// All sections in the chunk were emitted
    Completed,

    /// The model stopped partway; the payload names the item it was in
    PartialAt(String),

    /// The model stopped before an item; the payload names it
    StoppedAt(String),

    /// Any status string outside the convention, preserved verbatim
    Unknown(String),
}

impl ProcessingStatus {
    /// Parse the model's raw `processing_status` string.
    ///
    /// Recognizes the `completed*`, `partial*` and `stopped*` prefixes used by
    /// the chunk prompt contract; anything else becomes `Unknown`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_lowercase();
        if lower.starts_with("completed") {
            ProcessingStatus::Completed
        } else if let Some(rest) = lower.strip_prefix("partial") {
            ProcessingStatus::PartialAt(Self::item_id(rest))
        } else if let Some(rest) = lower.strip_prefix("stopped") {
            ProcessingStatus::StoppedAt(Self::item_id(rest))
        } else {
            ProcessingStatus::Unknown(trimmed.to_string())
        }
    }

    /// Extract the item designator from a status suffix like `_item_7A` or `_at_item_2`.
    fn item_id(suffix: &str) -> String {
        suffix
            .rsplit(['_', ' '])
            .next()
            .unwrap_or("")
            .to_uppercase()
    }

    /// Whether this status indicates the chunk may have unfinished sections.
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            ProcessingStatus::PartialAt(_) | ProcessingStatus::StoppedAt(_)
        )
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingStatus::Completed => write!(f, "completed"),
            ProcessingStatus::PartialAt(item) => write!(f, "partial_item_{}", item),
            ProcessingStatus::StoppedAt(item) => write!(f, "stopped_at_item_{}", item),
            ProcessingStatus::Unknown(raw) => write!(f, "unknown({})", raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completed() {
        assert_eq!(
            ProcessingStatus::parse("completed"),
            ProcessingStatus::Completed
        );
        assert_eq!(
            ProcessingStatus::parse("completed_through_item_5"),
            ProcessingStatus::Completed
        );
    }

    #[test]
    fn test_parse_partial() {
        assert_eq!(
            ProcessingStatus::parse("partial_item_2"),
            ProcessingStatus::PartialAt("2".to_string())
        );
        assert_eq!(
            ProcessingStatus::parse("partial_item_7A"),
            ProcessingStatus::PartialAt("7A".to_string())
        );
    }

    #[test]
    fn test_parse_stopped() {
        assert_eq!(
            ProcessingStatus::parse("stopped_at_item_9"),
            ProcessingStatus::StoppedAt("9".to_string())
        );
    }

    #[test]
    fn test_parse_unknown_preserves_raw() {
        let status = ProcessingStatus::parse("done-ish");
        assert_eq!(status, ProcessingStatus::Unknown("done-ish".to_string()));
    }

    #[test]
    fn test_is_partial() {
        assert!(ProcessingStatus::parse("partial_item_2").is_partial());
        assert!(ProcessingStatus::parse("stopped_at_item_2").is_partial());
        assert!(!ProcessingStatus::Completed.is_partial());
        assert!(!ProcessingStatus::parse("garbage").is_partial());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            ProcessingStatus::parse("COMPLETED"),
            ProcessingStatus::Completed
        );
    }
}
