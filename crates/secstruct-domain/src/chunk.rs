//! Chunk module - processing units submitted to the model and their outcomes

use crate::status::ProcessingStatus;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier for a processing chunk.
///
/// Planned chunks get sequential ids ("chunk_1", "chunk_2", ...). Chunks
/// derived from backtracking carry a suffix so provenance survives into the
/// output metadata: "chunk_3_continued" for a requeued remainder,
/// "chunk_3_reduced" for a chunk shrunk after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkId(String);

impl ChunkId {
    /// Create an id for the `n`th planned chunk (1-based)
    pub fn new(n: usize) -> Self {
        Self(format!("chunk_{}", n))
    }

    /// Derive the id for the remainder of a partially completed chunk
    pub fn continued(&self) -> Self {
        Self(format!("{}_continued", self.0))
    }

    /// Derive the id for a shrunk retry of this chunk
    pub fn reduced(&self) -> Self {
        Self(format!("{}_reduced", self.0))
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One section covered by a chunk, annotated with its byte range and
/// estimated token cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpan {
    /// Item designator ("1", "1A", ...). None for part-level pseudo-sections.
    pub item_number: Option<String>,

    /// Section title as detected (may carry a continuation suffix after a split)
    pub title: String,

    /// Absolute byte offset of the section start in the document
    pub start: usize,

    /// Absolute byte offset of the section end (start of the next section)
    pub end: usize,

    /// Estimated input token cost of the section content
    pub estimated_tokens: usize,

    /// Detection confidence inherited from the winning boundary
    pub confidence: f64,
}

impl SectionSpan {
    /// Human-readable label: "Item 1A" for item sections, the title otherwise.
    pub fn label(&self) -> String {
        match &self.item_number {
            Some(num) => format!("Item {}", num),
            None => self.title.clone(),
        }
    }
}

/// A contiguous span of filing text submitted to the model in one request.
///
/// Invariant for planner output: chunks concatenated in order reconstruct the
/// document byte-for-byte. `content` is always the literal substring
/// `document[start..end]`, never re-derived from section slices.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingChunk {
    /// Chunk identifier
    pub id: ChunkId,

    /// Absolute byte offset of the chunk start
    pub start: usize,

    /// Absolute byte offset of the chunk end (exclusive)
    pub end: usize,

    /// Sections covered, in document order
    pub sections: Vec<SectionSpan>,

    /// The literal text span
    pub content: String,

    /// Estimated input token cost of `content`
    pub estimated_input_tokens: usize,

    /// Estimated output token cost (fixed fraction of input, a planning heuristic)
    pub estimated_output_tokens: usize,

    /// True when this chunk isolates a single section too large to share a
    /// request; downstream prompting expects a possibly-incomplete response.
    pub oversized: bool,
}

impl ProcessingChunk {
    /// Labels of all sections in this chunk, for prompts and metadata.
    pub fn section_labels(&self) -> Vec<String> {
        self.sections.iter().map(SectionSpan::label).collect()
    }
}

/// Parsed payload of a successful model response for one chunk.
#[derive(Debug, Clone)]
pub struct ChunkResponse {
    /// Completion status, parsed once from the raw `processing_status` field
    pub status: ProcessingStatus,

    /// Extracted sections keyed by the model's declared item title
    pub sections: Map<String, Value>,

    /// Section names the model reports as fully completed
    pub sections_completed: Vec<String>,

    /// The item the model expected to process next, if it said so
    pub next_expected_item: Option<String>,
}

/// Terminal outcome of processing one chunk.
///
/// Created per chunk (retried attempts replace rather than append). Terminal
/// once `success` is true with no `remaining_chunk`, or once the retry budget
/// was exhausted.
#[derive(Debug, Clone)]
pub struct ChunkResult {
    /// Id of the chunk this result describes
    pub chunk_id: ChunkId,

    /// Whether a usable response was obtained within the retry budget
    pub success: bool,

    /// The parsed response, present on success
    pub response: Option<ChunkResponse>,

    /// True when the model completed only part of the chunk and a remainder
    /// was packaged for requeueing
    pub partial: bool,

    /// Remainder covering the sections not yet completed, to be requeued
    /// ahead of later-planned chunks
    pub remaining_chunk: Option<ProcessingChunk>,

    /// Labels of the sections this chunk attempted
    pub sections_attempted: Vec<String>,

    /// Number of attempts consumed (1-based)
    pub attempts: u32,

    /// Error description when `success` is false
    pub error: Option<String>,

    /// Raw model response text, truncated, kept for post-mortem inspection
    pub raw_response: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_derivation() {
        let id = ChunkId::new(3);
        assert_eq!(id.as_str(), "chunk_3");
        assert_eq!(id.continued().as_str(), "chunk_3_continued");
        assert_eq!(id.reduced().as_str(), "chunk_3_reduced");
        assert_eq!(
            id.continued().reduced().as_str(),
            "chunk_3_continued_reduced"
        );
    }

    #[test]
    fn test_section_labels() {
        let chunk = ProcessingChunk {
            id: ChunkId::new(1),
            start: 0,
            end: 20,
            sections: vec![
                SectionSpan {
                    item_number: Some("1".to_string()),
                    title: "Business".to_string(),
                    start: 0,
                    end: 10,
                    estimated_tokens: 2,
                    confidence: 0.7,
                },
                SectionSpan {
                    item_number: None,
                    title: "PART II".to_string(),
                    start: 10,
                    end: 20,
                    estimated_tokens: 2,
                    confidence: 0.5,
                },
            ],
            content: "x".repeat(20),
            estimated_input_tokens: 5,
            estimated_output_tokens: 1,
            oversized: false,
        };
        assert_eq!(chunk.section_labels(), vec!["Item 1", "PART II"]);
    }
}
