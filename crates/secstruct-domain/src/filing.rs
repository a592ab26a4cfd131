//! StructuredFiling - the pipeline's terminal artifact

use crate::chunk::ChunkId;
use crate::form::FormType;
use serde_json::{json, Map, Value};

/// Version stamp written into every produced document.
///
/// The original output had no versioning field; consumers need one to detect
/// shape changes, so it is added here.
pub const SCHEMA_VERSION: &str = "1";

/// Record of a chunk that exhausted its retry budget.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedChunk {
    /// Id of the failed chunk
    pub chunk_id: ChunkId,

    /// Error description from the last attempt
    pub error: String,

    /// Labels of the sections the chunk covered
    pub sections_attempted: Vec<String>,
}

/// Provenance and failure metadata recorded by the combiner.
///
/// Deliberately contains no wall-clock timestamp: combining the same results
/// twice must yield byte-identical JSON.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessingMetadata {
    /// Total number of chunk results consumed
    pub chunks_processed: usize,

    /// Chunks that failed past the retry budget
    pub failed_chunks: Vec<FailedChunk>,

    /// Total sections placed across all categories
    pub total_sections: usize,

    /// Per-category section counts, in category-skeleton order
    pub sections_by_category: Vec<(String, usize)>,
}

/// The final artifact: one filing's content routed into its form-mandated
/// categories, plus processing metadata. Immutable once the combiner returns.
#[derive(Debug, Clone)]
pub struct StructuredFiling {
    /// Company identifier (normalized, underscores for spaces)
    pub company: String,

    /// Fiscal year of the filing
    pub year: String,

    /// Filing form type
    pub form: FormType,

    /// Category name → (item name → extracted content), in skeleton order
    pub categories: Vec<(String, Map<String, Value>)>,

    /// Chunk-level provenance and failure metadata
    pub metadata: ProcessingMetadata,
}

impl StructuredFiling {
    /// Serialize to the nested `{company: {year: {...}}}` document shape.
    pub fn to_json(&self) -> Value {
        let mut categories = Map::new();
        for (name, items) in &self.categories {
            categories.insert(name.clone(), Value::Object(items.clone()));
        }

        let failed: Vec<Value> = self
            .metadata
            .failed_chunks
            .iter()
            .map(|f| {
                json!({
                    "chunk_id": f.chunk_id.as_str(),
                    "error": f.error,
                    "sections_attempted": f.sections_attempted,
                })
            })
            .collect();

        let mut by_category = Map::new();
        for (name, count) in &self.metadata.sections_by_category {
            by_category.insert(name.clone(), json!(count));
        }

        json!({
            self.company.clone(): {
                self.year.clone(): {
                    "FORM": self.form.as_str(),
                    "SCHEMA_VERSION": SCHEMA_VERSION,
                    "CATEGORIES": categories,
                    "PROCESSING_METADATA": {
                        "processing_method": "incremental_with_backtracking",
                        "chunks_processed": self.metadata.chunks_processed,
                        "failed_chunks": failed,
                        "total_sections_extracted": self.metadata.total_sections,
                        "sections_by_category": by_category,
                    },
                }
            }
        })
    }

    /// Pretty-printed JSON for persistence.
    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json())
            .unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StructuredFiling {
        let mut items = Map::new();
        items.insert(
            "Item 1A. Risk Factors".to_string(),
            json!({"content": "risks"}),
        );
        StructuredFiling {
            company: "ACME_INC".to_string(),
            year: "2023".to_string(),
            form: FormType::TenK,
            categories: vec![
                ("Part I: Business and Risk Factors".to_string(), items),
                ("Part II: Financial Information".to_string(), Map::new()),
            ],
            metadata: ProcessingMetadata {
                chunks_processed: 2,
                failed_chunks: vec![FailedChunk {
                    chunk_id: ChunkId::new(2),
                    error: "retries exhausted".to_string(),
                    sections_attempted: vec!["Item 7".to_string()],
                }],
                total_sections: 1,
                sections_by_category: vec![
                    ("Part I: Business and Risk Factors".to_string(), 1),
                    ("Part II: Financial Information".to_string(), 0),
                ],
            },
        }
    }

    #[test]
    fn test_nested_shape() {
        let value = sample().to_json();
        let year = &value["ACME_INC"]["2023"];
        assert_eq!(year["FORM"], "10-K");
        assert_eq!(year["SCHEMA_VERSION"], SCHEMA_VERSION);
        assert_eq!(
            year["CATEGORIES"]["Part I: Business and Risk Factors"]
                ["Item 1A. Risk Factors"]["content"],
            "risks"
        );
        assert_eq!(
            year["PROCESSING_METADATA"]["failed_chunks"][0]["chunk_id"],
            "chunk_2"
        );
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let filing = sample();
        assert_eq!(filing.to_pretty_string(), filing.to_pretty_string());
    }
}
