//! Combining chunk results into a single structured filing
//!
//! The combiner is deterministic: the same results in the same order always
//! produce the same document. Section keys are routed into form-specific
//! categories by item designator; a later chunk writing the same key
//! overwrites the earlier value, so continuation chunks naturally supersede
//! partial extractions.

use regex::Regex;
use secstruct_domain::{
    ChunkResult, FailedChunk, FormType, ProcessingMetadata, StructuredFiling,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Merges per-chunk extraction results into one [`StructuredFiling`].
pub struct ResultCombiner {
    form: FormType,
}

impl ResultCombiner {
    /// Create a combiner for the given form type.
    pub fn new(form: FormType) -> Self {
        Self { form }
    }

    /// Merge results into the form's category skeleton.
    ///
    /// Every category the form defines appears in the output even when
    /// empty, so downstream consumers see a stable shape.
    pub fn combine(
        &self,
        results: &[ChunkResult],
        company: &str,
        year: &str,
    ) -> StructuredFiling {
        let mut categories: Vec<(String, Map<String, Value>)> = self
            .form
            .categories()
            .iter()
            .map(|name| (name.to_string(), Map::new()))
            .collect();
        let mut failed_chunks: Vec<FailedChunk> = Vec::new();
        let mut chunks_processed = 0usize;

        for result in results {
            if !result.success {
                warn!(
                    chunk = result.chunk_id.as_str(),
                    error = result.error.as_deref().unwrap_or("unknown"),
                    "recording failed chunk"
                );
                failed_chunks.push(FailedChunk {
                    chunk_id: result.chunk_id.clone(),
                    error: result
                        .error
                        .clone()
                        .unwrap_or_else(|| "unknown error".to_string()),
                    sections_attempted: result.sections_attempted.clone(),
                });
                continue;
            }
            chunks_processed += 1;

            let response = match &result.response {
                Some(response) => response,
                None => continue,
            };
            for (key, value) in &response.sections {
                let category = self.route(key);
                debug!(section = %key, category = %category, "routing section");
                if let Some((_, map)) = categories.iter_mut().find(|(name, _)| name == category) {
                    map.insert(key.clone(), value.clone());
                }
            }
        }

        let total_sections: usize = categories.iter().map(|(_, map)| map.len()).sum();
        let sections_by_category: Vec<(String, usize)> = categories
            .iter()
            .map(|(name, map)| (name.clone(), map.len()))
            .collect();

        info!(
            company,
            year,
            chunks_processed,
            failed = failed_chunks.len(),
            total_sections,
            "combined chunk results"
        );

        StructuredFiling {
            company: company.to_string(),
            year: year.to_string(),
            form: self.form,
            categories,
            metadata: ProcessingMetadata {
                chunks_processed,
                failed_chunks,
                total_sections,
                sections_by_category,
            },
        }
    }

    /// Category for a section key, by item designator where one is present.
    fn route(&self, key: &str) -> &'static str {
        // Static pattern; compilation cannot fail.
        let designator = Regex::new(r"(?i)Item\s+(\d+(?:\.\d+)?[A-C]?)")
            .ok()
            .and_then(|re| {
                re.captures(key)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_uppercase())
            });
        match designator {
            Some(item) => self.form.category_for_item(&item),
            None => self.form.default_category(),
        }
    }
}
