//! End-to-end filing pipeline: detect, plan, process, combine
//!
//! One chunk is in flight at a time. Partial completions push their remainder
//! to the front of the queue so document order is preserved, and the set of
//! completed section labels grows monotonically across chunks so later
//! prompts can tell the model what not to re-extract.

use crate::combiner::ResultCombiner;
use crate::config::EngineConfig;
use crate::detector::BoundaryDetector;
use crate::error::EngineError;
use crate::identity::{extract_identity, FilingIdentity};
use crate::planner::ChunkPlanner;
use crate::processor::{ChunkContext, ChunkProcessor};
use secstruct_domain::{
    Boundary, ChunkResult, FormType, LlmProvider, ProcessingChunk, StructuredFiling,
};
use std::collections::VecDeque;
use std::fmt::Display;
use tracing::{info, info_span, warn};

/// Dry-run view of how a document would be segmented, without any model calls.
#[derive(Debug)]
pub struct SegmentationPreview {
    /// Extracted company and year
    pub identity: FilingIdentity,

    /// Detected section boundaries, in document order
    pub boundaries: Vec<Boundary>,

    /// Planned chunks
    pub chunks: Vec<ProcessingChunk>,
}

/// Processes whole filings against a provider.
pub struct FilingPipeline<L> {
    provider: L,
    config: EngineConfig,
    form: FormType,
    detector: BoundaryDetector,
}

impl<L> FilingPipeline<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a pipeline; fails only on an invalid configuration.
    pub fn new(provider: L, config: EngineConfig, form: FormType) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Config)?;
        Ok(Self {
            provider,
            config,
            form,
            detector: BoundaryDetector::default(),
        })
    }

    /// Process a complete filing document into a structured result.
    ///
    /// Never fails: chunks that exhaust their retries are recorded in the
    /// output metadata rather than aborting the document.
    pub fn process(&self, document: &str) -> StructuredFiling {
        let identity = extract_identity(document);
        let span = info_span!("filing", company = %identity.company, year = %identity.year);
        let _guard = span.enter();
        info!(form = %self.form, bytes = document.len(), "processing filing");

        let boundaries = self.detector.detect(document);
        if boundaries.is_empty() {
            warn!("no section boundaries detected; falling back to whole-document chunk");
        }
        let planner = ChunkPlanner::new(&self.config);
        let chunks = planner.plan(document, &boundaries);

        let results = self.drain_queue(chunks.into(), &identity);

        ResultCombiner::new(self.form).combine(&results, &identity.company, &identity.year)
    }

    /// Segment a document without calling the provider.
    pub fn preview(&self, document: &str) -> SegmentationPreview {
        let identity = extract_identity(document);
        let boundaries = self.detector.detect(document);
        let chunks = ChunkPlanner::new(&self.config).plan(document, &boundaries);
        SegmentationPreview {
            identity,
            boundaries,
            chunks,
        }
    }

    fn drain_queue(
        &self,
        mut queue: VecDeque<ProcessingChunk>,
        identity: &FilingIdentity,
    ) -> Vec<ChunkResult> {
        let processor = ChunkProcessor::new(&self.provider, &self.config);
        let mut results: Vec<ChunkResult> = Vec::new();
        let mut completed_sections: Vec<String> = Vec::new();
        let mut is_first_chunk = true;

        while let Some(chunk) = queue.pop_front() {
            let ctx = ChunkContext {
                company: &identity.company,
                year: &identity.year,
                form: self.form,
                is_first_chunk,
                completed_sections: &completed_sections,
            };
            let mut result = processor.process(chunk, &ctx);
            is_first_chunk = false;

            if let Some(remainder) = result.remaining_chunk.take() {
                // Front of the queue keeps the remainder ahead of later
                // chunks, preserving document order.
                queue.push_front(remainder);
            }
            if let Some(response) = &result.response {
                for label in &response.sections_completed {
                    if !completed_sections.contains(label) {
                        completed_sections.push(label.clone());
                    }
                }
            }
            results.push(result);
        }
        results
    }
}

impl<L> FilingPipeline<L> {
    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
