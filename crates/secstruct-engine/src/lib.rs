//! Filing segmentation and extraction engine
//!
//! Turns a raw SEC filing into a structured JSON document by detecting
//! section boundaries, packing sections into token-budgeted chunks, driving
//! each chunk through a language model with retry and backtracking, and
//! combining the per-chunk results into one category-routed filing.
//!
//! The engine is provider-agnostic: anything implementing
//! [`secstruct_domain::LlmProvider`] works, which keeps the whole pipeline
//! testable against a scripted mock.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod combiner;
pub mod config;
pub mod detector;
pub mod error;
pub mod estimator;
pub mod identity;
pub mod parser;
pub mod pipeline;
pub mod planner;
pub mod processor;
pub mod prompt;

pub use combiner::ResultCombiner;
pub use config::EngineConfig;
pub use detector::{BoundaryDetector, DetectionStrategy};
pub use error::EngineError;
pub use estimator::TokenEstimator;
pub use identity::{extract_identity, FilingIdentity};
pub use parser::parse_chunk_response;
pub use pipeline::{FilingPipeline, SegmentationPreview};
pub use planner::ChunkPlanner;
pub use processor::{ChunkContext, ChunkProcessor};
pub use prompt::ChunkPrompt;

#[cfg(test)]
mod tests;
