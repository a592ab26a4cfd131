//! secstruct Domain Layer
//!
//! This crate contains the core data model for secstruct: the vocabulary that
//! the segmentation engine, the delimiter parser, and the CLI all share.
//! It carries no I/O dependencies and defines the trait interface to the
//! remote text-generation model so every other layer can be tested against
//! scripted doubles.
//!
//! ## Key Concepts
//!
//! - **Boundary**: a detected start-of-section marker in raw filing text
//! - **ProcessingChunk**: a contiguous text span submitted to the model as one unit
//! - **ChunkResult**: the terminal outcome of processing one chunk, including
//!   any remaining work to requeue
//! - **StructuredFiling**: the final nested JSON artifact, keyed
//!   company → year → categories → items
//! - **FormType**: the filing-type-specific category tables (10-K, 10-Q, 8-K, Form 4)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod chunk;
pub mod filing;
pub mod form;
pub mod status;
pub mod traits;

// Re-exports for convenience
pub use boundary::Boundary;
pub use chunk::{ChunkId, ChunkResponse, ChunkResult, ProcessingChunk, SectionSpan};
pub use filing::{FailedChunk, ProcessingMetadata, StructuredFiling, SCHEMA_VERSION};
pub use form::FormType;
pub use status::ProcessingStatus;
pub use traits::LlmProvider;
