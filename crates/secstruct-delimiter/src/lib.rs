//! Delimiter-based filing parser and structure transformer
//!
//! The non-model path: some filings arrive already segmented with box-drawing
//! delimiters (`╔═ § ═` between parts, `╭─ • ─` between sections). This crate
//! parses those into a parts→sections tree and transforms the tree, or a
//! previously serialized document in either legacy shape, into one canonical
//! JSON structure with per-section statistics and a document summary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod parser;
pub mod transform;

pub use error::DelimiterError;
pub use parser::{DelimiterParser, ParsedFiling, ParsedPart, ParsedSection};
pub use transform::{SectionsShape, StructureTransformer};
