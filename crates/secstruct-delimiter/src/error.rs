//! Error types for the delimiter path

use thiserror::Error;

/// Errors that can occur while parsing a pre-delimited filing.
#[derive(Error, Debug)]
pub enum DelimiterError {
    /// The document contains no part delimiters at all
    #[error("No part delimiters found; input is not a pre-delimited filing")]
    NoParts,

    /// Every candidate section fell below the minimum content threshold
    #[error("No sections with substantial content (minimum {0} chars)")]
    NoSubstantialContent(usize),
}
