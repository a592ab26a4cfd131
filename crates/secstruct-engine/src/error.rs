//! Error types for the segmentation engine

use thiserror::Error;

/// Errors that can occur inside the engine.
///
/// Per-chunk failures never surface as errors from the pipeline; they are
/// captured into the final filing's metadata. These variants cover the
/// recoverable conditions inside one attempt and configuration problems.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Model provider error
    #[error("Model error: {0}")]
    Llm(String),

    /// Response was not the expected JSON shape
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::JsonParse(e.to_string())
    }
}
