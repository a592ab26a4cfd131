//! Trait definitions for external interactions
//!
//! These traits define the boundary between the segmentation engine and
//! infrastructure. Implementations live in other crates (secstruct-llm);
//! the engine only ever sees an injected handle, so tests substitute
//! scripted doubles instead of live network calls.

/// Trait for the remote text-generation model.
///
/// One blocking, fallible round-trip per call. The model is rate-limited by
/// caller discipline only and non-deterministic for identical prompts; the
/// engine tolerates response variance, especially in self-reported status
/// fields.
pub trait LlmProvider {
    /// Error type for model operations
    type Error;

    /// Generate text for a prompt
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}
