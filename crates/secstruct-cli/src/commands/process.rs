//! Process command - run a filing through the model-backed pipeline.

use super::{load_config, read_document, write_json};
use crate::cli::{ProcessArgs, ProviderKind};
use anyhow::Result;
use secstruct_engine::FilingPipeline;
use secstruct_llm::{GeminiProvider, MockProvider};
use tracing::info;

/// The mock provider's canned reply: a valid empty completed response, enough
/// for offline dry runs of the full pipeline.
const MOCK_RESPONSE: &str =
    r#"{"processing_status": "completed", "sections": {}, "chunk_metadata": {"sections_completed": []}}"#;

/// Execute the process command.
pub fn execute_process(args: ProcessArgs) -> Result<()> {
    let document = read_document(&args.input)?;
    let config = load_config(args.config.as_deref())?;
    info!(
        input = %args.input.display(),
        form = %args.form,
        "processing filing"
    );

    let filing = match args.provider {
        ProviderKind::Gemini => {
            let provider = GeminiProvider::from_env()?;
            FilingPipeline::new(provider, config, args.form)?.process(&document)
        }
        ProviderKind::Mock => {
            let provider = MockProvider::new(MOCK_RESPONSE);
            FilingPipeline::new(provider, config, args.form)?.process(&document)
        }
    };

    if !filing.metadata.failed_chunks.is_empty() {
        eprintln!(
            "Warning: {} chunk(s) failed; see PROCESSING_METADATA in the output",
            filing.metadata.failed_chunks.len()
        );
    }
    write_json(args.output.as_deref(), &filing.to_pretty_string())
}
