//! Detect command - show boundaries and the chunk plan without model calls.

use super::{load_config, read_document};
use crate::cli::DetectArgs;
use anyhow::Result;
use secstruct_engine::FilingPipeline;
use secstruct_llm::MockProvider;
use serde_json::json;

/// Execute the detect command.
pub fn execute_detect(args: DetectArgs) -> Result<()> {
    let document = read_document(&args.input)?;
    let config = load_config(args.config.as_deref())?;

    // The provider is never called for a preview.
    let pipeline = FilingPipeline::new(MockProvider::default(), config, args.form)?;
    let preview = pipeline.preview(&document);

    let boundaries: Vec<_> = preview
        .boundaries
        .iter()
        .map(|b| {
            json!({
                "strategy": b.strategy,
                "confidence": b.confidence,
                "position": b.position,
                "item_number": b.item_number,
                "title": b.title,
            })
        })
        .collect();

    let chunks: Vec<_> = preview
        .chunks
        .iter()
        .map(|c| {
            json!({
                "id": c.id.as_str(),
                "start": c.start,
                "end": c.end,
                "estimated_input_tokens": c.estimated_input_tokens,
                "estimated_output_tokens": c.estimated_output_tokens,
                "oversized": c.oversized,
                "sections": c.section_labels(),
            })
        })
        .collect();

    let report = json!({
        "company": preview.identity.company,
        "year": preview.identity.year,
        "form": args.form.as_str(),
        "boundaries": boundaries,
        "chunks": chunks,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
