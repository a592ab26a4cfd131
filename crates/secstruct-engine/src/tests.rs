//! End-to-end pipeline tests against a scripted provider.

use crate::config::EngineConfig;
use crate::pipeline::FilingPipeline;
use crate::planner::ChunkPlanner;
use secstruct_domain::{Boundary, FormType};
use secstruct_llm::MockProvider;
use serde_json::Value;

fn filler(len: usize) -> String {
    "The registrant describes material aspects of its operations here. "
        .repeat(len / 67 + 1)
}

/// A plausible 10-K with a cover page and three detectable sections.
fn ten_k_document() -> String {
    format!(
        "UNITED STATES\nSECURITIES AND EXCHANGE COMMISSION\n\nFORM 10-K\n\n\
         GLOBEX CORPORATION\n\nFor the fiscal year ended December 31, 2022\n\n\
         Item 1. Business\n{}\n\
         Item 2. Properties\n{}\n\
         Item 3. Legal Proceedings\n{}\n",
        filler(600),
        filler(600),
        filler(600)
    )
}

fn response(status: &str, items: &[&str]) -> String {
    let sections: Vec<String> = items
        .iter()
        .map(|item| format!(r#""{}": {{"title": "{}", "content": "extracted body"}}"#, item, item))
        .collect();
    let completed: Vec<String> = items.iter().map(|item| format!("\"{}\"", item)).collect();
    format!(
        r#"{{
            "processing_status": "{}",
            "sections": {{{}}},
            "chunk_metadata": {{
                "sections_attempted": [{}],
                "sections_completed": [{}],
                "next_expected_item": null
            }}
        }}"#,
        status,
        sections.join(", "),
        completed.join(", "),
        completed.join(", ")
    )
}

fn section_count(output: &Value, company: &str, year: &str) -> u64 {
    output[company][year]["PROCESSING_METADATA"]["total_sections_extracted"]
        .as_u64()
        .unwrap_or(0)
}

#[test]
fn test_single_chunk_document_end_to_end() {
    let provider = MockProvider::new(response("completed", &["Item 1", "Item 2", "Item 3"]));
    let pipeline =
        FilingPipeline::new(provider, EngineConfig::default(), FormType::TenK).unwrap();
    let filing = pipeline.process(&ten_k_document());

    assert_eq!(filing.company, "GLOBEX_CORPORATION");
    assert_eq!(filing.year, "2022");
    assert_eq!(filing.metadata.chunks_processed, 1);
    assert!(filing.metadata.failed_chunks.is_empty());
    assert_eq!(filing.metadata.total_sections, 3);

    let output = filing.to_json();
    assert_eq!(section_count(&output, "GLOBEX_CORPORATION", "2022"), 3);
    assert_eq!(output["GLOBEX_CORPORATION"]["2022"]["FORM"], "10-K");
}

#[test]
fn test_multi_chunk_document_end_to_end() {
    // A budget small enough to force one section per chunk.
    let config = EngineConfig {
        max_input_tokens: 160,
        prompt_reserve_tokens: 0,
        ..EngineConfig::default()
    };
    let provider = MockProvider::new(String::new());
    provider.push_response(response("completed", &["Item 1"]));
    provider.push_response(response("completed", &["Item 2"]));
    provider.push_response(response("completed", &["Item 3"]));

    let pipeline = FilingPipeline::new(provider, config, FormType::TenK).unwrap();
    let filing = pipeline.process(&ten_k_document());

    assert_eq!(filing.metadata.chunks_processed, 3);
    assert_eq!(filing.metadata.total_sections, 3);
    assert!(filing.metadata.failed_chunks.is_empty());
}

#[test]
fn test_partial_completion_queues_and_finishes_remainder() {
    let provider = MockProvider::new(String::new());
    provider.push_response(response("stopped_at_item_2", &["Item 1"]));
    provider.push_response(response("completed", &["Item 2", "Item 3"]));

    let pipeline =
        FilingPipeline::new(provider, EngineConfig::default(), FormType::TenK).unwrap();
    let filing = pipeline.process(&ten_k_document());

    // One original chunk plus its continuation.
    assert_eq!(filing.metadata.chunks_processed, 2);
    assert_eq!(filing.metadata.total_sections, 3);
    assert!(filing.metadata.failed_chunks.is_empty());
}

#[test]
fn test_failing_provider_records_failures_instead_of_aborting() {
    let provider = MockProvider::always_failing();
    let pipeline =
        FilingPipeline::new(provider, EngineConfig::default(), FormType::TenK).unwrap();
    let filing = pipeline.process(&ten_k_document());

    assert_eq!(filing.metadata.chunks_processed, 0);
    assert_eq!(filing.metadata.total_sections, 0);
    assert!(!filing.metadata.failed_chunks.is_empty());
    assert!(filing.metadata.failed_chunks[0]
        .error
        .contains("mock transport failure"));
    // Identity extraction still works; the output stays addressable.
    assert_eq!(filing.company, "GLOBEX_CORPORATION");
}

#[test]
fn test_document_without_headers_uses_whole_document_fallback() {
    let provider = MockProvider::new(response("completed", &["Complete Document"]));
    let pipeline =
        FilingPipeline::new(provider, EngineConfig::default(), FormType::TenK).unwrap();
    let filing = pipeline.process("Plain narrative text with no recognizable headers at all.");

    assert_eq!(filing.metadata.chunks_processed, 1);
    assert_eq!(filing.metadata.total_sections, 1);
}

#[test]
fn test_unhelpful_partial_responses_terminate() {
    // The provider forever claims it completed Item 1 and nothing else. The
    // continuation chunk can never make progress; the pipeline must still
    // finish, with the remainder recorded as failed.
    let provider = MockProvider::new(response("stopped_at_item_2", &["Item 1"]));
    let pipeline =
        FilingPipeline::new(provider, EngineConfig::default(), FormType::TenK).unwrap();
    let filing = pipeline.process(&ten_k_document());

    assert_eq!(filing.metadata.failed_chunks.len(), 1);
    assert!(filing.metadata.total_sections >= 1);
}

#[test]
fn test_preview_reports_segmentation_without_model_calls() {
    let provider = MockProvider::new(String::new());
    let pipeline =
        FilingPipeline::new(provider, EngineConfig::default(), FormType::TenK).unwrap();
    let document = ten_k_document();
    let preview = pipeline.preview(&document);

    assert_eq!(preview.identity.company, "GLOBEX_CORPORATION");
    assert_eq!(preview.boundaries.len(), 3);
    let rebuilt: String = preview.chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(rebuilt, document);
}

#[test]
fn test_invalid_config_rejected_at_construction() {
    let config = EngineConfig {
        max_retries: 0,
        ..EngineConfig::default()
    };
    assert!(FilingPipeline::new(MockProvider::new(String::new()), config, FormType::TenK).is_err());
}

mod reconstruction {
    use super::*;
    use proptest::prelude::*;

    fn boundaries_for(lengths: &[usize], preamble: usize) -> (String, Vec<Boundary>) {
        let mut document = "x".repeat(preamble);
        let mut boundaries = Vec::new();
        for (i, len) in lengths.iter().enumerate() {
            boundaries.push(Boundary {
                strategy: "standard_headers".to_string(),
                confidence: 0.7,
                position: document.len(),
                end_position: document.len() + 6,
                item_number: Some(format!("{}", i + 1)),
                title: format!("Section {}", i + 1),
                context_before: String::new(),
                context_after: String::new(),
            });
            document.push_str(&"s".repeat(*len));
        }
        (document, boundaries)
    }

    proptest! {
        #[test]
        fn concatenated_chunks_reproduce_the_document(
            lengths in prop::collection::vec(1usize..600, 1..12),
            preamble in 0usize..300,
            budget in 20usize..400,
        ) {
            let (document, boundaries) = boundaries_for(&lengths, preamble);
            let config = EngineConfig {
                max_input_tokens: budget,
                prompt_reserve_tokens: 0,
                ..EngineConfig::default()
            };
            let chunks = ChunkPlanner::new(&config).plan(&document, &boundaries);
            let rebuilt: String = chunks.iter().map(|c| c.content.as_str()).collect();
            prop_assert_eq!(rebuilt, document.clone());
            prop_assert_eq!(chunks.first().map(|c| c.start), Some(0));
            prop_assert_eq!(chunks.last().map(|c| c.end), Some(document.len()));
        }
    }
}
