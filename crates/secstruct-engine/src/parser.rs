//! Parsing model responses into structured chunk results
//!
//! Models wrap JSON in markdown fences, prepend commentary, or append
//! apologies. Extraction is therefore lenient: strip fences first, then fall
//! back to the outermost brace pair. The JSON itself must still parse; a
//! truncated object is a hard error that triggers a retry upstream.

use crate::error::EngineError;
use secstruct_domain::{ChunkResponse, ProcessingStatus};
use serde_json::Value;
use tracing::debug;

/// Parse a raw model response into a [`ChunkResponse`].
pub fn parse_chunk_response(raw: &str) -> Result<ChunkResponse, EngineError> {
    let json_text = extract_json(raw).ok_or_else(|| {
        EngineError::InvalidFormat("no JSON object found in response".to_string())
    })?;

    let value: Value = serde_json::from_str(json_text)
        .map_err(|e| EngineError::JsonParse(e.to_string()))?;

    let obj = value
        .as_object()
        .ok_or_else(|| EngineError::InvalidFormat("response is not a JSON object".to_string()))?;

    let status_raw = obj
        .get("processing_status")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let status = ProcessingStatus::parse(status_raw);

    let sections = obj
        .get("sections")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let metadata = obj.get("chunk_metadata").and_then(Value::as_object);

    let sections_completed: Vec<String> = metadata
        .and_then(|m| m.get("sections_completed"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let next_expected_item = metadata
        .and_then(|m| m.get("next_expected_item"))
        .and_then(Value::as_str)
        .map(str::to_string);

    debug!(
        status = %status,
        sections = sections.len(),
        completed = sections_completed.len(),
        "chunk response parsed"
    );

    Ok(ChunkResponse {
        status,
        sections,
        sections_completed,
        next_expected_item,
    })
}

/// Locate the JSON payload inside a possibly noisy response.
fn extract_json(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();

    // Fenced block first: ```json ... ``` or bare ``` ... ```
    if let Some(after_open) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    {
        if let Some(close) = after_open.find("```") {
            let inner = after_open[..close].trim();
            if !inner.is_empty() {
                return Some(inner);
            }
        }
    }

    // Otherwise the outermost brace pair; survives leading commentary.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end > start {
        Some(&trimmed[start..=end])
    } else {
        None
    }
}
