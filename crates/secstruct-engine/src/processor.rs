//! Chunk processing with retry and backtracking
//!
//! A chunk attempt can fail three ways: the prompt is too large before it is
//! ever sent, the provider errors, or the response does not parse. All three
//! shrink the chunk and retry. A parseable response that reports partial or
//! stopped status instead splits the chunk: completed sections are kept and
//! the remainder is handed back to the caller as a new chunk to queue.

use crate::config::EngineConfig;
use crate::detector::floor_char_boundary;
use crate::estimator::TokenEstimator;
use crate::parser::parse_chunk_response;
use crate::prompt::ChunkPrompt;
use regex::Regex;
use secstruct_domain::{
    ChunkResponse, ChunkResult, FormType, LlmProvider, ProcessingChunk, ProcessingStatus,
    SectionSpan,
};
use std::collections::HashSet;
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Raw responses stored on failed results are capped at this many bytes.
const RAW_RESPONSE_CAP: usize = 1000;

/// Chunks smaller than this cannot usefully shrink further.
const MIN_SHRINK_BYTES: usize = 200;

/// Search distance around the midpoint when splitting a single section.
const SPLIT_SEARCH_WINDOW: usize = 100;

/// Per-document state threaded through each chunk attempt.
pub struct ChunkContext<'a> {
    /// Normalized company identifier
    pub company: &'a str,

    /// Fiscal year string
    pub year: &'a str,

    /// Filing form
    pub form: FormType,

    /// Whether this chunk is the first for the document
    pub is_first_chunk: bool,

    /// Labels of sections completed by earlier chunks
    pub completed_sections: &'a [String],
}

/// Drives one chunk through the model, shrinking and splitting as needed.
pub struct ChunkProcessor<'a, L> {
    provider: &'a L,
    config: &'a EngineConfig,
    estimator: TokenEstimator,
}

impl<'a, L> ChunkProcessor<'a, L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a processor over the given provider and configuration.
    pub fn new(provider: &'a L, config: &'a EngineConfig) -> Self {
        Self {
            provider,
            config,
            estimator: TokenEstimator::new(config.chars_per_token),
        }
    }

    /// Process a chunk to completion, partial completion, or exhaustion.
    ///
    /// Always returns a result; a chunk that fails every attempt comes back
    /// with `success == false` and the last error recorded, never a panic or
    /// an `Err` that would abort the document.
    pub fn process(&self, chunk: ProcessingChunk, ctx: &ChunkContext<'_>) -> ChunkResult {
        let original_id = chunk.id.clone();
        let mut current = chunk;
        let mut last_error: Option<String> = None;
        let mut last_raw: Option<String> = None;
        let mut attempts = 0u32;

        while attempts < self.config.max_retries {
            attempts += 1;
            debug!(
                chunk = current.id.as_str(),
                attempt = attempts,
                sections = current.sections.len(),
                "processing chunk"
            );

            let prompt = ChunkPrompt {
                chunk: &current,
                company: ctx.company,
                year: ctx.year,
                form: ctx.form,
                is_first_chunk: ctx.is_first_chunk,
                previous_sections: ctx.completed_sections,
            }
            .build();

            let prompt_tokens = self.estimator.estimate(&prompt);
            if prompt_tokens > self.config.max_prompt_tokens {
                warn!(
                    chunk = current.id.as_str(),
                    prompt_tokens,
                    limit = self.config.max_prompt_tokens,
                    "prompt over limit before send; shrinking"
                );
                last_error = Some(format!(
                    "prompt estimate {} exceeds limit {}",
                    prompt_tokens, self.config.max_prompt_tokens
                ));
                match self.shrink(&current) {
                    Some(smaller) => {
                        current = smaller;
                        continue;
                    }
                    None => break,
                }
            }

            let raw = match self.provider.generate(&prompt) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(chunk = current.id.as_str(), error = %e, "provider error; shrinking");
                    last_error = Some(e.to_string());
                    match self.shrink(&current) {
                        Some(smaller) => {
                            current = smaller;
                            continue;
                        }
                        None => break,
                    }
                }
            };

            let response = match parse_chunk_response(&raw) {
                Ok(response) => response,
                Err(e) => {
                    warn!(chunk = current.id.as_str(), error = %e, "unparseable response; shrinking");
                    last_error = Some(e.to_string());
                    last_raw = Some(truncate(&raw, RAW_RESPONSE_CAP));
                    match self.shrink(&current) {
                        Some(smaller) => {
                            current = smaller;
                            continue;
                        }
                        None => break,
                    }
                }
            };

            match &response.status {
                ProcessingStatus::Completed => {
                    info!(chunk = current.id.as_str(), attempts, "chunk completed");
                    return self.finished(current, response, attempts);
                }
                ProcessingStatus::Unknown(raw_status) => {
                    // The sections that did arrive are still worth keeping.
                    warn!(
                        chunk = current.id.as_str(),
                        status = %raw_status,
                        "unrecognized status; accepting response as-is"
                    );
                    return self.finished(current, response, attempts);
                }
                ProcessingStatus::PartialAt(_) | ProcessingStatus::StoppedAt(_) => {
                    if response.sections_completed.is_empty() {
                        // Zero progress: a smaller chunk is the only lever left.
                        warn!(
                            chunk = current.id.as_str(),
                            "partial status with nothing completed; shrinking"
                        );
                        last_error = Some("partial response completed no sections".to_string());
                        match self.shrink(&current) {
                            Some(smaller) => {
                                current = smaller;
                                continue;
                            }
                            None => break,
                        }
                    }

                    let remaining = remaining_sections(&current, &response.sections_completed);
                    if remaining.len() == current.sections.len() {
                        // Completed labels matched none of our sections; the
                        // remainder would be the whole chunk again. Shrink
                        // instead of looping.
                        warn!(
                            chunk = current.id.as_str(),
                            "completed labels match no expected section; shrinking"
                        );
                        last_error =
                            Some("completed labels match no expected section".to_string());
                        match self.shrink(&current) {
                            Some(smaller) => {
                                current = smaller;
                                continue;
                            }
                            None => break,
                        }
                    }
                    if remaining.is_empty() {
                        // Everything expected was completed despite the
                        // partial flag; treat as done.
                        info!(chunk = current.id.as_str(), attempts, "all sections completed");
                        return self.finished(current, response, attempts);
                    }

                    info!(
                        chunk = current.id.as_str(),
                        completed = response.sections_completed.len(),
                        remaining = remaining.len(),
                        "partial completion; queueing remainder"
                    );
                    let remainder = self.remainder_chunk(&current, remaining);
                    let sections_attempted = current.section_labels();
                    return ChunkResult {
                        chunk_id: current.id,
                        success: true,
                        response: Some(response),
                        partial: true,
                        remaining_chunk: Some(remainder),
                        sections_attempted,
                        attempts,
                        error: None,
                        raw_response: None,
                    };
                }
            }
        }

        warn!(
            chunk = original_id.as_str(),
            attempts,
            error = last_error.as_deref().unwrap_or("none"),
            "chunk failed after all attempts"
        );
        let sections_attempted = current.section_labels();
        ChunkResult {
            chunk_id: original_id,
            success: false,
            response: None,
            partial: false,
            remaining_chunk: None,
            sections_attempted,
            attempts,
            error: last_error,
            raw_response: last_raw,
        }
    }

    fn finished(
        &self,
        chunk: ProcessingChunk,
        response: ChunkResponse,
        attempts: u32,
    ) -> ChunkResult {
        let sections_attempted = chunk.section_labels();
        ChunkResult {
            chunk_id: chunk.id,
            success: true,
            response: Some(response),
            partial: false,
            remaining_chunk: None,
            sections_attempted,
            attempts,
            error: None,
            raw_response: None,
        }
    }

    /// Build the follow-up chunk covering the sections still outstanding.
    fn remainder_chunk(
        &self,
        current: &ProcessingChunk,
        remaining: Vec<SectionSpan>,
    ) -> ProcessingChunk {
        let start = remaining
            .first()
            .map(|s| s.start)
            .unwrap_or(current.start)
            .max(current.start);
        let offset = floor_char_boundary(&current.content, start - current.start);
        let content = current.content[offset..].to_string();
        let input_tokens: usize = remaining.iter().map(|s| s.estimated_tokens).sum();
        ProcessingChunk {
            id: current.id.continued(),
            start,
            end: current.end,
            sections: remaining,
            content,
            estimated_input_tokens: input_tokens,
            estimated_output_tokens: self
                .estimator
                .estimate_output(input_tokens, self.config.output_fraction),
            oversized: current.oversized,
        }
    }

    /// Produce a smaller chunk, or `None` when no useful shrink remains.
    fn shrink(&self, chunk: &ProcessingChunk) -> Option<ProcessingChunk> {
        if chunk.sections.len() > 1 {
            let keep = (chunk.sections.len() / 2).max(1);
            let sections: Vec<SectionSpan> = chunk.sections[..keep].to_vec();
            let end = sections.last().map(|s| s.end).unwrap_or(chunk.end);
            let offset = floor_char_boundary(&chunk.content, end - chunk.start);
            let content = chunk.content[..offset].to_string();
            let input_tokens: usize = sections.iter().map(|s| s.estimated_tokens).sum();
            debug!(
                chunk = chunk.id.as_str(),
                kept = keep,
                dropped = chunk.sections.len() - keep,
                "shrinking by halving section list"
            );
            return Some(ProcessingChunk {
                id: chunk.id.reduced(),
                start: chunk.start,
                end,
                sections,
                content,
                estimated_input_tokens: input_tokens,
                estimated_output_tokens: self
                    .estimator
                    .estimate_output(input_tokens, self.config.output_fraction),
                oversized: chunk.oversized,
            });
        }

        if chunk.content.len() < MIN_SHRINK_BYTES {
            return None;
        }

        let split = paragraph_split_point(&chunk.content);
        let section = chunk.sections.first()?;
        let mut part = section.clone();
        part.title = format!("{} (Part 1)", section.title);
        part.end = chunk.start + split;
        part.estimated_tokens = self.estimator.estimate(&chunk.content[..split]);
        debug!(
            chunk = chunk.id.as_str(),
            split_at = split,
            of = chunk.content.len(),
            "shrinking by splitting single section"
        );
        let input_tokens = part.estimated_tokens;
        Some(ProcessingChunk {
            id: chunk.id.reduced(),
            start: chunk.start,
            end: chunk.start + split,
            sections: vec![part],
            content: chunk.content[..split].to_string(),
            estimated_input_tokens: input_tokens,
            estimated_output_tokens: self
                .estimator
                .estimate_output(input_tokens, self.config.output_fraction),
            oversized: chunk.oversized,
        })
    }
}

/// Sections of `chunk` not named in the completed list.
///
/// Models echo labels loosely ("Item 1", "item_1", "ITEM 1. Business"), so
/// matching goes through the item designator where one exists and falls back
/// to case-insensitive title equality for item-less sections.
fn remaining_sections(chunk: &ProcessingChunk, completed: &[String]) -> Vec<SectionSpan> {
    let designators = completed_designators(completed);
    let titles: HashSet<String> = completed.iter().map(|s| s.trim().to_uppercase()).collect();

    chunk
        .sections
        .iter()
        .filter(|section| {
            let done = match &section.item_number {
                Some(item) => designators.contains(&item.to_uppercase()),
                None => titles.contains(&section.title.trim().to_uppercase()),
            };
            !done
        })
        .cloned()
        .collect()
}

fn completed_designators(completed: &[String]) -> HashSet<String> {
    // Static pattern; compilation cannot fail.
    let re = match Regex::new(r"(?i)item[\s_]+(\d+(?:\.\d+)?[A-C]?)") {
        Ok(re) => re,
        Err(_) => return HashSet::new(),
    };
    completed
        .iter()
        .filter_map(|label| re.captures(label))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
        .collect()
}

/// Byte offset near the midpoint, preferring a paragraph break.
fn paragraph_split_point(content: &str) -> usize {
    let mid = content.len() / 2;
    let lo = floor_char_boundary(content, mid.saturating_sub(SPLIT_SEARCH_WINDOW));
    let hi = floor_char_boundary(content, (mid + SPLIT_SEARCH_WINDOW).min(content.len()));
    if let Some(found) = content[lo..hi].find("\n\n") {
        return lo + found + 2;
    }
    floor_char_boundary(content, mid)
}

fn truncate(raw: &str, cap: usize) -> String {
    let end = floor_char_boundary(raw, cap.min(raw.len()));
    raw[..end].to_string()
}
