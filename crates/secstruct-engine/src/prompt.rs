//! Prompt construction for chunk extraction requests
//!
//! The prompt carries three things the model must respect: which sections
//! this chunk is expected to cover, what was already extracted by earlier
//! chunks, and the response contract (JSON shape plus the
//! `processing_status` vocabulary used to signal incomplete output).

use secstruct_domain::{FormType, ProcessingChunk};
use std::fmt::Write;

/// Builder for a single chunk-extraction prompt.
pub struct ChunkPrompt<'a> {
    /// Chunk under extraction
    pub chunk: &'a ProcessingChunk,

    /// Normalized company identifier
    pub company: &'a str,

    /// Fiscal year string
    pub year: &'a str,

    /// Filing form, which fixes the category vocabulary
    pub form: FormType,

    /// First chunk of the document carries the cover page
    pub is_first_chunk: bool,

    /// Labels of sections completed by earlier chunks
    pub previous_sections: &'a [String],
}

impl ChunkPrompt<'_> {
    /// Render the full prompt text.
    pub fn build(&self) -> String {
        let mut out = String::with_capacity(self.chunk.content.len() + 4096);
        let form = self.form.as_str();

        let _ = writeln!(
            out,
            "Extract structured data from this portion of a {} SEC filing for {} ({}).",
            form, self.company, self.year
        );
        out.push('\n');
        let _ = writeln!(out, "## CHUNK INFO:");
        let _ = writeln!(out, "- Chunk ID: {}", self.chunk.id.as_str());
        let _ = writeln!(
            out,
            "- Estimated input tokens: {}",
            self.chunk.estimated_input_tokens
        );
        let _ = writeln!(out, "- Sections expected in this chunk:");
        for section in &self.chunk.sections {
            let _ = writeln!(out, "  - {}", section.label());
        }

        if self.chunk.oversized {
            out.push('\n');
            let _ = writeln!(
                out,
                "WARNING: this chunk contains a single very large section. \
                 Summarize aggressively and report partial status rather than \
                 truncating mid-sentence."
            );
        }

        if self.is_first_chunk {
            out.push('\n');
            let _ = writeln!(
                out,
                "This is the FIRST chunk and includes the cover page and table \
                 of contents. Skip the table of contents itself; extract only \
                 the actual section content."
            );
        }

        if !self.previous_sections.is_empty() {
            out.push('\n');
            let _ = writeln!(out, "## ALREADY COMPLETED (do not re-extract):");
            for label in self.previous_sections {
                let _ = writeln!(out, "- {}", label);
            }
        }

        out.push('\n');
        let _ = writeln!(out, "## TOKEN MANAGEMENT:");
        let _ = writeln!(
            out,
            "If you cannot finish every expected section within your output \
             limit, stop cleanly at a section boundary and report it:"
        );
        let _ = writeln!(out, "- \"completed\": all expected sections extracted");
        let _ = writeln!(
            out,
            "- \"partial_item_X\": item X was only partially extracted"
        );
        let _ = writeln!(
            out,
            "- \"stopped_at_item_X\": you stopped before starting item X"
        );
        let _ = writeln!(
            out,
            "Never truncate JSON. An incomplete but valid response is always \
             preferred over a complete but malformed one."
        );

        out.push('\n');
        let _ = writeln!(out, "## REQUIRED JSON FORMAT:");
        let _ = writeln!(out, "{{");
        let _ = writeln!(out, "  \"processing_status\": \"completed\",");
        let _ = writeln!(out, "  \"sections\": {{");
        let _ = writeln!(
            out,
            "    \"Item 1\": {{ \"title\": \"...\", \"content\": \"...\" }}"
        );
        let _ = writeln!(out, "  }},");
        let _ = writeln!(out, "  \"chunk_metadata\": {{");
        let _ = writeln!(out, "    \"sections_attempted\": [\"Item 1\"],");
        let _ = writeln!(out, "    \"sections_completed\": [\"Item 1\"],");
        let _ = writeln!(out, "    \"next_expected_item\": null");
        let _ = writeln!(out, "  }}");
        let _ = writeln!(out, "}}");

        out.push('\n');
        let _ = writeln!(out, "## {} CATEGORIES (for reference):", form);
        for category in self.form.categories() {
            let _ = writeln!(out, "- {}", category);
        }

        out.push('\n');
        let _ = writeln!(out, "## CHUNK CONTENT TO PROCESS:");
        out.push_str(&self.chunk.content);
        out
    }
}
