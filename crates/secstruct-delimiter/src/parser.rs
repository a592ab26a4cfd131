//! Parsing pre-delimited filings into a parts → sections tree
//!
//! Input documents carry box-drawing delimiters inserted by an upstream
//! formatter: `╔═ § ═` opens a part, `╭─ • ─` opens a section. Content before
//! the first part delimiter (cover page, table of contents) is skipped.
//! Everything decorative is stripped line by line, and sections without
//! substantial remaining content are dropped.

use crate::error::DelimiterError;
use regex::Regex;
use secstruct_domain::FormType;
use tracing::{debug, info, warn};

/// Marker that opens a new part.
pub const PART_DELIMITER: &str = "╔═ § ═";

/// Marker that opens a new section within a part.
pub const SECTION_DELIMITER: &str = "╭─ • ─";

/// Minimum cleaned content length for an annual-report section.
const MIN_CONTENT_ANNUAL: usize = 100;

/// Quarterly sections can legitimately be very short ("None." under Item 3).
const MIN_CONTENT_QUARTERLY: usize = 50;

/// One cleaned section of a parsed filing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSection {
    /// Section title, canonicalized for recognized quarterly items
    pub title: String,

    /// Decoration-stripped content
    pub content: String,
}

/// One part with its surviving sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPart {
    /// Part title from the header lines, or a positional fallback
    pub name: String,

    /// Sections in document order
    pub sections: Vec<ParsedSection>,
}

/// The parts → sections tree produced by [`DelimiterParser::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFiling {
    /// Form the parser was configured for
    pub form: FormType,

    /// Parts in document order
    pub parts: Vec<ParsedPart>,
}

impl ParsedFiling {
    /// Total sections across all parts.
    pub fn section_count(&self) -> usize {
        self.parts.iter().map(|p| p.sections.len()).sum()
    }
}

/// Splits a pre-delimited filing into parts and sections.
pub struct DelimiterParser {
    form: FormType,
    min_content: usize,
    item_split: Regex,
    part_decoration: Regex,
    section_decoration: Regex,
    line_decoration_leading: Regex,
    line_decoration_trailing: Regex,
}

impl DelimiterParser {
    /// Create a parser for the given form.
    pub fn new(form: FormType) -> Self {
        let min_content = match form {
            FormType::TenQ => MIN_CONTENT_QUARTERLY,
            _ => MIN_CONTENT_ANNUAL,
        };
        // All patterns are static and known-good.
        Self {
            form,
            min_content,
            item_split: compile(r"\n\s*Item\s+\d+[A-Za-z]?\."),
            part_decoration: compile(r"[═║╗╚│─\s]+"),
            section_decoration: compile(r"[╮│╰─\s]+"),
            line_decoration_leading: compile(r"^[╔╗╚╝║│╭╮╰╯─═•\s]*"),
            line_decoration_trailing: compile(r"[╔╗╚╝║│╭╮╰╯─═•\s]*$"),
        }
    }

    /// Parse a delimited document into its parts → sections tree.
    pub fn parse(&self, content: &str) -> Result<ParsedFiling, DelimiterError> {
        let raw_parts: Vec<&str> = content.split(PART_DELIMITER).collect();
        if raw_parts.len() < 2 {
            return Err(DelimiterError::NoParts);
        }

        let mut parts: Vec<ParsedPart> = Vec::new();
        // Index 0 is everything before the first delimiter; skipped.
        for raw in raw_parts.iter().skip(1) {
            if raw.trim().is_empty() {
                continue;
            }
            let number = parts.len() + 1;
            let name = self.part_title(raw, number);
            debug!(part = %name, "parsing part");

            let sections = self.parse_sections(raw);
            if sections.is_empty() {
                warn!(part = %name, "part had no substantial sections");
            }
            parts.push(ParsedPart { name, sections });
        }

        let filing = ParsedFiling {
            form: self.form,
            parts,
        };
        if filing.section_count() == 0 {
            return Err(DelimiterError::NoSubstantialContent(self.min_content));
        }
        info!(
            parts = filing.parts.len(),
            sections = filing.section_count(),
            "delimited filing parsed"
        );
        Ok(filing)
    }

    /// Title from the part's first ten lines, canonicalized for the two
    /// standard quarterly parts.
    fn part_title(&self, raw: &str, number: usize) -> String {
        for line in raw.lines().take(10) {
            let clean = self
                .part_decoration
                .replace_all(line, " ")
                .trim()
                .to_string();
            if clean.len() <= 3 {
                continue;
            }
            let upper = clean.to_uppercase();
            if !upper.contains("PART") {
                continue;
            }
            if self.form == FormType::TenQ {
                if upper.contains("PART I") && upper.contains("FINANCIAL") {
                    return "PART_I_FINANCIAL_INFORMATION".to_string();
                }
                if upper.contains("PART II") && upper.contains("OTHER") {
                    return "PART_II_OTHER_INFORMATION".to_string();
                }
            }
            return clean;
        }
        format!("Part_{}", number)
    }

    fn parse_sections(&self, part: &str) -> Vec<ParsedSection> {
        let raw_sections: Vec<String> = if part.contains(SECTION_DELIMITER) {
            part.split(SECTION_DELIMITER).map(str::to_string).collect()
        } else {
            // No secondary delimiters; fall back to splitting on item headers.
            self.item_split.split(part).map(str::to_string).collect()
        };

        let mut sections: Vec<ParsedSection> = Vec::new();
        for raw in &raw_sections {
            if raw.trim().is_empty() {
                continue;
            }
            let cleaned = self.clean_content(raw);
            if cleaned.trim().len() <= self.min_content {
                continue;
            }
            let title = self.section_title(raw, sections.len() + 1);
            sections.push(ParsedSection {
                title,
                content: cleaned,
            });
        }
        sections
    }

    /// Title from the section's first eight lines, mapped onto the canonical
    /// quarterly item names where the line is recognizable.
    fn section_title(&self, raw: &str, number: usize) -> String {
        for line in raw.lines().take(8) {
            let clean = self
                .section_decoration
                .replace_all(line, " ")
                .trim()
                .to_string();
            if clean.len() <= 3 {
                continue;
            }
            if self.form == FormType::TenQ {
                if let Some(canonical) = quarterly_canonical_title(&clean) {
                    return canonical.to_string();
                }
            }
            return clean;
        }
        format!("Section_{}", number)
    }

    /// Strip box-drawing decoration from every line; drop lines with nothing
    /// left.
    fn clean_content(&self, raw: &str) -> String {
        let mut lines: Vec<String> = Vec::new();
        for line in raw.lines() {
            let stripped = self.line_decoration_leading.replace(line, "");
            let stripped = self.line_decoration_trailing.replace(&stripped, "");
            let trimmed = stripped.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
        lines.join("\n")
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid delimiter pattern: {}", e))
}

/// Canonical names for the standard 10-Q items, keyed by header keywords.
fn quarterly_canonical_title(line: &str) -> Option<&'static str> {
    if line.contains("Financial Statements") {
        Some("Item_1_Financial_Statements")
    } else if line.contains("Management") && line.contains("Discussion") {
        Some("Item_2_Management_Discussion_Analysis")
    } else if line.contains("Quantitative") && line.contains("Qualitative") {
        Some("Item_3_Market_Risk_Disclosures")
    } else if line.contains("Controls") && line.contains("Procedures") {
        Some("Item_4_Controls_Procedures")
    } else if line.contains("Legal Proceedings") && line.contains("Item 1.") {
        Some("Item_1_Legal_Proceedings")
    } else if line.contains("Risk Factors") && line.contains("Item 1A") {
        Some("Item_1A_Risk_Factors")
    } else if line.contains("Unregistered Sales") && line.contains("Item 2") {
        Some("Item_2_Unregistered_Sales")
    } else if line.contains("Defaults Upon Senior Securities") {
        Some("Item_3_Defaults_Senior_Securities")
    } else if line.contains("Mine Safety") {
        Some("Item_4_Mine_Safety_Disclosures")
    } else if line.contains("Other Information") && line.contains("Item 5") {
        Some("Item_5_Other_Information")
    } else if line.contains("Exhibits") && line.contains("Item 6") {
        Some("Item_6_Exhibits")
    } else {
        None
    }
}

/// Reduce a title to a stable identifier: invalid characters removed,
/// whitespace collapsed to underscores, length capped.
pub fn sanitize_identifier(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_underscore = false;
    for c in title.chars() {
        if c.is_alphanumeric() || c == '-' || c == '.' {
            out.push(c);
            last_underscore = false;
        } else if (c.is_whitespace() || c == '_') && !last_underscore && !out.is_empty() {
            out.push('_');
            last_underscore = true;
        }
    }
    let trimmed = out.trim_matches(['_', '.']).to_string();
    let capped: String = trimmed.chars().take(100).collect();
    if capped.is_empty() {
        "unnamed".to_string()
    } else {
        capped
    }
}
