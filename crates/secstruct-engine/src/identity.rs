//! Filing identity extraction - company name and fiscal year from the cover page
//!
//! Cover pages are noisy: boilerplate about the SEC, the form caption, and
//! the commission address all look like candidate names. Candidates that
//! contain known boilerplate keywords are rejected; when nothing survives,
//! placeholder values keep the pipeline moving and the output addressable.

use regex::RegexBuilder;
use tracing::{debug, warn};

/// Placeholder when no company name could be extracted.
pub const UNKNOWN_COMPANY: &str = "COMPANY_NAME";

/// Placeholder when no fiscal year could be extracted.
pub const UNKNOWN_YEAR: &str = "YEAR";

/// How far into the document to look for the company name.
const COMPANY_WINDOW: usize = 5000;

/// How far into the document to look for the fiscal year.
const YEAR_WINDOW: usize = 3000;

const REJECT_KEYWORDS: &[&str] = &[
    "SECURITIES",
    "EXCHANGE",
    "COMMISSION",
    "WASHINGTON",
    "FORM",
    "PURSUANT",
    "UNITED STATES",
    "ANNUAL REPORT",
    "QUARTERLY REPORT",
];

/// Company and fiscal year identifying one filing in the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingIdentity {
    /// Normalized company identifier (uppercase, underscores for spaces)
    pub company: String,

    /// Four-digit fiscal year, or the placeholder
    pub year: String,
}

/// Extract company and year from the head of the document.
pub fn extract_identity(document: &str) -> FilingIdentity {
    let identity = FilingIdentity {
        company: extract_company(document).unwrap_or_else(|| {
            warn!("no company name found on cover page; using placeholder");
            UNKNOWN_COMPANY.to_string()
        }),
        year: extract_year(document).unwrap_or_else(|| {
            warn!("no fiscal year found on cover page; using placeholder");
            UNKNOWN_YEAR.to_string()
        }),
    };
    debug!(company = %identity.company, year = %identity.year, "filing identity");
    identity
}

fn extract_company(document: &str) -> Option<String> {
    let head = head_window(document, COMPANY_WINDOW);

    let patterns = [
        // "Exact name of registrant" caption, name on the preceding line
        r"(?m)^\s*([A-Z][A-Za-z0-9 .,&'\-]+?)\s*\n\s*\(Exact name of [Rr]egistrant",
        // All-caps standalone line, the usual cover-page rendering
        r"(?m)^\s*([A-Z][A-Z0-9 .,&'\-]{2,60}?(?:,?\s*INC\.?|,?\s*CORP(?:ORATION)?\.?|,?\s*LLC|,?\s*COMPANY|,?\s*LTD\.?))\s*$",
        // Mixed-case company line ending in a corporate suffix
        r"(?m)^\s*([A-Z][A-Za-z0-9 .,&'\-]{4,60}?(?:Inc\.?|Corporation|Corp\.?|Company|LLC|Ltd\.?))\s*$",
    ];

    for pattern in patterns {
        let re = match RegexBuilder::new(pattern).build() {
            Ok(re) => re,
            Err(_) => continue,
        };
        for caps in re.captures_iter(head) {
            if let Some(candidate) = caps.get(1) {
                let candidate = candidate.as_str().trim();
                if is_plausible_company(candidate) {
                    return Some(normalize_company(candidate));
                }
            }
        }
    }
    None
}

fn is_plausible_company(candidate: &str) -> bool {
    let upper = candidate.to_uppercase();
    if upper.len() < 3 {
        return false;
    }
    !REJECT_KEYWORDS.iter().any(|kw| upper.contains(kw))
}

/// Uppercase, spaces to underscores, punctuation stripped. The result is a
/// stable key suitable for file paths and the output tree.
fn normalize_company(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        match c {
            ',' | '.' | '\'' => {}
            c if c.is_whitespace() => {
                if !out.ends_with('_') {
                    out.push('_');
                }
            }
            c => out.extend(c.to_uppercase()),
        }
    }
    out.trim_matches('_').to_string()
}

fn extract_year(document: &str) -> Option<String> {
    let head = head_window(document, YEAR_WINDOW);

    // Prefer an explicit fiscal-period caption over any stray year.
    let captioned = RegexBuilder::new(
        r"(?i)fiscal\s+year\s+ended[^\n]*?\b(19|20)(\d{2})\b|for\s+the\s+(?:fiscal\s+)?(?:year|quarter(?:ly period)?)\s+end(?:ed|ing)[^\n]*?\b(19|20)(\d{2})\b",
    )
    .build()
    .ok()?;
    if let Some(caps) = captioned.captures(head) {
        let century = caps.get(1).or_else(|| caps.get(3));
        let tail = caps.get(2).or_else(|| caps.get(4));
        if let (Some(century), Some(tail)) = (century, tail) {
            return Some(format!("{}{}", century.as_str(), tail.as_str()));
        }
    }

    let bare = RegexBuilder::new(r"\b(20\d{2})\b").build().ok()?;
    bare.captures(head)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn head_window(document: &str, limit: usize) -> &str {
    if document.len() <= limit {
        return document;
    }
    let mut end = limit;
    while end > 0 && !document.is_char_boundary(end) {
        end -= 1;
    }
    &document[..end]
}
