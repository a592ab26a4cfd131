//! Filing form types and their category tables
//!
//! Each supported SEC form mandates a fixed set of higher-level groupings
//! (Parts for 10-K/10-Q, Sections for 8-K). The combiner routes every
//! extracted item into one of these categories by its item designator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported SEC filing types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormType {
    /// Annual report
    TenK,
    /// Quarterly report
    TenQ,
    /// Current report (material events)
    EightK,
    /// Statement of changes in beneficial ownership
    Form4,
}

const TEN_K_CATEGORIES: &[&str] = &[
    "Part I: Business and Risk Factors",
    "Part II: Financial Information",
    "Part III: Governance",
    "Part IV: Exhibits and Schedules",
];

const TEN_Q_CATEGORIES: &[&str] = &[
    "Part I: Financial Information",
    "Part II: Other Information",
];

const EIGHT_K_CATEGORIES: &[&str] = &[
    "Section 1 - Registrant's Business and Operations",
    "Section 2 - Financial Information",
    "Section 3 - Securities and Trading Markets",
    "Section 4 - Matters Related to Accountants and Financial Statements",
    "Section 5 - Corporate Governance and Management",
    "Section 6 - Asset-Backed Securities",
    "Section 7 - Regulation FD",
    "Section 8 - Other Events",
    "Section 9 - Financial Statements and Exhibits",
];

const FORM_4_CATEGORIES: &[&str] = &["Insider Transactions"];

impl FormType {
    /// The form designator as filed ("10-K", "10-Q", "8-K", "4").
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::TenK => "10-K",
            FormType::TenQ => "10-Q",
            FormType::EightK => "8-K",
            FormType::Form4 => "4",
        }
    }

    /// Parse a form designator.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "10-K" | "10K" => Some(FormType::TenK),
            "10-Q" | "10Q" => Some(FormType::TenQ),
            "8-K" | "8K" => Some(FormType::EightK),
            "4" | "FORM4" | "FORM 4" => Some(FormType::Form4),
            _ => None,
        }
    }

    /// The ordered category skeleton for this form.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            FormType::TenK => TEN_K_CATEGORIES,
            FormType::TenQ => TEN_Q_CATEGORIES,
            FormType::EightK => EIGHT_K_CATEGORIES,
            FormType::Form4 => FORM_4_CATEGORIES,
        }
    }

    /// The category that should get content with no recognizable item number.
    pub fn default_category(&self) -> &'static str {
        self.categories()[0]
    }

    /// Look up the owning category for an item designator ("1A", "7", "5.02").
    ///
    /// Unknown designators fall back to the default category, matching the
    /// original item-to-part lookup tables.
    pub fn category_for_item(&self, item: &str) -> &'static str {
        let leading: String = item
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let Ok(n) = leading.parse::<u32>() else {
            return self.default_category();
        };

        match self {
            FormType::TenK => match n {
                1..=4 => TEN_K_CATEGORIES[0],
                5..=9 => TEN_K_CATEGORIES[1],
                10..=14 => TEN_K_CATEGORIES[2],
                15..=16 => TEN_K_CATEGORIES[3],
                _ => self.default_category(),
            },
            FormType::TenQ => match n {
                // Part I holds Items 1-4 (financial statements through
                // controls); anything else is Part II other information.
                1..=4 => TEN_Q_CATEGORIES[0],
                _ => TEN_Q_CATEGORIES[1],
            },
            // 8-K items are numbered N.MM where N is the section.
            FormType::EightK => match n {
                1..=9 => EIGHT_K_CATEGORIES[(n - 1) as usize],
                _ => self.default_category(),
            },
            FormType::Form4 => FORM_4_CATEGORIES[0],
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FormType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unsupported form type: {}", s))
    }
}
