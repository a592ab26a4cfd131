//! Split command - parse a pre-delimited filing without any model calls.

use super::{read_document, write_json};
use crate::cli::SplitArgs;
use anyhow::Result;
use secstruct_delimiter::{DelimiterParser, StructureTransformer};
use tracing::info;

/// Execute the split command.
pub fn execute_split(args: SplitArgs) -> Result<()> {
    let document = read_document(&args.input)?;

    let parsed = DelimiterParser::new(args.form).parse(&document)?;
    info!(
        parts = parsed.parts.len(),
        sections = parsed.section_count(),
        "delimited filing parsed"
    );

    let transformed =
        StructureTransformer::new(args.form).transform(&parsed, &args.company, &args.period);
    write_json(
        args.output.as_deref(),
        &serde_json::to_string_pretty(&transformed)?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use secstruct_domain::FormType;
    use std::io::Write;

    #[test]
    fn test_split_round_trip_through_files() {
        let body =
            "Substantial section content describing company operations in detail. ".repeat(4);
        let delimited = format!(
            "preamble\n╔═ § ═ PART I\n╭─ • ─ Item 1. Business ╮\n│ {} │\n",
            body
        );
        let mut input = tempfile::NamedTempFile::new().unwrap();
        input.write_all(delimited.as_bytes()).unwrap();
        let output = tempfile::NamedTempFile::new().unwrap();

        let args = SplitArgs {
            input: input.path().to_path_buf(),
            output: Some(output.path().to_path_buf()),
            form: FormType::TenK,
            company: "Acme".to_string(),
            period: "2023".to_string(),
        };
        execute_split(args).unwrap();

        let written = std::fs::read_to_string(output.path()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(doc["company_name"], "Acme");
        assert_eq!(doc["summary"]["total_sections"], 1);
    }
}
