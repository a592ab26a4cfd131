//! Normalizing parsed or legacy filing documents into one canonical shape
//!
//! Two serialized shapes exist in the wild for the `sections` field: a list
//! of section objects and a mapping from section id to object. Both are
//! modeled explicitly as [`SectionsShape`] and normalized once into a list
//! with stable `section_id`s, instead of being probed field by field at every
//! consumer. Output contains no wall-clock timestamp, so transforming the
//! same input twice yields byte-identical JSON.

use crate::parser::{sanitize_identifier, ParsedFiling};
use regex::Regex;
use secstruct_domain::FormType;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

/// The two legacy serialized shapes of a `sections` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SectionsShape {
    /// Already a list of section objects
    List(Vec<Value>),

    /// Mapping from section id to section object
    Mapping(Map<String, Value>),
}

/// Part classification derived from the part name.
fn part_type(name: &str) -> &'static str {
    let upper = name.to_uppercase();
    if upper.contains("FINANCIAL") {
        "financial_information"
    } else if upper.contains("OTHER") {
        "other_information"
    } else {
        "unknown"
    }
}

/// Transforms parsed filings and legacy documents into the canonical shape.
pub struct StructureTransformer {
    form: FormType,
    dollar_figure: Regex,
}

impl StructureTransformer {
    /// Create a transformer for the given form.
    pub fn new(form: FormType) -> Self {
        // Static pattern; compilation cannot fail.
        let dollar_figure = Regex::new(r"\$\s*\d+(?:,\d{3})*(?:\.\d{2})?")
            .unwrap_or_else(|e| panic!("invalid dollar pattern: {}", e));
        Self {
            form,
            dollar_figure,
        }
    }

    /// Serialize a [`ParsedFiling`] straight into the canonical document.
    pub fn transform(&self, filing: &ParsedFiling, company: &str, period: &str) -> Value {
        let mut parts: Vec<Value> = Vec::new();
        for (i, part) in filing.parts.iter().enumerate() {
            let mut sections: Vec<Value> = Vec::new();
            for (j, section) in part.sections.iter().enumerate() {
                let id = format!("section_{:02}_{}", j + 1, sanitize_identifier(&section.title));
                let mut obj = Map::new();
                obj.insert("section_id".to_string(), json!(id));
                obj.insert("title".to_string(), json!(section.title));
                obj.insert("content".to_string(), json!(section.content));
                obj.insert(
                    "content_length".to_string(),
                    json!(section.content.len()),
                );
                obj.insert(
                    "line_count".to_string(),
                    json!(section.content.lines().count()),
                );
                self.enrich(&mut obj);
                sections.push(Value::Object(obj));
            }

            parts.push(json!({
                "part_name": format!("Part_{}_{}", i + 1, sanitize_identifier(&part.name)),
                "part_type": part_type(&part.name),
                "section_count": sections.len(),
                "sections": sections,
            }));
        }

        let mut doc = Map::new();
        doc.insert("company_name".to_string(), json!(company));
        doc.insert("filing_type".to_string(), json!(self.form.as_str()));
        doc.insert("filing_period".to_string(), json!(period));
        doc.insert("parts".to_string(), Value::Array(parts));
        let mut value = Value::Object(doc);
        self.attach_summary(&mut value);
        info!(company, period, form = %self.form, "parsed filing transformed");
        value
    }

    /// Normalize a legacy document: `parts` and nested `sections` in either
    /// shape become canonical lists, enriched and summarized.
    pub fn transform_document(&self, doc: &Value) -> Value {
        let mut top: Map<String, Value> = doc
            .as_object()
            .cloned()
            .unwrap_or_default();
        let parts_value = top.remove("parts").unwrap_or(Value::Null);
        top.insert(
            "parts".to_string(),
            Value::Array(self.normalize_parts(parts_value)),
        );
        let mut value = Value::Object(top);
        self.attach_summary(&mut value);
        value
    }

    fn normalize_parts(&self, parts: Value) -> Vec<Value> {
        let mut out: Vec<Value> = Vec::new();
        match parts {
            Value::Array(list) => {
                for part in list {
                    let Value::Object(mut obj) = part else { continue };
                    let sections = self.normalize_sections(obj.remove("sections"));
                    if !obj.contains_key("part_name") {
                        obj.insert("part_name".to_string(), json!("Part"));
                    }
                    self.finish_part(&mut obj, sections);
                    out.push(Value::Object(obj));
                }
            }
            Value::Object(map) => {
                for (key, value) in map {
                    match value {
                        Value::Object(mut obj) => {
                            let sections = self.normalize_sections(obj.remove("sections"));
                            if !obj.contains_key("part_name") {
                                obj.insert("part_name".to_string(), json!(key));
                            }
                            self.finish_part(&mut obj, sections);
                            out.push(Value::Object(obj));
                        }
                        other => {
                            out.push(json!({
                                "part_name": key,
                                "value": other,
                                "sections": [],
                                "section_count": 0,
                                "part_type": "unknown",
                            }));
                        }
                    }
                }
            }
            _ => {}
        }
        out
    }

    fn finish_part(&self, obj: &mut Map<String, Value>, sections: Vec<Value>) {
        let name = obj
            .get("part_name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        obj.insert("section_count".to_string(), json!(sections.len()));
        obj.insert("part_type".to_string(), json!(part_type(&name)));
        obj.insert("sections".to_string(), Value::Array(sections));
    }

    /// Normalize a `sections` field of either shape into a canonical list.
    fn normalize_sections(&self, sections: Option<Value>) -> Vec<Value> {
        let shape = match sections {
            Some(value) => match serde_json::from_value::<SectionsShape>(value) {
                Ok(shape) => shape,
                Err(_) => return Vec::new(),
            },
            None => return Vec::new(),
        };

        match shape {
            SectionsShape::List(list) => list
                .into_iter()
                .enumerate()
                .filter_map(|(idx, section)| {
                    let Value::Object(mut obj) = section else {
                        return None;
                    };
                    if !obj.contains_key("section_id") {
                        obj.insert("section_id".to_string(), json!(format!("section_{}", idx)));
                    }
                    self.enrich(&mut obj);
                    Some(Value::Object(obj))
                })
                .collect(),
            SectionsShape::Mapping(map) => map
                .into_iter()
                .map(|(key, value)| match value {
                    Value::Object(mut obj) => {
                        obj.insert("section_id".to_string(), json!(key));
                        self.enrich(&mut obj);
                        Value::Object(obj)
                    }
                    other => json!({ "section_id": key, "value": other }),
                })
                .collect(),
        }
    }

    /// Attach derived statistics to a section object that carries content.
    fn enrich(&self, obj: &mut Map<String, Value>) {
        let Some(content) = obj.get("content").and_then(Value::as_str) else {
            return;
        };
        let word_count = content.split_whitespace().count();
        let has_financial = self.dollar_figure.is_match(content);
        let has_tables = content.contains('|') || content.contains('\t');
        debug!(word_count, has_financial, has_tables, "section enriched");
        obj.insert("word_count".to_string(), json!(word_count));
        obj.insert("has_financial_data".to_string(), json!(has_financial));
        obj.insert("has_tables".to_string(), json!(has_tables));
    }

    /// Compute and attach the document summary from the normalized parts.
    fn attach_summary(&self, doc: &mut Value) {
        let Some(top) = doc.as_object_mut() else { return };
        let parts = top
            .get("parts")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let total_sections: u64 = parts
            .iter()
            .filter_map(|p| p.get("section_count").and_then(Value::as_u64))
            .sum();
        let count_for = |kind: &str| -> u64 {
            parts
                .iter()
                .filter(|p| p.get("part_type").and_then(Value::as_str) == Some(kind))
                .filter_map(|p| p.get("section_count").and_then(Value::as_u64))
                .sum()
        };

        top.insert(
            "summary".to_string(),
            json!({
                "total_parts": parts.len(),
                "total_sections": total_sections,
                "financial_information_sections": count_for("financial_information"),
                "other_information_sections": count_for("other_information"),
                "sec_form_type": self.form.as_str(),
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParsedPart, ParsedSection};

    fn parsed() -> ParsedFiling {
        ParsedFiling {
            form: FormType::TenQ,
            parts: vec![
                ParsedPart {
                    name: "PART_I_FINANCIAL_INFORMATION".to_string(),
                    sections: vec![ParsedSection {
                        title: "Item_1_Financial_Statements".to_string(),
                        content: "Revenue was $ 1,234,567.89 for the quarter | Q2 | Q1".to_string(),
                    }],
                },
                ParsedPart {
                    name: "PART_II_OTHER_INFORMATION".to_string(),
                    sections: vec![ParsedSection {
                        title: "Item_1_Legal_Proceedings".to_string(),
                        content: "None to report.".to_string(),
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_transform_parsed_filing() {
        let doc = StructureTransformer::new(FormType::TenQ).transform(&parsed(), "Acme Inc", "Q2 2023");
        assert_eq!(doc["filing_type"], "10-Q");
        assert_eq!(doc["company_name"], "Acme Inc");
        let parts = doc["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["part_type"], "financial_information");
        assert_eq!(parts[1]["part_type"], "other_information");

        let section = &parts[0]["sections"][0];
        assert_eq!(
            section["section_id"],
            "section_01_Item_1_Financial_Statements"
        );
        assert_eq!(section["has_financial_data"], true);
        assert_eq!(section["has_tables"], true);
        assert_eq!(section["word_count"], 11);

        let other = &parts[1]["sections"][0];
        assert_eq!(other["has_financial_data"], false);
        assert_eq!(other["has_tables"], false);
    }

    #[test]
    fn test_summary_counts() {
        let doc = StructureTransformer::new(FormType::TenQ).transform(&parsed(), "Acme", "Q2 2023");
        assert_eq!(doc["summary"]["total_parts"], 2);
        assert_eq!(doc["summary"]["total_sections"], 2);
        assert_eq!(doc["summary"]["financial_information_sections"], 1);
        assert_eq!(doc["summary"]["other_information_sections"], 1);
        assert_eq!(doc["summary"]["sec_form_type"], "10-Q");
    }

    #[test]
    fn test_mapping_shape_normalized_to_list() {
        let legacy = serde_json::json!({
            "company_name": "Acme",
            "parts": {
                "Part_1_PART_I_FINANCIAL_INFORMATION": {
                    "sections": {
                        "Section_01_Item_1": { "content": "Cash of $ 500.00 on hand" },
                        "Section_02_Item_2": { "content": "Plain discussion text" }
                    }
                }
            }
        });
        let doc = StructureTransformer::new(FormType::TenQ).transform_document(&legacy);
        let part = &doc["parts"][0];
        assert_eq!(part["part_name"], "Part_1_PART_I_FINANCIAL_INFORMATION");
        assert_eq!(part["part_type"], "financial_information");
        assert_eq!(part["section_count"], 2);
        let sections = part["sections"].as_array().unwrap();
        assert_eq!(sections[0]["section_id"], "Section_01_Item_1");
        assert_eq!(sections[0]["has_financial_data"], true);
        assert_eq!(sections[1]["has_financial_data"], false);
    }

    #[test]
    fn test_list_shape_gets_positional_ids() {
        let legacy = serde_json::json!({
            "parts": [
                {
                    "part_name": "Part_1",
                    "sections": [
                        { "content": "first" },
                        { "section_id": "explicit", "content": "second" }
                    ]
                }
            ]
        });
        let doc = StructureTransformer::new(FormType::TenK).transform_document(&legacy);
        let sections = doc["parts"][0]["sections"].as_array().unwrap();
        assert_eq!(sections[0]["section_id"], "section_0");
        assert_eq!(sections[1]["section_id"], "explicit");
    }

    #[test]
    fn test_scalar_part_value_wrapped() {
        let legacy = serde_json::json!({
            "parts": { "note": "not a part object" }
        });
        let doc = StructureTransformer::new(FormType::TenK).transform_document(&legacy);
        let part = &doc["parts"][0];
        assert_eq!(part["part_name"], "note");
        assert_eq!(part["value"], "not a part object");
        assert_eq!(part["section_count"], 0);
        assert_eq!(part["part_type"], "unknown");
    }

    #[test]
    fn test_transform_is_deterministic() {
        let transformer = StructureTransformer::new(FormType::TenQ);
        let first = transformer.transform(&parsed(), "Acme", "Q2 2023").to_string();
        let second = transformer.transform(&parsed(), "Acme", "Q2 2023").to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_parts_yields_empty_list() {
        let doc = StructureTransformer::new(FormType::TenK)
            .transform_document(&serde_json::json!({ "company_name": "Acme" }));
        assert!(doc["parts"].as_array().unwrap().is_empty());
        assert_eq!(doc["summary"]["total_sections"], 0);
    }
}
