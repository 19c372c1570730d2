//! Corpus records and the documents derived from them.
//!
//! The source table is a CSV with `drug_name,side_effect,description`
//! columns. Row order is significant: it assigns the positional ids the
//! vector index joins back on.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// One row of the source table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugRecord {
    pub drug_name: String,
    pub side_effect: String,
    pub description: String,
}

/// A loaded corpus entry. `id` is the position in the corpus and `text` is
/// the retrieval unit fed to the embedder.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: usize,
    pub drug_name: String,
    pub side_effect: String,
    pub description: String,
    pub text: String,
}

/// Turns records into documents, assigning positional ids.
pub fn documents(records: Vec<DrugRecord>) -> Vec<Document> {
    records
        .into_iter()
        .enumerate()
        .map(|(id, record)| {
            let text = format!("{}: {}", record.drug_name, record.description);
            Document {
                id,
                drug_name: record.drug_name,
                side_effect: record.side_effect,
                description: record.description,
                text,
            }
        })
        .collect()
}

/// Reads a headered CSV file into records.
pub fn read_csv(path: &Path) -> Result<Vec<DrugRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("unable to read corpus file {}", path.display()))?;
    parse_csv(&raw)
}

/// Parses CSV text with a header line. Plain and double-quoted fields only.
pub fn parse_csv(raw: &str) -> Result<Vec<DrugRecord>> {
    let mut records = Vec::new();
    for (line_no, line) in raw.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields(line);
        if fields.len() != 3 {
            bail!(
                "corpus line {} has {} fields, expected 3",
                line_no + 1,
                fields.len()
            );
        }
        let mut fields = fields.into_iter();
        records.push(DrugRecord {
            drug_name: fields.next().unwrap_or_default(),
            side_effect: fields.next().unwrap_or_default(),
            description: fields.next().unwrap_or_default(),
        });
    }
    Ok(records)
}

fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                // doubled quote inside a quoted field is an escaped quote
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[test]
fn test_parse_csv() {
    let raw = "drug_name,side_effect,description\n\
               Paracetamol,Nausea,Mild stomach upset\n\
               Ibuprofen,Heartburn,\"Burning, acidic feeling\"\n";
    let records = parse_csv(raw).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].drug_name, "Paracetamol");
    assert_eq!(records[0].side_effect, "Nausea");
    assert_eq!(records[1].description, "Burning, acidic feeling");
}

#[test]
fn test_parse_csv_rejects_short_row() {
    let raw = "drug_name,side_effect,description\nParacetamol,Nausea\n";
    assert!(parse_csv(raw).is_err());
}

#[test]
fn test_documents_positional_ids() {
    let records = vec![
        DrugRecord {
            drug_name: "Paracetamol".to_string(),
            side_effect: "Nausea".to_string(),
            description: "Mild stomach upset".to_string(),
        },
        DrugRecord {
            drug_name: "Aspirin".to_string(),
            side_effect: "Bruising".to_string(),
            description: "Easy bruising of the skin".to_string(),
        },
    ];
    let docs = documents(records);
    assert_eq!(docs[0].id, 0);
    assert_eq!(docs[1].id, 1);
    assert_eq!(docs[0].text, "Paracetamol: Mild stomach upset");
}
