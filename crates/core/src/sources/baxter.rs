//! Baxter–Sagart Middle Chinese reconstruction table.

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::matching::keywords::keywords;
use crate::pinyin::Romanization;

#[derive(Debug, Deserialize)]
struct BaxterRow {
    #[serde(default)]
    zi: String,
    #[serde(default)]
    py: String,
    #[serde(rename = "MC", default)]
    mc: String,
    #[serde(default)]
    gloss: String,
}

/// One attested reading/sense combination.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructionEntry {
    pub middle_chinese: String,
    pub gloss: String,
    pub keywords: BTreeSet<String>,
}

/// Reconstructions keyed by `(character, canonical pinyin)`.
#[derive(Debug, Default)]
pub struct ReconstructionTable {
    entries: HashMap<(String, String), Vec<ReconstructionEntry>>,
}

impl ReconstructionTable {
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open reconstruction table: {}", path.display()))?;
        let table = Self::from_reader(file)
            .with_context(|| format!("Failed to parse reconstruction table: {}", path.display()))?;
        log::info!("Loaded Baxter-Sagart table: {} readings", table.entries.len());
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut table = ReconstructionTable::default();
        for record in rdr.deserialize::<BaxterRow>() {
            let row = match record {
                Ok(r) => r,
                Err(e) => {
                    log::debug!("Skipping malformed reconstruction row: {}", e);
                    continue;
                }
            };
            let character = row.zi.trim();
            if character.is_empty() {
                continue;
            }
            let gloss = row.gloss.trim().to_string();
            let key = (
                character.to_string(),
                Romanization::parse(row.py.trim()).key(),
            );
            table.entries.entry(key).or_default().push(ReconstructionEntry {
                middle_chinese: row.mc.trim().to_string(),
                keywords: keywords(&gloss),
                gloss,
            });
        }
        Ok(table)
    }

    /// Entries for a character under an exact reading.
    pub fn lookup(&self, character: &str, reading: &Romanization) -> &[ReconstructionEntry] {
        self.entries
            .get(&(character.to_string(), reading.key()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
