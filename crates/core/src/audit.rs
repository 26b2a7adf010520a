//! Cross-check of dictionary pinyin against CC-CEDICT readings.
//!
//! A character is reported when none of its rows carries a reading that
//! CEDICT attests for it. The report lines use the `Line N:` numbering the
//! correction file expects.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::entry::variants::CharacterHeader;
use crate::pinyin::{split_readings, Romanization};
use crate::sources::{Cedict, DictionaryRow};

/// A dictionary row whose character has no reading confirmed by CEDICT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinyinMismatch {
    /// 1-based row number, counting rows with at least seven columns
    pub line: usize,
    pub character: String,
    pub pinyin: String,
    /// Distinct CEDICT readings, numbered
    pub cedict: Vec<String>,
}

impl fmt::Display for PinyinMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line {}: {} | dictionary: {} | CEDICT: [{}]",
            self.line,
            self.character,
            self.pinyin,
            self.cedict.join(", ")
        )
    }
}

struct AuditedRow<'a> {
    line: usize,
    pinyin: &'a str,
}

/// Report every row of a character whose pinyin never matches CEDICT.
/// Characters CEDICT does not know are skipped.
pub fn audit_pinyin(rows: &[DictionaryRow], cedict: &Cedict) -> Vec<PinyinMismatch> {
    let mut by_character: BTreeMap<String, Vec<AuditedRow>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        let pinyin = row.pinyin.trim();
        if row.is_preamble() || pinyin.is_empty() {
            continue;
        }
        let base = CharacterHeader::read(&row.header).base_character;
        by_character.entry(base).or_default().push(AuditedRow {
            line: i + 1,
            pinyin,
        });
    }

    let mut mismatches = Vec::new();
    for (character, entries) in by_character {
        let attested = cedict.entries(&character);
        if attested.is_empty() {
            continue;
        }
        let confirmed = entries.iter().any(|entry| {
            split_readings(entry.pinyin).into_iter().any(|reading| {
                let reading = Romanization::parse(reading);
                attested.iter().any(|g| reading.matches(&g.romanization))
            })
        });
        if confirmed {
            continue;
        }

        let cedict: BTreeSet<&str> = attested.iter().map(|g| g.pinyin.as_str()).collect();
        let cedict: Vec<String> = cedict.into_iter().map(str::to_string).collect();
        for entry in &entries {
            mismatches.push(PinyinMismatch {
                line: entry.line,
                character: character.clone(),
                pinyin: entry.pinyin.to_string(),
                cedict: cedict.clone(),
            });
        }
    }

    mismatches.sort_by_key(|m| m.line);
    log::info!("Found {} pinyin mismatches", mismatches.len());
    mismatches
}
