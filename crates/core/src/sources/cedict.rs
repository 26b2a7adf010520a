//! CC-CEDICT bilingual dictionary.
//!
//! Line format: `traditional simplified [pin1 yin1] /gloss1/gloss2/`.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::{Context, Result};

use crate::matching::keywords::keywords;
use crate::pinyin::Romanization;

/// One CEDICT entry for a simplified headword.
#[derive(Debug, Clone, PartialEq)]
pub struct GlossEntry {
    /// Lower-cased numbered pinyin with `u:` written as `v`
    pub pinyin: String,
    pub romanization: Romanization,
    /// All glosses joined with `; `
    pub english: String,
}

/// Glosses by simplified headword plus a reverse keyword index.
#[derive(Debug, Default)]
pub struct Cedict {
    entries: HashMap<String, Vec<GlossEntry>>,
    /// Simplified word -> English keywords of all its glosses
    reverse: HashMap<String, BTreeSet<String>>,
}

impl Cedict {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read CEDICT: {}", path.display()))?;
        let dict = Self::parse_str(&content);
        log::info!("Loaded CEDICT: {} headwords", dict.entries.len());
        Ok(dict)
    }

    pub fn parse_str(content: &str) -> Self {
        let mut dict = Cedict::default();
        for line in content.lines() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if let Some((simplified, entry)) = parse_line(line) {
                dict.reverse
                    .entry(simplified.clone())
                    .or_default()
                    .extend(keywords(&entry.english));
                dict.entries.entry(simplified).or_default().push(entry);
            }
        }
        dict
    }

    /// Entries for a simplified headword, in file order.
    pub fn entries(&self, simplified: &str) -> &[GlossEntry] {
        self.entries
            .get(simplified)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// English keywords attested for a simplified word.
    pub fn reverse_keywords(&self, simplified: &str) -> Option<&BTreeSet<String>> {
        self.reverse.get(simplified)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_line(line: &str) -> Option<(String, GlossEntry)> {
    let line = line.trim_end().trim_end_matches('/');
    let mut parts = line.split('/');
    let header = parts.next()?;
    let glosses: Vec<&str> = parts.map(str::trim).filter(|g| !g.is_empty()).collect();
    if glosses.is_empty() {
        return None;
    }

    let mut words = header.split_whitespace();
    words.next()?;
    let simplified = words.next()?;
    let open = header.find('[')?;
    let close = header[open..].find(']')? + open;
    let pinyin = header[open + 1..close].to_lowercase().replace("u:", "v");

    Some((
        simplified.to_string(),
        GlossEntry {
            romanization: Romanization::parse(&pinyin),
            pinyin,
            english: glosses.join("; "),
        },
    ))
}
