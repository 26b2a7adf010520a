//! Unihan reading database (`Unihan_Readings.txt`).
//!
//! Tab-separated `U+XXXX<TAB>field<TAB>value` lines. Only the reading
//! fields used for fusion are kept.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::pinyin::Romanization;

/// Readings of one character.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharReadings {
    /// `kTang` Middle Chinese
    pub tang: Option<String>,
    /// `kCantonese` readings, primary first
    pub cantonese: Vec<String>,
    /// `kHangul`, e.g. `온 / 은`
    pub hangul: Option<String>,
    /// `kSMSZD2003Readings` Mandarin → Cantonese correspondences
    pub mandarin_to_cantonese: Vec<(Romanization, String)>,
}

impl CharReadings {
    /// Cantonese readings attested for a Mandarin reading.
    pub fn cantonese_for(&self, mandarin: &Romanization) -> Vec<&str> {
        self.mandarin_to_cantonese
            .iter()
            .filter(|(py, _)| py.matches(mandarin))
            .map(|(_, jp)| jp.as_str())
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct ReadingDatabase {
    chars: HashMap<String, CharReadings>,
}

impl ReadingDatabase {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read Unihan readings: {}", path.display()))?;
        let db = Self::parse_str(&content);
        log::info!("Loaded Unihan readings: {} characters", db.chars.len());
        Ok(db)
    }

    pub fn parse_str(content: &str) -> Self {
        let mut db = ReadingDatabase::default();
        for line in content.lines() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let mut fields = line.trim().splitn(3, '\t');
            let (Some(code), Some(field), Some(value)) = (fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            let Some(character) = parse_codepoint(code) else {
                continue;
            };

            match field {
                "kTang" => db.entry(character).tang = Some(value.trim().to_string()),
                "kCantonese" => {
                    db.entry(character).cantonese =
                        value.split_whitespace().map(str::to_string).collect();
                }
                "kHangul" => {
                    let cleaned: Vec<&str> = value
                        .split_whitespace()
                        .map(|v| v.split(':').next().unwrap_or(v))
                        .collect();
                    db.entry(character).hangul = Some(cleaned.join(" / "));
                }
                "kSMSZD2003Readings" => {
                    let mapping = value
                        .split_whitespace()
                        .filter_map(|pair| pair.split_once('粵'))
                        .flat_map(|(py, jps)| {
                            let py = Romanization::parse(py);
                            jps.split(',')
                                .filter(|jp| !jp.is_empty())
                                .map(move |jp| (py.clone(), jp.to_string()))
                        })
                        .collect();
                    db.entry(character).mandarin_to_cantonese = mapping;
                }
                _ => {}
            }
        }
        db
    }

    fn entry(&mut self, character: char) -> &mut CharReadings {
        self.chars.entry(character.to_string()).or_default()
    }

    pub fn get(&self, character: &str) -> Option<&CharReadings> {
        self.chars.get(character)
    }

    /// All characters with their readings, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CharReadings)> {
        self.chars.iter().map(|(c, r)| (c.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// `U+4E7E` -> `乾`.
fn parse_codepoint(code: &str) -> Option<char> {
    let hex = code.strip_prefix("U+")?;
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}
