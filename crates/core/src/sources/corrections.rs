//! Manual pinyin corrections produced by the source audit.
//!
//! Each line looks like
//! `Line 123: 干 gan -> Suggestions: ['gan1', 'gan4']`; the first suggestion
//! replaces the pinyin of the 123rd dictionary row.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use crate::pinyin::numbered_to_marked;

lazy_static::lazy_static! {
    static ref SUGGESTION_LINE: Regex =
        Regex::new(r#"Line (\d+):.+Suggestions: \[['"]([^'"\n]+)['"]"#).unwrap();
}

/// Tone-marked pinyin overrides keyed by 1-based row number.
#[derive(Debug, Default)]
pub struct PinyinCorrections {
    by_row: HashMap<usize, String>,
}

impl PinyinCorrections {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pinyin suggestions: {}", path.display()))?;
        let corrections = Self::parse_str(&content);
        log::info!("Loaded {} pinyin corrections", corrections.len());
        Ok(corrections)
    }

    pub fn parse_str(content: &str) -> Self {
        let by_row = content
            .lines()
            .filter_map(|line| SUGGESTION_LINE.captures(line.trim()))
            .filter_map(|caps| {
                let row: usize = caps[1].parse().ok()?;
                Some((row, numbered_to_marked(&caps[2])))
            })
            .collect();
        PinyinCorrections { by_row }
    }

    /// The corrected pinyin for a row, or the row's own pinyin.
    pub fn apply(&self, row: usize, pinyin: &str) -> String {
        self.by_row
            .get(&row)
            .cloned()
            .unwrap_or_else(|| pinyin.to_string())
    }

    pub fn len(&self) -> usize {
        self.by_row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_row.is_empty()
    }
}
