//! Cantonese reading segmentation.
//!
//! Text is split into dictionary words with a trie and a minimum-token
//! dynamic program; each word's Jyutping is then spread over its characters.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::sources::ReadingDatabase;

/// One character of segmented text and the reading assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharReading {
    pub character: char,
    pub reading: Option<String>,
    /// Covered by a multi-character dictionary word
    pub in_word: bool,
}

/// Assigns a Cantonese reading to every character of a piece of text.
pub trait ReadingSegmenter: Send + Sync {
    fn segment(&self, text: &str) -> Result<Vec<CharReading>>;

    /// Reading of `target` inside `text`, if the segmentation assigns one.
    fn reading_of(&self, text: &str, target: char) -> Option<String> {
        match self.segment(text) {
            Ok(chars) => chars
                .into_iter()
                .find(|c| c.character == target)
                .and_then(|c| c.reading)
                .filter(|r| !r.is_empty()),
            Err(e) => {
                log::debug!("Segmentation of {:?} failed: {:#}", text, e);
                None
            }
        }
    }

    /// Like [`reading_of`](Self::reading_of), but only when `target` was
    /// read as part of a multi-character word.
    fn word_reading_of(&self, text: &str, target: char) -> Option<String> {
        match self.segment(text) {
            Ok(chars) => chars
                .into_iter()
                .find(|c| c.character == target && c.in_word)
                .and_then(|c| c.reading)
                .filter(|r| !r.is_empty()),
            Err(e) => {
                log::debug!("Segmentation of {:?} failed: {:#}", text, e);
                None
            }
        }
    }
}

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    /// Per-character syllables of the word ending here
    syllables: Option<Vec<String>>,
}

/// Dictionary-driven segmenter built from a word list and per-character
/// readings.
#[derive(Debug, Default)]
pub struct DictSegmenter {
    root: TrieNode,
}

impl DictSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary `kCantonese` reading of every character in the database.
    pub fn from_reading_database(db: &ReadingDatabase) -> Self {
        let mut segmenter = Self::new();
        for (character, readings) in db.iter() {
            let mut chars = character.chars();
            if let (Some(c), None, Some(primary)) =
                (chars.next(), chars.next(), readings.cantonese.first())
            {
                segmenter.insert_char(c, primary);
            }
        }
        segmenter
    }

    /// Add a single-character reading. The first reading inserted wins.
    pub fn insert_char(&mut self, character: char, reading: &str) {
        let node = self.root.children.entry(character).or_default();
        if node.syllables.is_none() {
            node.syllables = Some(vec![reading.to_string()]);
        }
    }

    /// Add a multi-character word whose Jyutping has one syllable per
    /// character. Returns false when the word was rejected.
    pub fn insert_word(&mut self, word: &str, jyutping: &str) -> bool {
        let syllables: Vec<String> = jyutping.split_whitespace().map(str::to_lowercase).collect();
        let len = word.chars().count();
        if len < 2 || syllables.len() != len {
            return false;
        }
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_default();
        }
        if node.syllables.is_none() {
            node.syllables = Some(syllables);
        }
        true
    }

    /// Load a CC-Canto style list: `trad simp [pin yin] {jyut ping} /defs/`.
    pub fn load_word_list(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read Cantonese word list: {}", path.display()))?;
        let added = self.add_word_list(&content);
        log::info!("Loaded {} Cantonese words from {}", added, path.display());
        Ok(added)
    }

    pub fn add_word_list(&mut self, content: &str) -> usize {
        let mut added = 0;
        for line in content.lines() {
            if line.starts_with('#') {
                continue;
            }
            let Some((words, rest)) = line.split_once('[') else {
                continue;
            };
            let Some(open) = rest.find('{') else {
                continue;
            };
            let Some(close) = rest[open..].find('}') else {
                continue;
            };
            let jyutping = &rest[open + 1..open + close];
            for word in words.split_whitespace() {
                if self.insert_word(word, jyutping) {
                    added += 1;
                }
            }
        }
        added
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Minimum-token segmentation; ties keep the earliest split found.
    fn segment_chars(&self, chars: &[char]) -> Vec<CharReading> {
        let n = chars.len();
        let mut cost = vec![usize::MAX; n + 1];
        let mut track: Vec<(usize, Option<&[String]>)> = vec![(0, None); n + 1];
        cost[0] = 0;

        for start in 0..n {
            if cost[start] == usize::MAX {
                continue;
            }
            let next = cost[start] + 1;
            // unknown character as its own token
            if next < cost[start + 1] {
                cost[start + 1] = next;
                track[start + 1] = (start, None);
            }
            let mut node = &self.root;
            for (offset, c) in chars[start..].iter().enumerate() {
                let Some(child) = node.children.get(c) else {
                    break;
                };
                node = child;
                let end = start + offset + 1;
                if let Some(syllables) = &node.syllables {
                    if next < cost[end] || (next == cost[end] && track[end].1.is_none()) {
                        cost[end] = next;
                        track[end] = (start, Some(syllables.as_slice()));
                    }
                }
            }
        }

        let mut out = Vec::with_capacity(n);
        let mut end = n;
        while end > 0 {
            let (start, syllables) = track[end];
            let in_word = end - start > 1;
            for i in (start..end).rev() {
                out.push(CharReading {
                    character: chars[i],
                    reading: syllables.and_then(|s| s.get(i - start).cloned()),
                    in_word,
                });
            }
            end = start;
        }
        out.reverse();
        out
    }
}

impl ReadingSegmenter for DictSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<CharReading>> {
        let chars: Vec<char> = text.chars().collect();
        Ok(self.segment_chars(&chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter() -> DictSegmenter {
        let mut seg = DictSegmenter::new();
        seg.insert_char('长', "coeng4");
        seg.insert_char('大', "daai6");
        seg.insert_char('行', "hang4");
        seg.add_word_list(
            "\
# CC-Canto sample
長大 长大 [zhang3 da4] {zoeng2 daai6} /to grow up/
银行 银行 [yin2 hang2] {ngan4 hong4} /bank/
坏词 坏词 [huai4 ci2] {waai6} /syllable count mismatch/
",
        );
        seg
    }

    fn readings(seg: &DictSegmenter, text: &str) -> Vec<Option<String>> {
        seg.segment(text)
            .unwrap()
            .into_iter()
            .map(|c| c.reading)
            .collect()
    }

    #[test]
    fn test_word_context_overrides_char_reading() {
        let seg = segmenter();
        assert_eq!(
            readings(&seg, "长大"),
            vec![Some("zoeng2".into()), Some("daai6".into())]
        );
        assert_eq!(seg.reading_of("银行", '行').as_deref(), Some("hong4"));
        assert_eq!(seg.reading_of("行", '行').as_deref(), Some("hang4"));
    }

    #[test]
    fn test_word_reading_requires_word_context() {
        let seg = segmenter();
        assert_eq!(seg.word_reading_of("长大", '长').as_deref(), Some("zoeng2"));
        assert_eq!(seg.word_reading_of("长高", '长'), None);
        assert_eq!(seg.reading_of("长高", '长').as_deref(), Some("coeng4"));
        let marks: Vec<bool> = seg.segment("银行长").unwrap().iter().map(|c| c.in_word).collect();
        assert_eq!(marks, vec![true, true, false]);
    }

    #[test]
    fn test_unknown_characters() {
        let seg = segmenter();
        assert_eq!(readings(&seg, "长x"), vec![Some("coeng4".into()), None]);
        assert_eq!(seg.reading_of("坏", '坏'), None);
        assert!(seg.segment("").unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_word_rejected() {
        let mut seg = DictSegmenter::new();
        assert!(!seg.insert_word("坏词", "waai6"));
        assert!(!seg.insert_word("坏", "waai6"));
        assert!(seg.insert_word("长大", "zoeng2 daai6"));
    }

    #[test]
    fn test_from_reading_database() {
        let db = ReadingDatabase::parse_str("U+957F\tkCantonese\tcoeng4 zoeng2\n");
        let seg = DictSegmenter::from_reading_database(&db);
        assert_eq!(seg.reading_of("长", '长').as_deref(), Some("coeng4"));
    }
}
