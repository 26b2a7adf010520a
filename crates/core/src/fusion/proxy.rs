//! Pronunciation proxies: a common, unambiguous character that shares a
//! given reading.

use std::collections::{BTreeSet, HashMap};

use super::planner::PlannedSense;
use crate::sources::{FrequencyTable, ReadingDatabase};

/// Rank assigned to characters missing from the frequency list.
const UNRANKED: u32 = 100_000;

/// Reading -> characters, plus each character's set of readings.
#[derive(Debug, Default)]
pub struct ProxyIndex {
    by_reading: HashMap<String, BTreeSet<String>>,
    readings_of: HashMap<String, BTreeSet<String>>,
}

impl ProxyIndex {
    pub fn add(&mut self, reading: &str, character: &str) {
        let reading = reading.trim();
        if reading.is_empty() || character.is_empty() {
            return;
        }
        self.by_reading
            .entry(reading.to_string())
            .or_default()
            .insert(character.to_string());
        self.readings_of
            .entry(character.to_string())
            .or_default()
            .insert(reading.to_string());
    }

    /// Pinyin index over every planned sense's headword.
    pub fn from_pinyin(plan: &[PlannedSense]) -> Self {
        let mut index = Self::default();
        for planned in plan {
            index.add(&planned.pinyin, &planned.base_character);
        }
        index
    }

    /// Jyutping index over every Cantonese reading in the database.
    pub fn from_jyutping(db: &ReadingDatabase) -> Self {
        let mut index = Self::default();
        for (character, readings) in db.iter() {
            for reading in &readings.cantonese {
                index.add(reading, character);
            }
        }
        index
    }

    fn is_polyphonic(&self, character: &str) -> bool {
        self.readings_of
            .get(character)
            .map(|r| r.len() > 1)
            .unwrap_or(false)
    }

    /// Best proxy for a reading: monophonic first, then most frequent, then
    /// lowest code point. Empty when nothing shares the reading.
    pub fn pick(&self, reading: &str, frequency: &FrequencyTable) -> String {
        let Some(characters) = self.by_reading.get(reading.trim()) else {
            return String::new();
        };
        characters
            .iter()
            .min_by_key(|c| {
                (
                    self.is_polyphonic(c),
                    frequency.rank(c).unwrap_or(UNRANKED),
                    c.chars().next().map(u32::from).unwrap_or(u32::MAX),
                )
            })
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frequency() -> FrequencyTable {
        FrequencyTable::from_reader("1,的,100,1\n5,地,50,2\n9,低,10,3\n".as_bytes()).unwrap()
    }

    #[test]
    fn test_prefers_monophonic() {
        let mut index = ProxyIndex::default();
        index.add("dì", "地");
        index.add("de", "地");
        index.add("dì", "弟");
        assert_eq!(index.pick("dì", &frequency()), "弟");
    }

    #[test]
    fn test_prefers_frequent_then_code_point() {
        let mut index = ProxyIndex::default();
        index.add("dī", "低");
        index.add("dī", "堤");
        index.add("dī", "滴");
        assert_eq!(index.pick("dī", &frequency()), "低");

        let mut unranked = ProxyIndex::default();
        unranked.add("tí", "题");
        unranked.add("tí", "提");
        assert_eq!(unranked.pick("tí", &frequency()), "提");
    }

    #[test]
    fn test_unknown_reading() {
        let index = ProxyIndex::default();
        assert_eq!(index.pick("xyz", &frequency()), "");
    }

    #[test]
    fn test_from_jyutping() {
        let db = ReadingDatabase::parse_str(
            "U+957F\tkCantonese\tcoeng4 zoeng2\nU+573A\tkCantonese\tcoeng4\n",
        );
        let index = ProxyIndex::from_jyutping(&db);
        assert_eq!(index.pick("coeng4", &FrequencyTable::default()), "场");
    }
}
