//! Candidate scoring and selection for English glosses, Middle Chinese
//! reconstructions and Cantonese readings.

use std::collections::BTreeSet;

use super::keywords::{chinese_tokens, keywords};
use crate::pinyin::Romanization;
use crate::sources::{Cedict, ReadingDatabase, ReconstructionTable};

pub const ENGLISH_SEPARATOR: &str = "; ";
pub const READING_SEPARATOR: &str = " / ";

/// Bonus when a surname sense meets a "surname" gloss.
const SURNAME_BONUS: u32 = 10;
/// Bonus per single-character token found verbatim in the candidate.
const LITERAL_BONUS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub score: u32,
    pub value: String,
}

impl Candidate {
    pub fn new(score: u32, value: impl Into<String>) -> Self {
        Candidate {
            score,
            value: value.into(),
        }
    }
}

/// Pick the winning value(s) of a scored pool.
///
/// All top-scoring values are kept, deduplicated and sorted. When no
/// candidate scored above zero the whole pool is returned the same way.
pub fn select_best(candidates: &[Candidate], separator: &str) -> String {
    let Some(max) = candidates.iter().map(|c| c.score).max() else {
        return String::new();
    };
    let winners: BTreeSet<&str> = candidates
        .iter()
        .filter(|c| max == 0 || c.score == max)
        .map(|c| c.value.as_str())
        .filter(|v| !v.is_empty())
        .collect();
    winners.into_iter().collect::<Vec<_>>().join(separator)
}

/// Everything a Chinese sense definition contributes to gloss scoring.
#[derive(Debug, Default)]
pub struct GlossTarget {
    keywords: BTreeSet<String>,
    surname: bool,
    literals: Vec<String>,
}

impl GlossTarget {
    pub fn new(definition: &str, cedict: &Cedict) -> Self {
        let tokens = chinese_tokens(definition);
        let keywords = tokens
            .iter()
            .filter_map(|t| cedict.reverse_keywords(t))
            .flatten()
            .cloned()
            .collect();
        let literals = tokens
            .into_iter()
            .filter(|t| t.chars().count() == 1)
            .collect();
        GlossTarget {
            keywords,
            surname: definition.contains('姓'),
            literals,
        }
    }

    pub fn score(&self, gloss: &str) -> u32 {
        let gloss_keywords = keywords(gloss);
        let mut score = gloss_keywords.intersection(&self.keywords).count() as u32;
        if self.surname && gloss_keywords.contains("surname") {
            score += SURNAME_BONUS;
        }
        let literal_hits = self.literals.iter().filter(|t| gloss.contains(t.as_str())).count();
        score + LITERAL_BONUS * literal_hits as u32
    }
}

/// English gloss for one sense of a character.
///
/// Entries whose reading matches the sense pinyin are preferred; if none
/// match every entry competes.
pub fn best_english(cedict: &Cedict, character: &str, definition: &str, pinyin: &str) -> String {
    let entries = cedict.entries(character);
    if entries.is_empty() {
        return String::new();
    }
    let reading = Romanization::parse(pinyin);
    let matching: Vec<_> = entries
        .iter()
        .filter(|e| e.romanization.matches(&reading))
        .collect();
    let pool = if matching.is_empty() {
        entries.iter().collect()
    } else {
        matching
    };
    if let [only] = pool.as_slice() {
        return only.english.clone();
    }

    let target = GlossTarget::new(definition, cedict);
    let candidates: Vec<Candidate> = pool
        .iter()
        .map(|e| Candidate::new(target.score(&e.english), e.english.as_str()))
        .collect();
    select_best(&candidates, ENGLISH_SEPARATOR)
}

/// Middle Chinese reconstruction for the sense, looked up under every
/// candidate character and scored against the sense's English keywords.
pub fn best_middle_chinese(
    table: &ReconstructionTable,
    characters: &[String],
    pinyin: &str,
    english: &str,
) -> String {
    let reading = Romanization::parse(pinyin);
    let target = keywords(english);
    let candidates: Vec<Candidate> = characters
        .iter()
        .flat_map(|c| table.lookup(c, &reading))
        .map(|e| {
            Candidate::new(
                e.keywords.intersection(&target).count() as u32,
                e.middle_chinese.as_str(),
            )
        })
        .collect();
    select_best(&candidates, READING_SEPARATOR)
}

/// Every Cantonese reading the database lists for the candidate characters,
/// deduplicated in first-seen order.
pub fn cantonese_candidates(db: &ReadingDatabase, characters: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    characters
        .iter()
        .filter_map(|c| db.get(c))
        .flat_map(|r| r.cantonese.iter())
        .filter(|jp| seen.insert(jp.to_string()))
        .cloned()
        .collect()
}

/// Cantonese reading for the sense from the character database.
///
/// A single distinct candidate wins outright; otherwise candidates attested
/// for the sense pinyin by the Mandarin/Cantonese correspondence field score 1.
pub fn best_cantonese(db: &ReadingDatabase, characters: &[String], pinyin: &str) -> String {
    let candidates = cantonese_candidates(db, characters);
    match candidates.as_slice() {
        [] => return String::new(),
        [only] => return only.clone(),
        _ => {}
    }

    let reading = Romanization::parse(pinyin);
    let attested: BTreeSet<&str> = characters
        .iter()
        .filter_map(|c| db.get(c))
        .flat_map(|r| r.cantonese_for(&reading))
        .collect();
    let scored: Vec<Candidate> = candidates
        .iter()
        .map(|jp| Candidate::new(attested.contains(jp.as_str()) as u32, jp.as_str()))
        .collect();
    select_best(&scored, READING_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_best_ties() {
        let pool = vec![
            Candidate::new(2, "to open"),
            Candidate::new(2, "to start"),
            Candidate::new(1, "key"),
        ];
        assert_eq!(select_best(&pool, "; "), "to open; to start");
    }

    #[test]
    fn test_select_best_zero_signal_union() {
        let pool = vec![
            Candidate::new(0, "b"),
            Candidate::new(0, "a"),
            Candidate::new(0, "b"),
        ];
        assert_eq!(select_best(&pool, " / "), "a / b");
    }

    #[test]
    fn test_select_best_empty() {
        assert_eq!(select_best(&[], "; "), "");
    }

    fn cedict() -> Cedict {
        Cedict::parse_str(
            "\
乾 干 [gan1] /dry/clean/
幹 干 [gan4] /tree trunk/to do/
干 干 [gan1] /shield/to offend/
干 干 [gan1] /surname Gan/
盾牌 盾牌 [dun4 pai2] /shield/pretext/
",
        )
    }

    #[test]
    fn test_best_english_uses_reverse_index() {
        let dict = cedict();
        assert_eq!(
            best_english(&dict, "干", "盾牌。", "gān"),
            "shield; to offend"
        );
    }

    #[test]
    fn test_best_english_surname_bonus() {
        let dict = cedict();
        assert_eq!(best_english(&dict, "干", "姓。", "gān"), "surname Gan");
    }

    #[test]
    fn test_best_english_single_pinyin_match() {
        let dict = cedict();
        assert_eq!(best_english(&dict, "干", "做事", "gàn"), "tree trunk; to do");
    }

    #[test]
    fn test_best_english_falls_back_to_all_entries() {
        let dict = cedict();
        let english = best_english(&dict, "干", "无关", "qián");
        assert!(english.contains("dry; clean"));
        assert!(english.contains("tree trunk; to do"));
    }

    #[test]
    fn test_best_english_unknown() {
        assert_eq!(best_english(&cedict(), "水", "水", "shuǐ"), "");
    }

    #[test]
    fn test_best_middle_chinese() {
        let table = ReconstructionTable::from_reader(
            "zi,py,MC,gloss\n干,gān,kan,shield\n乾,gān,kan2,dry\n乾,qián,gjen,heaven\n".as_bytes(),
        )
        .unwrap();
        let chars = vec!["干".to_string(), "乾".to_string()];
        assert_eq!(best_middle_chinese(&table, &chars, "gān", "dry; clean"), "kan2");
        assert_eq!(best_middle_chinese(&table, &chars, "gān", "nothing"), "kan / kan2");
        assert_eq!(best_middle_chinese(&table, &chars, "gàn", "dry"), "");
    }

    #[test]
    fn test_best_cantonese() {
        let db = ReadingDatabase::parse_str(
            "U+957F\tkCantonese\tcoeng4 zoeng2\n\
             U+957F\tkSMSZD2003Readings\tcháng粵coeng4 zhǎng粵zoeng2\n\
             U+5E72\tkCantonese\tgon1\n",
        );
        let chang = vec!["长".to_string()];
        assert_eq!(best_cantonese(&db, &chang, "zhǎng"), "zoeng2");
        assert_eq!(best_cantonese(&db, &chang, "zhàng"), "coeng4 / zoeng2");
        assert_eq!(best_cantonese(&db, &["干".to_string()], "gàn"), "gon1");
        assert_eq!(best_cantonese(&db, &["水".to_string()], "shuǐ"), "");
    }
}
