//! Pinyin normalization: numbered ↔ tone-marked ↔ bare letters.
//!
//! Readings from different sources are compared through [`Romanization`],
//! a base-letter string plus a tone set. An empty tone set and `{5}` both
//! denote the neutral tone.

use std::collections::BTreeSet;
use std::fmt;

use unicode_normalization::UnicodeNormalization;

/// Vowels in right-to-left fallback priority order.
const VOWELS: &str = "aoeiuüv";

const COMBINING_DIAERESIS: char = '\u{0308}';

/// Tone 1..4 forms of each markable vowel.
fn tone_marks(vowel: char) -> Option<[char; 4]> {
    match vowel {
        'a' => Some(['ā', 'á', 'ǎ', 'à']),
        'o' => Some(['ō', 'ó', 'ǒ', 'ò']),
        'e' => Some(['ē', 'é', 'ě', 'è']),
        'i' => Some(['ī', 'í', 'ǐ', 'ì']),
        'u' => Some(['ū', 'ú', 'ǔ', 'ù']),
        'ü' | 'v' => Some(['ǖ', 'ǘ', 'ǚ', 'ǜ']),
        _ => None,
    }
}

/// Tone number carried by a precomposed toned vowel.
fn tone_of_mark(c: char) -> Option<u8> {
    match c {
        'ā' | 'ē' | 'ī' | 'ō' | 'ū' | 'ǖ' | 'Ā' | 'Ē' | 'Ī' | 'Ō' | 'Ū' | 'Ǖ' => Some(1),
        'á' | 'é' | 'í' | 'ó' | 'ú' | 'ǘ' | 'Á' | 'É' | 'Í' | 'Ó' | 'Ú' | 'Ǘ' => Some(2),
        'ǎ' | 'ě' | 'ǐ' | 'ǒ' | 'ǔ' | 'ǚ' | 'Ǎ' | 'Ě' | 'Ǐ' | 'Ǒ' | 'Ǔ' | 'Ǚ' => Some(3),
        'à' | 'è' | 'ì' | 'ò' | 'ù' | 'ǜ' | 'À' | 'È' | 'Ì' | 'Ò' | 'Ù' | 'Ǜ' => Some(4),
        _ => None,
    }
}

/// Convert numbered pinyin (`lv4`, `ai1`, `da5`) to tone marks (`lǜ`, `āi`, `da`).
///
/// Input that is not letters followed by a single tone digit 0..5 is
/// returned unchanged.
pub fn numbered_to_marked(numbered: &str) -> String {
    let Some(tone_char) = numbered.chars().last() else {
        return String::new();
    };
    let Some(tone) = tone_char.to_digit(10) else {
        return numbered.to_string();
    };
    let letters = &numbered[..numbered.len() - 1];
    let valid = !letters.is_empty()
        && letters
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == 'ü' || c == 'Ü');
    if !valid || tone > 5 {
        return numbered.to_string();
    }

    let syllable = letters.to_lowercase().replace('v', "ü");
    if tone == 0 || tone == 5 {
        return syllable;
    }

    let chars: Vec<char> = syllable.chars().collect();
    let target = if let Some(i) = chars.iter().position(|&c| c == 'a') {
        Some(i)
    } else if let Some(i) = chars.iter().position(|&c| c == 'e') {
        Some(i)
    } else if syllable.contains("ou") {
        chars.iter().position(|&c| c == 'o')
    } else {
        chars.iter().rposition(|&c| VOWELS.contains(c))
    };

    let Some(idx) = target else {
        return numbered.to_string();
    };
    let Some(marks) = tone_marks(chars[idx]) else {
        return numbered.to_string();
    };

    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| if i == idx { marks[tone as usize - 1] } else { c })
        .collect()
}

/// Convert every whitespace-separated syllable of numbered pinyin.
pub fn numbered_text_to_marked(text: &str) -> String {
    text.split_whitespace()
        .map(numbered_to_marked)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove `（…）` and `(…)` glosses embedded in a pinyin field.
pub(crate) fn strip_parenthesized(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '（' | '(' => depth += 1,
            '）' | ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Decompose pinyin into base letters and the set of tones it encodes.
///
/// Toned vowels and literal digits both contribute tones; tone 0 is folded
/// into 5. `ü` (and `u:`) become `v` so that `lǚ`, `lv3` and `lu:3` agree.
pub fn marked_to_base(pinyin: &str) -> (String, BTreeSet<u8>) {
    let clean = strip_parenthesized(pinyin).to_lowercase().replace("u:", "v");

    let mut tones = BTreeSet::new();
    for c in clean.chars() {
        if let Some(t) = tone_of_mark(c) {
            tones.insert(t);
        } else if let Some(d) = c.to_digit(10) {
            if d <= 5 {
                tones.insert(if d == 0 { 5 } else { d as u8 });
            }
        }
    }

    let mut base = String::with_capacity(clean.len());
    for c in clean.nfd() {
        if c == COMBINING_DIAERESIS {
            if base.ends_with('u') {
                base.pop();
                base.push('v');
            }
        } else if c.is_ascii_lowercase() {
            base.push(c);
        }
    }

    (base, tones)
}

/// Split a polyphonic field such as `gān/qián` into single readings.
pub fn split_readings(field: &str) -> Vec<&str> {
    field
        .split(|c: char| c == '/' || c == ',' || c == '，' || c == '、' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// A reading reduced to a comparable canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Romanization {
    pub base: String,
    pub tones: BTreeSet<u8>,
}

impl Romanization {
    /// Parse a tone-marked or numbered reading.
    pub fn parse(pinyin: &str) -> Self {
        let (base, tones) = marked_to_base(pinyin);
        Romanization { base, tones }
    }

    /// Tone set with the neutral tone made explicit.
    fn effective_tones(&self) -> BTreeSet<u8> {
        if self.tones.is_empty() {
            BTreeSet::from([5])
        } else {
            self.tones.clone()
        }
    }

    /// Exact match on base letters and tone, neutral-tone aware.
    pub fn matches(&self, other: &Romanization) -> bool {
        !self.base.is_empty()
            && self.base == other.base
            && self.effective_tones() == other.effective_tones()
    }

    /// Canonical numbered key such as `gan1` or `de5`.
    pub fn key(&self) -> String {
        let tones: String = self
            .effective_tones()
            .iter()
            .map(|t| t.to_string())
            .collect();
        format!("{}{}", self.base, tones)
    }
}

impl fmt::Display for Romanization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYLLABLES: &[&str] = &[
        "ma", "lv", "nü", "gou", "xiong", "gui", "liu", "er", "zhuang", "yue", "quan", "hm",
    ];

    #[test]
    fn test_numbered_to_marked_rules() {
        assert_eq!(numbered_to_marked("ai1"), "āi");
        assert_eq!(numbered_to_marked("lv4"), "lǜ");
        assert_eq!(numbered_to_marked("gou3"), "gǒu");
        assert_eq!(numbered_to_marked("gui4"), "guì");
        assert_eq!(numbered_to_marked("liu2"), "liú");
        assert_eq!(numbered_to_marked("yue4"), "yuè");
        assert_eq!(numbered_to_marked("Zhong1"), "zhōng");
    }

    #[test]
    fn test_numbered_to_marked_neutral() {
        assert_eq!(numbered_to_marked("da5"), "da");
        assert_eq!(numbered_to_marked("lv0"), "lü");
    }

    #[test]
    fn test_numbered_to_marked_passthrough() {
        assert_eq!(numbered_to_marked(""), "");
        assert_eq!(numbered_to_marked("gān"), "gān");
        assert_eq!(numbered_to_marked("ma7"), "ma7");
        assert_eq!(numbered_to_marked("4"), "4");
        assert_eq!(numbered_to_marked("hm2"), "hm2");
    }

    #[test]
    fn test_roundtrip_tones() {
        for syl in SYLLABLES {
            for tone in 1..=4u8 {
                let numbered = format!("{}{}", syl, tone);
                let marked = numbered_to_marked(&numbered);
                if marked == numbered {
                    // no vowel to carry the mark
                    continue;
                }
                let (_, tones) = marked_to_base(&marked);
                assert_eq!(tones, BTreeSet::from([tone]), "{} -> {}", numbered, marked);
            }
        }
    }

    #[test]
    fn test_neutral_has_no_tones() {
        for syl in SYLLABLES {
            for tone in [0u8, 5] {
                let marked = numbered_to_marked(&format!("{}{}", syl, tone));
                assert!(marked.chars().all(|c| tone_of_mark(c).is_none()));
                let (_, tones) = marked_to_base(&marked);
                assert!(tones.is_empty(), "{}", marked);
            }
        }
    }

    #[test]
    fn test_marked_to_base() {
        let (base, tones) = marked_to_base("zhōng");
        assert_eq!(base, "zhong");
        assert_eq!(tones, BTreeSet::from([1]));

        let (base, tones) = marked_to_base("lǚ");
        assert_eq!(base, "lv");
        assert_eq!(tones, BTreeSet::from([3]));

        let (base, tones) = marked_to_base("lu:3");
        assert_eq!(base, "lv");
        assert_eq!(tones, BTreeSet::from([3]));

        let (base, _) = marked_to_base("nü");
        assert_eq!(base, "nv");
    }

    #[test]
    fn test_marked_to_base_strips_glosses() {
        let (base, tones) = marked_to_base("gān（又）");
        assert_eq!(base, "gan");
        assert_eq!(tones, BTreeSet::from([1]));
    }

    #[test]
    fn test_marked_to_base_multiple_tones() {
        let (_, tones) = marked_to_base("hāo hào");
        assert_eq!(tones, BTreeSet::from([1, 4]));
    }

    #[test]
    fn test_split_readings() {
        assert_eq!(split_readings("gān/qián"), vec!["gān", "qián"]);
        assert_eq!(split_readings("hǎo, hào"), vec!["hǎo", "hào"]);
        assert!(split_readings("  ").is_empty());
    }

    #[test]
    fn test_romanization_matching() {
        let marked = Romanization::parse("kāi");
        let numbered = Romanization::parse("kai1");
        assert!(marked.matches(&numbered));
        assert!(!marked.matches(&Romanization::parse("kai3")));

        let neutral = Romanization::parse("de");
        assert!(neutral.matches(&Romanization::parse("de5")));
        assert_eq!(neutral.key(), "de5");
        assert_eq!(marked.key(), "kai1");
        assert!(!Romanization::parse("").matches(&Romanization::parse("")));
    }

    #[test]
    fn test_numbered_text_to_marked() {
        assert_eq!(numbered_text_to_marked("zhong1 guo2"), "zhōng guó");
    }
}
