use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// How a variant glyph relates to the headword.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// No marker: the traditional form.
    Traditional,
    /// `*`: variant listed in the standard character table.
    StandardVariant,
    /// `**`: variant attested outside the standard table.
    ExternalVariant,
}

/// One decoded variant token from a character header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariantEntry {
    /// The variant glyph
    pub character: String,
    pub kind: VariantKind,
    /// Marked with `△`: the variant has its own dictionary article
    pub has_separate_entry: bool,
    /// 1-based sense indices; empty means every sense
    pub applicable_senses: BTreeSet<u32>,
}

impl VariantEntry {
    /// True if this variant applies to the given 1-based sense.
    pub fn applies_to(&self, sense_index: u32) -> bool {
        self.applicable_senses.is_empty() || self.applicable_senses.contains(&sense_index)
    }
}

/// One numbered definition unit belonging to a headword.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sense {
    /// 1-based ordinal within the headword
    pub index: u32,
    /// Cleaned definition prose
    pub text: String,
    /// Example words attached to this sense
    pub hints: Vec<String>,
}

/// Where a fused Middle Chinese reading came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReadingSource {
    /// Baxter–Sagart reconstruction table
    BaxterSagart,
    /// Unihan `kTang` field
    Unihan,
}

impl ReadingSource {
    pub fn tag(&self) -> &'static str {
        match self {
            ReadingSource::BaxterSagart => "BS",
            ReadingSource::Unihan => "Unihan",
        }
    }
}

/// Final output unit: one per sense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FusedRecord {
    /// Stable card id, e.g. `干_⑦—⑬△乾、⑦—⑬*乹_7`
    pub id: String,
    pub base_character: String,
    pub sense_index: u32,
    /// Base character plus applicable variants, e.g. `干（乾、乹）`
    pub display_character: String,
    pub variants_for_sense: Vec<String>,
    pub definition: String,
    pub hint: String,
    pub pinyin: String,
    pub jyutping: String,
    pub middle_chinese: String,
    pub middle_chinese_source: Option<ReadingSource>,
    pub english: String,
    pub hangul: String,
    /// Most common monophonic character sharing the pinyin reading
    pub pinyin_proxy: String,
    /// Most common monophonic character sharing the jyutping reading
    pub jyutping_proxy: String,
    pub frequency_rank: String,
    pub level: String,
    pub page: String,
}

impl FusedRecord {
    /// Middle Chinese with its source tag, e.g. `kæn (BS)`.
    pub fn middle_chinese_display(&self) -> String {
        match self.middle_chinese_source {
            Some(source) if !self.middle_chinese.is_empty() => {
                format!("{} ({})", self.middle_chinese, source.tag())
            }
            _ => self.middle_chinese.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(senses: &[u32]) -> VariantEntry {
        VariantEntry {
            character: "乾".into(),
            kind: VariantKind::Traditional,
            has_separate_entry: true,
            applicable_senses: senses.iter().copied().collect(),
        }
    }

    #[test]
    fn test_variant_applies_to_all_when_unrestricted() {
        let v = variant(&[]);
        assert!(v.applies_to(1));
        assert!(v.applies_to(20));
    }

    #[test]
    fn test_variant_applies_to_listed_senses_only() {
        let v = variant(&[7, 8, 9]);
        assert!(v.applies_to(8));
        assert!(!v.applies_to(1));
        assert!(!v.applies_to(10));
    }

    #[test]
    fn test_variant_kind_serde_names() {
        let json = serde_json::to_string(&VariantKind::StandardVariant).unwrap();
        assert_eq!(json, "\"standard_variant\"");
    }

    #[test]
    fn test_middle_chinese_display() {
        let mut record = FusedRecord {
            id: "干_1".into(),
            base_character: "干".into(),
            sense_index: 1,
            display_character: "干".into(),
            variants_for_sense: vec![],
            definition: String::new(),
            hint: String::new(),
            pinyin: "gān".into(),
            jyutping: String::new(),
            middle_chinese: "kan".into(),
            middle_chinese_source: Some(ReadingSource::BaxterSagart),
            english: String::new(),
            hangul: String::new(),
            pinyin_proxy: String::new(),
            jyutping_proxy: String::new(),
            frequency_rank: String::new(),
            level: String::new(),
            page: String::new(),
        };
        assert_eq!(record.middle_chinese_display(), "kan (BS)");

        record.middle_chinese_source = Some(ReadingSource::Unihan);
        assert_eq!(record.middle_chinese_display(), "kan (Unihan)");

        record.middle_chinese.clear();
        assert_eq!(record.middle_chinese_display(), "");
    }
}
