//! Expansion of dictionary rows into per-sense work items.

use std::collections::HashMap;

use serde::Serialize;

use crate::entry::senses;
use crate::entry::variants::{variants_for_sense, CharacterHeader};
use crate::sources::{DictionaryRow, PinyinCorrections};
use crate::types::Sense;

/// One sense of one dictionary row, ready for fusion.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSense {
    pub id: String,
    pub base_character: String,
    /// Base character first, then the variants applicable to this sense
    pub candidates: Vec<String>,
    pub variants_for_sense: Vec<String>,
    pub sense: Sense,
    pub pinyin: String,
    pub level: String,
    pub page: String,
}

/// Hint generation request for a sense without example words.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HintRequest {
    pub id: String,
    #[serde(rename = "char")]
    pub character: String,
    #[serde(rename = "def")]
    pub definition: String,
}

/// Jyutping disambiguation request for a sense with competing readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JyutpingRequest {
    pub id: String,
    #[serde(rename = "char")]
    pub character: String,
    #[serde(rename = "py")]
    pub pinyin: String,
    #[serde(rename = "def")]
    pub definition: String,
    pub hints: String,
    pub candidates: Vec<String>,
}

/// Card id: `干（乾）` sense 3 becomes `干_乾_3`.
pub fn card_id(raw_header: &str, ordinal: u32) -> String {
    let stem = raw_header.trim().replace('（', "_").replace('）', "");
    format!("{}_{}", stem, ordinal)
}

/// Apply pinyin corrections, skip preamble rows and split every row into
/// its senses.
///
/// Card id ordinals count senses per distinct raw header across the whole
/// input, so a headword split over several rows keeps unique ids.
pub fn plan(rows: &[DictionaryRow], corrections: &PinyinCorrections) -> Vec<PlannedSense> {
    let mut ordinals: HashMap<String, u32> = HashMap::new();
    let mut planned = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let pinyin = corrections.apply(i + 1, &row.pinyin);
        if row.is_preamble() {
            continue;
        }

        let header = CharacterHeader::read(&row.header);
        let variants = header.variants();
        for sense in senses::split(&row.definition) {
            let ordinal = ordinals.entry(row.header.trim().to_string()).or_insert(0);
            *ordinal += 1;

            let variants_for_sense = variants_for_sense(&variants, sense.index);
            let mut candidates = vec![header.base_character.clone()];
            for v in &variants_for_sense {
                if !candidates.contains(v) {
                    candidates.push(v.clone());
                }
            }

            planned.push(PlannedSense {
                id: card_id(&row.header, *ordinal),
                base_character: header.base_character.clone(),
                candidates,
                variants_for_sense,
                sense,
                pinyin: pinyin.clone(),
                level: row.level.clone(),
                page: row.page.clone(),
            });
        }
    }

    log::info!("Planned {} senses from {} rows", planned.len(), rows.len());
    planned
}
