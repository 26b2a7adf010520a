//! Decode the orthographic-variant annotation of a character header.
//!
//! A header such as `干（⑦—⑬△乾、⑦—⑬*乹）` carries the headword followed
//! by a parenthesised, `、`-separated list of variant clauses. Each clause
//! may be restricted to some senses (circled numbers or a circled range),
//! flagged as having its own article (`△`) and tagged with a variant kind
//! (`*` standard, `**` external, none for traditional).

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::types::{VariantEntry, VariantKind};

const OPEN_PAREN: char = '（';
const CLOSE_PAREN: char = '）';
const RANGE_DASH: char = '—';
const SEPARATE_ENTRY: char = '△';

/// A raw header split into its headword and unparsed variant clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterHeader {
    /// The primary (simplified) character
    pub base_character: String,
    /// Raw clause tokens from the parenthetical suffix, in order
    pub variant_clauses: Vec<String>,
}

impl CharacterHeader {
    /// Split a header into base character and clauses.
    ///
    /// Never fails: a header without a well-formed parenthetical suffix is
    /// taken whole as the base character.
    pub fn read(raw: &str) -> Self {
        let trimmed = raw.trim();
        let bare = || CharacterHeader {
            base_character: trimmed.to_string(),
            variant_clauses: Vec::new(),
        };

        let Some(open) = trimmed.find(OPEN_PAREN) else {
            return bare();
        };
        if !trimmed.ends_with(CLOSE_PAREN) {
            return bare();
        }
        let base = trimmed[..open].trim();
        if base.is_empty() {
            return bare();
        }
        let inner_start = open + OPEN_PAREN.len_utf8();
        let inner_end = trimmed.len() - CLOSE_PAREN.len_utf8();
        if inner_end < inner_start {
            return bare();
        }

        let variant_clauses = trimmed[inner_start..inner_end]
            .split(|c: char| c == '、' || c == ',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        CharacterHeader {
            base_character: base.to_string(),
            variant_clauses,
        }
    }

    /// Decode every clause, dropping malformed ones.
    pub fn variants(&self) -> Vec<VariantEntry> {
        self.variant_clauses
            .iter()
            .filter_map(|c| parse_clause(c))
            .collect()
    }
}

/// Parse a header into its base character and decoded variants.
pub fn parse(header: &str) -> (String, Vec<VariantEntry>) {
    let header = CharacterHeader::read(header);
    let variants = header.variants();
    (header.base_character, variants)
}

/// Map a circled number ①..⑳ to 1..20.
pub fn circled_number(c: char) -> Option<u32> {
    let code = c as u32;
    if (0x2460..=0x2473).contains(&code) {
        Some(code - 0x2460 + 1)
    } else {
        None
    }
}

/// Decode one variant clause.
///
/// Markers are stripped in a fixed order: sense numbers, then `△`, then
/// the `**`/`*` kind prefix. Returns `None` when no glyph remains.
pub fn parse_clause(clause: &str) -> Option<VariantEntry> {
    let clause = clause.trim();

    let markers: Vec<char> = clause
        .chars()
        .take_while(|&c| circled_number(c).is_some() || c == RANGE_DASH)
        .collect();
    let marker_bytes: usize = markers.iter().map(|c| c.len_utf8()).sum();
    let applicable_senses = expand_sense_markers(&markers);

    let mut rest = clause[marker_bytes..].to_string();

    let has_separate_entry = rest.contains(SEPARATE_ENTRY);
    if has_separate_entry {
        rest = rest.replace(SEPARATE_ENTRY, "");
    }

    let (kind, glyph) = if let Some(g) = rest.strip_prefix("**") {
        (VariantKind::ExternalVariant, g)
    } else if let Some(g) = rest.strip_prefix('*') {
        (VariantKind::StandardVariant, g)
    } else {
        (VariantKind::Traditional, rest.as_str())
    };

    let glyph = glyph.trim();
    if glyph.is_empty() {
        return None;
    }

    Some(VariantEntry {
        character: glyph.to_string(),
        kind,
        has_separate_entry,
        applicable_senses,
    })
}

/// Expand a run of circled numbers and `A—B` ranges into sense indices.
///
/// Reversed ranges expand to nothing; they are not otherwise validated.
fn expand_sense_markers(markers: &[char]) -> BTreeSet<u32> {
    let mut senses = BTreeSet::new();
    let mut i = 0;
    while i < markers.len() {
        let Some(start) = circled_number(markers[i]) else {
            i += 1;
            continue;
        };
        let range_end = markers
            .get(i + 1)
            .filter(|&&c| c == RANGE_DASH)
            .and_then(|_| markers.get(i + 2))
            .and_then(|&c| circled_number(c));
        match range_end {
            Some(end) => {
                senses.extend(start..=end);
                i += 3;
            }
            None => {
                senses.insert(start);
                i += 1;
            }
        }
    }
    senses
}

/// Variant glyphs applicable to a sense, deduplicated in header order.
pub fn variants_for_sense(variants: &[VariantEntry], sense_index: u32) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in variants.iter().filter(|v| v.applies_to(sense_index)) {
        if !out.contains(&v.character) {
            out.push(v.character.clone());
        }
    }
    out
}

/// Display form of a headword with its variants, e.g. `干（乾、乹）`.
pub fn display_character(base: &str, variants: &[String]) -> String {
    if variants.is_empty() {
        base.to_string()
    } else {
        format!("{}{}{}{}", base, OPEN_PAREN, variants.join("、"), CLOSE_PAREN)
    }
}

/// Per-header variant summary grouped by kind and by sense.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariantBreakdown {
    pub header: String,
    pub simplified: String,
    pub traditional: Vec<String>,
    pub variant_standard: Vec<String>,
    pub variant_external: Vec<String>,
    pub has_separate_entry: Vec<String>,
    /// Sense index -> variants restricted to that sense
    pub sense_specific: BTreeMap<u32, Vec<VariantEntry>>,
}

impl VariantBreakdown {
    pub fn from_header(raw: &str) -> Self {
        let header = CharacterHeader::read(raw);
        let mut breakdown = VariantBreakdown {
            header: raw.trim().to_string(),
            simplified: header.base_character.clone(),
            ..Default::default()
        };

        for variant in header.variants() {
            let bucket = match variant.kind {
                VariantKind::Traditional => &mut breakdown.traditional,
                VariantKind::StandardVariant => &mut breakdown.variant_standard,
                VariantKind::ExternalVariant => &mut breakdown.variant_external,
            };
            push_unique(bucket, &variant.character);
            if variant.has_separate_entry {
                push_unique(&mut breakdown.has_separate_entry, &variant.character);
            }
            for &sense in &variant.applicable_senses {
                breakdown
                    .sense_specific
                    .entry(sense)
                    .or_default()
                    .push(variant.clone());
            }
        }
        breakdown
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_groups_by_kind_and_sense() {
        let b = VariantBreakdown::from_header("干（⑦—⑧△乾、⑦*乹、**亁）");
        assert_eq!(b.simplified, "干");
        assert_eq!(b.traditional, vec!["乾"]);
        assert_eq!(b.variant_standard, vec!["乹"]);
        assert_eq!(b.variant_external, vec!["亁"]);
        assert_eq!(b.has_separate_entry, vec!["乾"]);
        assert_eq!(b.sense_specific[&7].len(), 2);
        assert_eq!(b.sense_specific[&8].len(), 1);
        assert!(!b.sense_specific.contains_key(&1));
    }

    #[test]
    fn test_breakdown_bare_header() {
        let b = VariantBreakdown::from_header("水");
        assert_eq!(b.simplified, "水");
        assert!(b.traditional.is_empty());
        assert!(b.sense_specific.is_empty());
    }

    #[test]
    fn test_parse_sense_range_header() {
        let (base, variants) = parse("干（⑦—⑬△乾、⑦—⑬*乹）");
        assert_eq!(base, "干");
        assert_eq!(variants.len(), 2);

        let senses: BTreeSet<u32> = (7..=13).collect();
        assert_eq!(variants[0].character, "乾");
        assert_eq!(variants[0].kind, VariantKind::Traditional);
        assert!(variants[0].has_separate_entry);
        assert_eq!(variants[0].applicable_senses, senses);

        assert_eq!(variants[1].character, "乹");
        assert_eq!(variants[1].kind, VariantKind::StandardVariant);
        assert!(!variants[1].has_separate_entry);
        assert_eq!(variants[1].applicable_senses, senses);
    }

    #[test]
    fn test_parse_variant_kinds() {
        let (base, variants) = parse("飙（飆、**飇、*飈）");
        assert_eq!(base, "飙");
        let kinds: Vec<VariantKind> = variants.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                VariantKind::Traditional,
                VariantKind::ExternalVariant,
                VariantKind::StandardVariant,
            ]
        );
        assert!(variants.iter().all(|v| v.applicable_senses.is_empty()));
    }

    #[test]
    fn test_parse_separate_entry_before_kind() {
        let (_, variants) = parse("鞍（△*鞌）");
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].character, "鞌");
        assert_eq!(variants[0].kind, VariantKind::StandardVariant);
        assert!(variants[0].has_separate_entry);
    }

    #[test]
    fn test_parse_individual_sense_numbers() {
        let (_, variants) = parse("坝（③垻、壩）");
        assert_eq!(variants[0].character, "垻");
        assert_eq!(variants[0].applicable_senses, BTreeSet::from([3]));
        assert!(variants[1].applicable_senses.is_empty());

        let (_, variants) = parse("台（①②⑤臺）");
        assert_eq!(variants[0].applicable_senses, BTreeSet::from([1, 2, 5]));
    }

    #[test]
    fn test_parse_mixed_run_and_range() {
        let (_, variants) = parse("x（①③—⑤y）");
        assert_eq!(variants[0].applicable_senses, BTreeSet::from([1, 3, 4, 5]));
    }

    #[test]
    fn test_parse_ascii_comma_separator() {
        let (_, variants) = parse("锕（錒,*鎶）");
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[1].character, "鎶");
    }

    #[test]
    fn test_parse_bare_character() {
        let (base, variants) = parse("爱");
        assert_eq!(base, "爱");
        assert!(variants.is_empty());
    }

    #[test]
    fn test_parse_malformed_header_is_bare() {
        let (base, variants) = parse("干（乾");
        assert_eq!(base, "干（乾");
        assert!(variants.is_empty());

        let (base, variants) = parse("（乾）");
        assert_eq!(base, "（乾）");
        assert!(variants.is_empty());
    }

    #[test]
    fn test_parse_discards_empty_clauses() {
        let (_, variants) = parse("干（⑦—⑬△、**、乾）");
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].character, "乾");
    }

    #[test]
    fn test_reversed_range_passes_through() {
        let clause = parse_clause("⑤—①臺").unwrap();
        assert_eq!(clause.character, "臺");
        assert!(clause.applicable_senses.is_empty());
    }

    #[test]
    fn test_circled_number_bounds() {
        assert_eq!(circled_number('①'), Some(1));
        assert_eq!(circled_number('⑳'), Some(20));
        assert_eq!(circled_number('❶'), None);
        assert_eq!(circled_number('1'), None);
    }

    #[test]
    fn test_header_keeps_clause_tokens() {
        let header = CharacterHeader::read(" 干（⑦—⑬△乾、⑦—⑬*乹） ");
        assert_eq!(header.base_character, "干");
        assert_eq!(header.variant_clauses, vec!["⑦—⑬△乾", "⑦—⑬*乹"]);
    }

    #[test]
    fn test_variants_for_sense_and_display() {
        let (base, variants) = parse("干（⑦—⑬△乾、⑦—⑬*乹）");
        assert!(variants_for_sense(&variants, 1).is_empty());
        let for_seven = variants_for_sense(&variants, 7);
        assert_eq!(for_seven, vec!["乾", "乹"]);
        assert_eq!(display_character(&base, &for_seven), "干（乾、乹）");
        assert_eq!(display_character(&base, &[]), "干");
    }

    #[test]
    fn test_variants_for_sense_dedup() {
        let (_, variants) = parse("台（①臺、②臺、颱）");
        assert_eq!(variants_for_sense(&variants, 1), vec!["臺", "颱"]);
    }
}
