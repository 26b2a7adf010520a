//! Per-sense fusion of every auxiliary source into a [`FusedRecord`].

use std::collections::BTreeSet;

use super::planner::{HintRequest, JyutpingRequest, PlannedSense};
use super::proxy::ProxyIndex;
use crate::cache::FusionCaches;
use crate::entry::enrich::enrich_with_jyutping;
use crate::entry::senses::{bracketed_words, strip_see_also_tail};
use crate::entry::variants::display_character;
use crate::matching::matcher::cantonese_candidates;
use crate::matching::{best_cantonese, best_english, best_middle_chinese, READING_SEPARATOR};
use crate::pinyin::strip_parenthesized;
use crate::segment::ReadingSegmenter;
use crate::sources::Sources;
use crate::types::{FusedRecord, ReadingSource};

const HINT_FIELDS: &[&str] = &["hint", "hints"];
const ENGLISH_FIELDS: &[&str] = &["eng", "english"];
const JYUTPING_FIELDS: &[&str] = &["jyutping", "jp"];

/// Read-only view over sources, caches and the segmenter for one run.
pub struct FusionContext<'a> {
    sources: &'a Sources,
    caches: &'a FusionCaches,
    segmenter: &'a dyn ReadingSegmenter,
}

impl<'a> FusionContext<'a> {
    pub fn new(
        sources: &'a Sources,
        caches: &'a FusionCaches,
        segmenter: &'a dyn ReadingSegmenter,
    ) -> Self {
        FusionContext {
            sources,
            caches,
            segmenter,
        }
    }

    /// Fuse every planned sense and attach pronunciation proxies.
    pub fn fuse_all(&self, plan: &[PlannedSense]) -> Vec<FusedRecord> {
        let pinyin_index = ProxyIndex::from_pinyin(plan);
        let jyutping_index = ProxyIndex::from_jyutping(&self.sources.readings);

        let records: Vec<FusedRecord> = plan
            .iter()
            .map(|planned| {
                let mut record = self.fuse_sense(planned);
                record.pinyin_proxy = pinyin_index.pick(&record.pinyin, &self.sources.frequency);
                let first_jyutping = record.jyutping.split(READING_SEPARATOR).next();
                record.jyutping_proxy = jyutping_index
                    .pick(first_jyutping.unwrap_or_default(), &self.sources.frequency);
                record
            })
            .collect();

        let missing_english = records.iter().filter(|r| r.english.is_empty()).count();
        let missing_jyutping = records.iter().filter(|r| r.jyutping.is_empty()).count();
        log::info!(
            "Fused {} records ({} without English, {} without Jyutping)",
            records.len(),
            missing_english,
            missing_jyutping
        );
        records
    }

    /// Fuse one sense. Proxies are left blank.
    pub fn fuse_sense(&self, planned: &PlannedSense) -> FusedRecord {
        let definition = enrich_with_jyutping(&planned.sense.text, self.segmenter);
        let hint = self.resolve_hint(planned, &definition);
        let english = self.resolve_english(planned);
        let jyutping = self.resolve_jyutping(planned, &hint);
        let (middle_chinese, middle_chinese_source) =
            self.resolve_middle_chinese(planned, &english);

        FusedRecord {
            id: planned.id.clone(),
            base_character: planned.base_character.clone(),
            sense_index: planned.sense.index,
            display_character: display_character(
                &planned.base_character,
                &planned.variants_for_sense,
            ),
            variants_for_sense: planned.variants_for_sense.clone(),
            definition,
            hint,
            pinyin: planned.pinyin.clone(),
            jyutping,
            middle_chinese,
            middle_chinese_source,
            english,
            hangul: self.resolve_hangul(planned),
            pinyin_proxy: String::new(),
            jyutping_proxy: String::new(),
            frequency_rank: self.sources.frequency.rank_text(&planned.base_character),
            level: planned.level.clone(),
            page: planned.page.clone(),
        }
    }

    /// Sense hints plus bracketed words, or a cached generated hint.
    pub fn resolve_hint(&self, planned: &PlannedSense, definition: &str) -> String {
        let hints: Vec<String> = planned
            .sense
            .hints
            .iter()
            .map(|h| enrich_with_jyutping(h, self.segmenter))
            .chain(bracketed_words(definition))
            .map(|h| strip_see_also_tail(&h))
            .filter(|h| !h.is_empty())
            .collect();

        if hints.is_empty() {
            self.caches
                .hints
                .get_text(&planned.id, HINT_FIELDS)
                .map(|h| strip_see_also_tail(&h))
                .unwrap_or_default()
        } else {
            hints.join(" / ")
        }
    }

    /// Cached translation if present, otherwise the best dictionary gloss.
    pub fn resolve_english(&self, planned: &PlannedSense) -> String {
        if self.caches.translations.contains(&planned.id) {
            return self
                .caches
                .translations
                .get_text(&planned.id, ENGLISH_FIELDS)
                .unwrap_or_default();
        }
        best_english(
            &self.sources.cedict,
            &planned.base_character,
            &planned.sense.text,
            &planned.pinyin,
        )
    }

    /// Cantonese reading: cache, then hint context, then the character
    /// database, then the segmenter on the bare character.
    pub fn resolve_jyutping(&self, planned: &PlannedSense, hint: &str) -> String {
        if let Some(cached) = self.cached_jyutping(&planned.id) {
            return cached;
        }
        if let Some(reading) = self.reading_from_hints(planned, hint) {
            return reading;
        }
        let from_database =
            best_cantonese(&self.sources.readings, &planned.candidates, &planned.pinyin);
        if !from_database.is_empty() {
            return from_database;
        }
        planned
            .base_character
            .chars()
            .next()
            .and_then(|c| self.segmenter.reading_of(&planned.base_character, c))
            .unwrap_or_default()
    }

    fn cached_jyutping(&self, id: &str) -> Option<String> {
        let cached = self.caches.jyutping.get_text(id, JYUTPING_FIELDS)?;
        let first = cached.split(',').next().unwrap_or_default().trim();
        (!first.is_empty()).then(|| first.to_string())
    }

    /// Reading of the headword inside one of its example words.
    ///
    /// A polyphone only counts when a dictionary word covered it; a bare
    /// per-character reading says nothing about usage.
    fn reading_from_hints(&self, planned: &PlannedSense, hint: &str) -> Option<String> {
        let target = planned.base_character.chars().next()?;
        let monophonic = self
            .sources
            .readings
            .get(&planned.base_character)
            .map(|r| r.cantonese.len() <= 1)
            .unwrap_or(true);
        hint.split(READING_SEPARATOR)
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .find_map(|h| {
                let word = strip_parenthesized(&h.replace('～', &planned.base_character));
                if monophonic {
                    self.segmenter.reading_of(word.trim(), target)
                } else {
                    self.segmenter.word_reading_of(word.trim(), target)
                }
            })
    }

    /// Curated reconstruction first, `kTang` only when it yields nothing.
    pub fn resolve_middle_chinese(
        &self,
        planned: &PlannedSense,
        english: &str,
    ) -> (String, Option<ReadingSource>) {
        let curated = best_middle_chinese(
            &self.sources.reconstructions,
            &planned.candidates,
            &planned.pinyin,
            english,
        );
        if !curated.is_empty() {
            return (curated, Some(ReadingSource::BaxterSagart));
        }
        let tang: BTreeSet<&str> = planned
            .candidates
            .iter()
            .filter_map(|c| self.sources.readings.get(c))
            .filter_map(|r| r.tang.as_deref())
            .filter(|t| !t.is_empty())
            .collect();
        if tang.is_empty() {
            return (String::new(), None);
        }
        let joined = tang.into_iter().collect::<Vec<_>>().join(READING_SEPARATOR);
        (joined, Some(ReadingSource::Unihan))
    }

    fn resolve_hangul(&self, planned: &PlannedSense) -> String {
        let syllables: BTreeSet<&str> = planned
            .candidates
            .iter()
            .filter_map(|c| self.sources.readings.get(c))
            .filter_map(|r| r.hangul.as_deref())
            .flat_map(|h| h.split(READING_SEPARATOR))
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .collect();
        syllables.into_iter().collect::<Vec<_>>().join(READING_SEPARATOR)
    }

    /// Senses with neither example words nor a cached hint.
    pub fn missing_hint_requests(&self, plan: &[PlannedSense]) -> Vec<HintRequest> {
        plan.iter()
            .filter(|p| p.sense.hints.is_empty() && !self.caches.hints.contains(&p.id))
            .map(|p| HintRequest {
                id: p.id.clone(),
                character: p.base_character.clone(),
                definition: p.sense.text.clone(),
            })
            .collect()
    }

    /// Senses whose Cantonese reading is still a tie after every local
    /// source has been consulted.
    pub fn ambiguous_jyutping_requests(&self, plan: &[PlannedSense]) -> Vec<JyutpingRequest> {
        plan.iter()
            .filter(|p| self.cached_jyutping(&p.id).is_none())
            .filter_map(|p| {
                let definition = enrich_with_jyutping(&p.sense.text, self.segmenter);
                let hint = self.resolve_hint(p, &definition);
                if self.reading_from_hints(p, &hint).is_some() {
                    return None;
                }
                let candidates = cantonese_candidates(&self.sources.readings, &p.candidates);
                if candidates.len() < 2 {
                    return None;
                }
                let chosen = best_cantonese(&self.sources.readings, &p.candidates, &p.pinyin);
                if !chosen.contains(READING_SEPARATOR) {
                    return None;
                }
                Some(JyutpingRequest {
                    id: p.id.clone(),
                    character: p.base_character.clone(),
                    pinyin: p.pinyin.clone(),
                    definition: p.sense.text.clone(),
                    hints: hint,
                    candidates,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::JsonCache;
    use crate::fusion::planner::plan;
    use crate::segment::DictSegmenter;
    use crate::sources::{
        Cedict, DictionaryRow, FrequencyTable, PinyinCorrections, ReadingDatabase,
        ReconstructionTable,
    };
    use serde_json::json;

    fn sources() -> Sources {
        Sources {
            cedict: Cedict::parse_str(
                "\
干 干 [gan1] /shield/to offend/
乾 干 [gan1] /dry/clean/
幹 干 [gan4] /tree trunk/to do/
盾牌 盾牌 [dun4 pai2] /shield/
长 长 [chang2] /long/length/
长 长 [zhang3] /to grow/chief/
生长 生长 [sheng1 zhang3] /to grow/
",
            ),
            reconstructions: ReconstructionTable::from_reader(
                "zi,py,MC,gloss\n干,gān,kan,shield\n乾,gān,kan,dry\n".as_bytes(),
            )
            .unwrap(),
            readings: ReadingDatabase::parse_str(
                "U+5E72\tkCantonese\tgon1\n\
                 U+5E72\tkHangul\t간:0N\n\
                 U+4E7E\tkCantonese\tgon1 kin4\n\
                 U+4E7E\tkHangul\t건:0N 간:0N\n\
                 U+957F\tkCantonese\tcoeng4 zoeng2\n\
                 U+957F\tkTang\tdrjang\n",
            ),
            frequency: FrequencyTable::from_reader("3,长,100,1\n9,干,50,2\n".as_bytes()).unwrap(),
            corrections: PinyinCorrections::default(),
        }
    }

    fn rows() -> Vec<DictionaryRow> {
        let row = |header: &str, pinyin: &str, definition: &str| DictionaryRow {
            header: header.into(),
            page: "1".into(),
            column: "a".into(),
            pinyin: pinyin.into(),
            level: "一级".into(),
            strokes: "3".into(),
            definition: definition.into(),
        };
        vec![
            row("干（②△乾）", "gān", "❶盾牌：～戈❷没有水分"),
            row("长", "zhǎng", "❶生长"),
        ]
    }

    fn segmenter(sources: &Sources) -> DictSegmenter {
        let mut seg = DictSegmenter::from_reading_database(&sources.readings);
        seg.insert_word("干戈", "gon1 gwo1");
        seg
    }

    #[test]
    fn test_fuse_basic_record() {
        let sources = sources();
        let caches = FusionCaches::default();
        let seg = segmenter(&sources);
        let ctx = FusionContext::new(&sources, &caches, &seg);
        let records = ctx.fuse_all(&plan(&rows(), &sources.corrections));

        assert_eq!(records.len(), 3);
        let shield = &records[0];
        assert_eq!(shield.id, "干_②△乾_1");
        assert_eq!(shield.display_character, "干");
        assert_eq!(shield.hint, "～戈");
        assert_eq!(shield.english, "shield; to offend");
        assert_eq!(shield.jyutping, "gon1");
        assert_eq!(shield.middle_chinese_display(), "kan (BS)");
        assert_eq!(shield.hangul, "간");
        assert_eq!(shield.frequency_rank, "9");
        assert_eq!(shield.pinyin_proxy, "干");
    }

    #[test]
    fn test_variant_sense_uses_candidate_set() {
        let sources = sources();
        let caches = FusionCaches::default();
        let seg = segmenter(&sources);
        let ctx = FusionContext::new(&sources, &caches, &seg);
        let records = ctx.fuse_all(&plan(&rows(), &sources.corrections));

        let dry = &records[1];
        assert_eq!(dry.display_character, "干（乾）");
        assert_eq!(dry.variants_for_sense, vec!["乾"]);
        assert_eq!(dry.hangul, "간 / 건");
        assert_eq!(dry.jyutping, "gon1 / kin4");
    }

    #[test]
    fn test_unihan_middle_chinese_fallback() {
        let sources = sources();
        let caches = FusionCaches::default();
        let seg = segmenter(&sources);
        let ctx = FusionContext::new(&sources, &caches, &seg);
        let records = ctx.fuse_all(&plan(&rows(), &sources.corrections));

        let grow = &records[2];
        assert_eq!(grow.english, "to grow; chief");
        assert_eq!(grow.middle_chinese_display(), "drjang (Unihan)");
        assert_eq!(grow.jyutping, "coeng4 / zoeng2");
        assert_eq!(grow.jyutping_proxy, "长");
    }

    fn single_row(header: &str, pinyin: &str, definition: &str) -> Vec<DictionaryRow> {
        vec![DictionaryRow {
            header: header.into(),
            pinyin: pinyin.into(),
            definition: definition.into(),
            ..Default::default()
        }]
    }

    #[test]
    fn test_hint_does_not_pick_polyphone_without_word() {
        let mut sources = Sources::default();
        sources.readings = ReadingDatabase::parse_str(
            "U+957F\tkCantonese\tcoeng4 zoeng2\n\
             U+957F\tkSMSZD2003Readings\tcháng粵coeng4 zhǎng粵zoeng2\n",
        );
        let caches = FusionCaches::default();
        let planned = plan(&single_row("长", "zhǎng", "❶生长：～大"), &sources.corrections);
        assert_eq!(planned[0].sense.hints, vec!["～大"]);

        let seg = DictSegmenter::from_reading_database(&sources.readings);
        let ctx = FusionContext::new(&sources, &caches, &seg);
        assert_eq!(ctx.fuse_sense(&planned[0]).jyutping, "zoeng2");

        let mut seg = DictSegmenter::from_reading_database(&sources.readings);
        seg.insert_word("长大", "zoeng2 daai6");
        let ctx = FusionContext::new(&sources, &caches, &seg);
        assert_eq!(ctx.fuse_sense(&planned[0]).jyutping, "zoeng2");
    }

    #[test]
    fn test_hinted_polyphone_still_requested() {
        let mut sources = Sources::default();
        sources.readings = ReadingDatabase::parse_str("U+957F\tkCantonese\tcoeng4 zoeng2\n");
        let caches = FusionCaches::default();
        let planned = plan(&single_row("长", "zhǎng", "❶生长：～大"), &sources.corrections);
        let seg = DictSegmenter::from_reading_database(&sources.readings);
        let ctx = FusionContext::new(&sources, &caches, &seg);

        assert_eq!(ctx.fuse_sense(&planned[0]).jyutping, "coeng4 / zoeng2");
        let requests = ctx.ambiguous_jyutping_requests(&planned);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].hints, "～大");
    }

    #[test]
    fn test_unihan_middle_chinese_joins_all_candidates() {
        let mut sources = Sources::default();
        sources.readings = ReadingDatabase::parse_str(
            "U+5E72\tkTang\tkɑn\n\
             U+4E7E\tkTang\tgiæn\n",
        );
        let caches = FusionCaches::default();
        let planned = plan(&single_row("干（△乾）", "gān", "❶没有水分"), &sources.corrections);
        assert_eq!(planned[0].candidates, vec!["干", "乾"]);

        let seg = DictSegmenter::new();
        let ctx = FusionContext::new(&sources, &caches, &seg);
        let record = ctx.fuse_sense(&planned[0]);
        assert_eq!(record.middle_chinese, "giæn / kɑn");
        assert_eq!(record.middle_chinese_display(), "giæn / kɑn (Unihan)");
    }

    #[test]
    fn test_caches_override() {
        let sources = sources();
        let mut caches = FusionCaches::default();
        caches.translations = JsonCache::new("t.json");
        caches.translations.insert("长_1", json!({"eng": "to grow up"}));
        caches.jyutping.insert("长_1", json!("zoeng2, coeng4"));
        caches.hints.insert("干_②△乾_2", json!({"hints": "～燥"}));
        let seg = segmenter(&sources);
        let ctx = FusionContext::new(&sources, &caches, &seg);
        let records = ctx.fuse_all(&plan(&rows(), &sources.corrections));

        assert_eq!(records[2].english, "to grow up");
        assert_eq!(records[2].jyutping, "zoeng2");
        assert_eq!(records[1].hint, "～燥");
    }

    #[test]
    fn test_planning_passes() {
        let sources = sources();
        let mut caches = FusionCaches::default();
        let seg = segmenter(&sources);
        let planned = plan(&rows(), &sources.corrections);

        {
            let ctx = FusionContext::new(&sources, &caches, &seg);
            let hints = ctx.missing_hint_requests(&planned);
            let ids: Vec<&str> = hints.iter().map(|h| h.id.as_str()).collect();
            assert_eq!(ids, vec!["干_②△乾_2", "长_1"]);
            assert_eq!(hints[0].character, "干");

            let jp = ctx.ambiguous_jyutping_requests(&planned);
            let ids: Vec<&str> = jp.iter().map(|j| j.id.as_str()).collect();
            assert_eq!(ids, vec!["干_②△乾_2", "长_1"]);
            assert_eq!(jp[1].candidates, vec!["coeng4", "zoeng2"]);
        }

        caches.jyutping.insert("长_1", json!("zoeng2"));
        let ctx = FusionContext::new(&sources, &caches, &seg);
        assert_eq!(ctx.ambiguous_jyutping_requests(&planned).len(), 1);
    }

    #[test]
    fn test_fusion_is_deterministic() {
        let sources = sources();
        let mut caches = FusionCaches::default();
        caches.hints.insert("长_1", json!("～大"));
        let seg = segmenter(&sources);
        let ctx = FusionContext::new(&sources, &caches, &seg);
        let planned = plan(&rows(), &sources.corrections);
        assert_eq!(ctx.fuse_all(&planned), ctx.fuse_all(&planned));
    }
}
