//! Cantonese annotation of loanword pronunciation guides.
//!
//! Two-character transliterations carry a partial pinyin guide on one side:
//! `［舴艋］（–měng）`. The dashed side names the character that needs the
//! reading, and its Jyutping is appended: `［舴艋］（–měng/-maang5）`.

use crate::segment::ReadingSegmenter;

const WORD_OPEN: char = '［';
const WORD_CLOSE: char = '］';
const GUIDE_OPEN: char = '（';
const GUIDE_CLOSE: char = '）';
const ANNOTATED: &str = "/-";

/// Append Jyutping to every `［word］（guide）` pair that can be resolved.
pub fn enrich_with_jyutping(text: &str, segmenter: &dyn ReadingSegmenter) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find(WORD_OPEN) {
        let word_start = open + WORD_OPEN.len_utf8();
        let Some(word_len) = rest[word_start..].find(WORD_CLOSE) else {
            break;
        };
        let word = &rest[word_start..word_start + word_len];
        let after_word = word_start + word_len + WORD_CLOSE.len_utf8();

        let Some(guide_body) = rest[after_word..].strip_prefix(GUIDE_OPEN) else {
            out.push_str(&rest[..after_word]);
            rest = &rest[after_word..];
            continue;
        };
        let Some(guide_len) = guide_body.find(GUIDE_CLOSE) else {
            break;
        };
        let guide = &guide_body[..guide_len];

        out.push_str(&rest[..open]);
        match annotate(word, guide, segmenter) {
            Some(annotated) => out.push_str(&annotated),
            None => {
                out.push(WORD_OPEN);
                out.push_str(word);
                out.push(WORD_CLOSE);
                out.push(GUIDE_OPEN);
                out.push_str(guide);
                out.push(GUIDE_CLOSE);
            }
        }
        rest = &guide_body[guide_len + GUIDE_CLOSE.len_utf8()..];
    }

    out.push_str(rest);
    out
}

fn annotate(word: &str, guide: &str, segmenter: &dyn ReadingSegmenter) -> Option<String> {
    if guide.contains(ANNOTATED) {
        return None;
    }
    let dash = if guide.contains('–') {
        '–'
    } else if guide.contains('-') {
        '-'
    } else {
        return None;
    };

    let chars: Vec<char> = word.chars().collect();
    if chars.len() != 2 {
        return None;
    }

    if let Some(pinyin) = guide.strip_prefix(dash) {
        let jyutping = segmenter.reading_of(word, chars[1])?;
        Some(format!("［{}］（{}{}{}{}）", word, dash, pinyin.trim(), ANNOTATED, jyutping))
    } else if let Some(pinyin) = guide.strip_suffix(dash) {
        let jyutping = segmenter.reading_of(word, chars[0])?;
        Some(format!("［{}］（{}{}{}{}）", word, pinyin.trim(), ANNOTATED, jyutping, dash))
    } else {
        None
    }
}
