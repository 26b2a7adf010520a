//! Split a raw definition block into numbered senses.
//!
//! Sense numbers are the negative circled digits ❶..❿ and ⓫..⓴. A sense's
//! first line may carry example words after a full-width colon, separated
//! by `|`.

use crate::types::Sense;

const COLON: char = '：';
const SEE_ALSO: &str = "另见";

/// Map a sense glyph ❶..⓴ to 1..20.
pub fn sense_number(c: char) -> Option<u32> {
    let code = c as u32;
    match code {
        0x2776..=0x277F => Some(code - 0x2776 + 1),
        0x24EB..=0x24F4 => Some(code - 0x24EB + 11),
        _ => None,
    }
}

/// In-progress sense while scanning lines.
struct Accumulator {
    definition: String,
    hints: Vec<String>,
}

impl Accumulator {
    fn start(line: &str) -> Self {
        if let Some((left, right)) = line.split_once(COLON) {
            if left.matches('（').count() == left.matches('）').count() {
                let hints = right
                    .replace('。', "")
                    .split('|')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(str::to_string)
                    .collect();
                return Accumulator {
                    definition: strip_quotes(left),
                    hints,
                };
            }
        }
        Accumulator {
            definition: strip_quotes(line),
            hints: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.definition.is_empty() && self.hints.is_empty()
    }
}

fn strip_quotes(text: &str) -> String {
    text.replace('"', "").trim().to_string()
}

/// Strip a leading sense glyph or digit run (plus optional `.`).
fn strip_sense_marker(line: &str) -> Option<&str> {
    let first = line.chars().next()?;
    let rest = if sense_number(first).is_some() {
        &line[first.len_utf8()..]
    } else if first.is_ascii_digit() {
        line.trim_start_matches(|c: char| c.is_ascii_digit())
    } else {
        return None;
    };
    let rest = rest.strip_prefix('.').unwrap_or(rest);
    Some(rest.trim_start())
}

/// Segment a definition block into senses.
///
/// A bracketed line (`［…］` compound entries, cross references) is dropped
/// unless it is the first content of the block, so an entry never ends up
/// without a sense.
pub fn split(block: &str) -> Vec<Sense> {
    let mut spaced = String::with_capacity(block.len() + 16);
    for c in block.chars() {
        if sense_number(c).is_some() {
            spaced.push('\n');
        }
        spaced.push(c);
    }

    let mut finished: Vec<Accumulator> = Vec::new();
    let mut current: Option<Accumulator> = None;

    for line in spaced.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let started = !finished.is_empty() || current.is_some();

        if started && (line.starts_with('［') || line.starts_with('[')) {
            continue;
        }

        let marker = strip_sense_marker(line);
        if marker.is_some() || !started {
            if let Some(acc) = current.take() {
                if !acc.is_empty() {
                    finished.push(acc);
                }
            }
            current = Some(Accumulator::start(marker.unwrap_or(line)));
        } else if let Some(acc) = current.as_mut() {
            acc.definition.push(' ');
            acc.definition.push_str(line);
        }
    }
    if let Some(acc) = current.take() {
        if !acc.is_empty() {
            finished.push(acc);
        }
    }

    finished
        .into_iter()
        .enumerate()
        .map(|(i, acc)| Sense {
            index: i as u32 + 1,
            text: clean_definition(&acc.definition),
            hints: acc.hints,
        })
        .collect()
}

/// Final cleanup of definition prose.
///
/// Drops every `另见…` cross reference up to and including the next `。` or
/// `；`, then any trailing `；`.
pub fn clean_definition(text: &str) -> String {
    strip_see_also(text.trim())
        .trim()
        .trim_end_matches('；')
        .trim()
        .to_string()
}

fn strip_see_also(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(SEE_ALSO) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        rest = match tail.find(|c: char| c == '。' || c == '；') {
            Some(end) => &tail[end + '。'.len_utf8()..],
            None => "",
        };
    }
    out.push_str(rest);
    out
}

/// Drop everything from the first `另见` onwards.
pub fn strip_see_also_tail(text: &str) -> String {
    match text.find(SEE_ALSO) {
        Some(pos) => text[..pos].trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Words enclosed in `［…］` within a definition.
pub fn bracketed_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('［') {
        let after = &rest[open + '［'.len_utf8()..];
        let Some(close) = after.find('］') else {
            break;
        };
        words.push(after[..close].to_string());
        rest = &after[close + '］'.len_utf8()..];
    }
    words
}
