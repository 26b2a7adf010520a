//! Context-driven choice between competing Cantonese readings.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::Value;

use super::batch::{run_batches, BatchConfig, BatchReport};
use super::{ChatBackend, LlmError};
use crate::cache::JsonCache;
use crate::fusion::JyutpingRequest;

const SYSTEM_PROMPT: &str = "You are an expert in Cantonese linguistics. \
Choose Jyutping readings from semantic context. Respond with valid JSON only.";

const INSTRUCTIONS: &str = "\
For each Chinese character entry below, choose the one Cantonese Jyutping \
reading that fits its definition and example words.
Polyphonic characters split their readings by meaning: '长' is coeng4 for \
cháng (long) and zoeng2 for zhǎng (grow, elder).
If the 'candidates' list lacks the correct reading, give the correct one anyway.
Return only a JSON object mapping each 'id' to a single Jyutping string such as \"zoeng2\".

Entries:
";

pub fn build_prompt(items: &[JyutpingRequest]) -> Result<String, LlmError> {
    Ok(format!("{}{}", INSTRUCTIONS, serde_json::to_string(items)?))
}

/// Request readings for one batch; non-string answers are dropped.
pub fn disambiguate_batch(
    backend: &dyn ChatBackend,
    items: &[JyutpingRequest],
) -> Result<BTreeMap<String, Value>, LlmError> {
    let results = backend.complete_json(SYSTEM_PROMPT, &build_prompt(items)?)?;
    Ok(results
        .into_iter()
        .filter_map(|(id, value)| {
            let reading = value.as_str()?.trim().to_lowercase();
            if reading.is_empty() {
                log::debug!("Dropping empty Jyutping answer for {}", id);
                return None;
            }
            Some((id, Value::String(reading)))
        })
        .collect())
}

/// Disambiguate every request, merging results into `cache`.
pub fn disambiguate_jyutping(
    backend: &dyn ChatBackend,
    items: &[JyutpingRequest],
    config: BatchConfig,
    cache: &Mutex<JsonCache>,
) -> BatchReport {
    log::info!("Disambiguating Jyutping for {} senses", items.len());
    run_batches(items, config, cache, |batch, _| disambiguate_batch(backend, batch))
}
