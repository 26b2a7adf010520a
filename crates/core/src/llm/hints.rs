//! Example-word generation for senses that have none.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use serde_json::Value;

use super::batch::{run_batches, BatchConfig, BatchReport};
use super::{ChatBackend, LlmError};
use crate::cache::JsonCache;
use crate::entry::variants::CharacterHeader;
use crate::fusion::HintRequest;

const SYSTEM_PROMPT: &str =
    "You are a Chinese language dictionary assistant. Output valid JSON only.";

const INSTRUCTIONS: &str = "\
Generate concise Chinese example words or short phrases for each character \
below, matching the given definition. None of these entries has examples yet.
Format each value as \"Example1 / Example2\" with at most three examples.
Write the character itself as '～' inside its examples: for '爱', '爱情' becomes '～情'.
Return only a JSON object mapping each 'id' to its hint string.

Entries:
";

pub fn build_prompt(items: &[HintRequest]) -> Result<String, LlmError> {
    Ok(format!("{}{}", INSTRUCTIONS, serde_json::to_string(items)?))
}

/// Request hints for one batch and enforce the `～` placeholder.
pub fn generate_batch(
    backend: &dyn ChatBackend,
    items: &[HintRequest],
) -> Result<BTreeMap<String, Value>, LlmError> {
    let results = backend.complete_json(SYSTEM_PROMPT, &build_prompt(items)?)?;
    let bases: HashMap<&str, String> = items
        .iter()
        .map(|item| {
            let base = CharacterHeader::read(&item.character).base_character;
            (item.id.as_str(), base)
        })
        .collect();

    Ok(results
        .into_iter()
        .map(|(id, value)| {
            let value = match (value, bases.get(id.as_str())) {
                (Value::String(hint), Some(base)) if !base.is_empty() => {
                    Value::String(hint.replace(base.as_str(), "～"))
                }
                (other, _) => other,
            };
            (id, value)
        })
        .collect())
}

/// Generate hints for every request, merging results into `cache`.
pub fn generate_hints(
    backend: &dyn ChatBackend,
    items: &[HintRequest],
    config: BatchConfig,
    cache: &Mutex<JsonCache>,
) -> BatchReport {
    log::info!("Generating hints for {} senses", items.len());
    run_batches(items, config, cache, |batch, _| generate_batch(backend, batch))
}
