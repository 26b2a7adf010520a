//! File-backed JSON caches for LLM-derived card data.
//!
//! Each cache is a single JSON object keyed by card id. Values are either
//! plain strings or objects carrying the string under a known field.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

pub const HINT_CACHE_FILE: &str = "hint_cache.json";
pub const TRANSLATION_CACHE_FILE: &str = "translation_cache.json";
pub const JYUTPING_CACHE_FILE: &str = "jp_cache.json";

/// Get the cache directory.
///
/// Uses `HANZI_CARDS_CACHE_DIR` env var if set, otherwise `~/.cache/hanzi-cards`.
pub fn cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HANZI_CARDS_CACHE_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".cache").join("hanzi-cards")
}

/// Atomically write data to a file via temp file + rename.
fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = target.with_extension("tmp");
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, target)?;
    Ok(())
}

/// An id -> value map persisted as one JSON file.
#[derive(Debug, Clone, Default)]
pub struct JsonCache {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonCache {
    /// An empty cache that will persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonCache {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load a cache, starting empty if the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(Some(entries)) => {
                log::info!("Loaded {} cached entries from {}", entries.len(), path.display());
                entries
            }
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                log::warn!("Ignoring unreadable cache {}: {:#}", path.display(), e);
                BTreeMap::new()
            }
        };
        JsonCache { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.entries.get(id)
    }

    /// A cached string, either stored directly or under one of `fields`.
    pub fn get_text(&self, id: &str, fields: &[&str]) -> Option<String> {
        match self.entries.get(id)? {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => fields
                .iter()
                .filter_map(|f| map.get(*f))
                .find_map(|v| v.as_str())
                .map(str::to_string),
            _ => None,
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, value: Value) {
        self.entries.insert(id.into(), value);
    }

    /// Merge a batch of results, returning how many entries were written.
    pub fn extend(&mut self, results: BTreeMap<String, Value>) -> usize {
        let count = results.len();
        self.entries.extend(results);
        count
    }

    /// Persist the whole map.
    pub fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        atomic_write(&self.path, json.as_bytes())
            .with_context(|| format!("Failed to write cache: {}", self.path.display()))
    }
}

fn read_entries(path: &Path) -> Result<Option<BTreeMap<String, Value>>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read_to_string(path)?;
    let entries = serde_json::from_str(&data).context("Cache is not a JSON object")?;
    Ok(Some(entries))
}

/// The three caches consulted by the fusion pass.
#[derive(Debug, Clone, Default)]
pub struct FusionCaches {
    pub hints: JsonCache,
    pub translations: JsonCache,
    pub jyutping: JsonCache,
}

impl FusionCaches {
    pub fn open_in(dir: &Path) -> Self {
        FusionCaches {
            hints: JsonCache::open(dir.join(HINT_CACHE_FILE)),
            translations: JsonCache::open(dir.join(TRANSLATION_CACHE_FILE)),
            jyutping: JsonCache::open(dir.join(JYUTPING_CACHE_FILE)),
        }
    }
}
