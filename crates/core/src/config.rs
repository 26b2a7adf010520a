//! Runtime configuration: source file locations and LLM settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Locations of every input file. Defaults match the names the sources are
/// distributed under.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePaths {
    pub dictionary: PathBuf,
    pub cedict: PathBuf,
    pub frequency: PathBuf,
    pub baxter: PathBuf,
    pub unihan: PathBuf,
    pub corrections: PathBuf,
    /// CC-Canto style word list for the reading segmenter
    pub cantonese_words: Option<PathBuf>,
}

impl SourcePaths {
    pub fn in_dir(dir: &Path) -> Self {
        SourcePaths {
            dictionary: dir.join("xhzd_corrected.csv"),
            cedict: dir.join("cedict_ts.u8"),
            frequency: dir.join("CharFreq-Combined.csv"),
            baxter: dir.join("BaxterSagartOC2015-10-13.csv"),
            unihan: dir.join("Unihan_Readings.txt"),
            corrections: dir.join("pinyin_suggestions.txt"),
            cantonese_words: None,
        }
    }
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self::in_dir(Path::new("."))
    }
}

/// Settings for the chat-completion backend and its batch pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub batch_size: usize,
    pub max_workers: usize,
    pub timeout_secs: u64,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "deepseek/deepseek-v3.2".to_string(),
            batch_size: 20,
            max_workers: 20,
            timeout_secs: 60,
            api_key: None,
        }
    }
}

impl LlmConfig {
    /// Defaults with the API key taken from the environment.
    pub fn from_env() -> Self {
        LlmConfig {
            api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()),
            ..Default::default()
        }
    }

    /// Read overrides from a JSON file; the API key still comes from the
    /// environment when the file omits it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read LLM config: {}", path.display()))?;
        let mut config: LlmConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse LLM config: {}", path.display()))?;
        if config.api_key.is_none() {
            config.api_key = Self::from_env().api_key;
        }
        Ok(config)
    }
}
