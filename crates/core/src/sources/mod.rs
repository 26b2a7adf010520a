//! Loaders for the auxiliary lexicographic sources.
//!
//! Every auxiliary source is optional: a missing file logs a warning and
//! fusion continues with an empty table.

pub mod baxter;
pub mod cedict;
pub mod corrections;
pub mod dictionary;
pub mod frequency;
pub mod unihan;

use std::path::Path;

use anyhow::Result;

pub use baxter::ReconstructionTable;
pub use cedict::Cedict;
pub use corrections::PinyinCorrections;
pub use dictionary::DictionaryRow;
pub use frequency::FrequencyTable;
pub use unihan::ReadingDatabase;

use crate::config::SourcePaths;

/// All read-only lookup tables consulted during fusion.
#[derive(Debug, Default)]
pub struct Sources {
    pub cedict: Cedict,
    pub reconstructions: ReconstructionTable,
    pub readings: ReadingDatabase,
    pub frequency: FrequencyTable,
    pub corrections: PinyinCorrections,
}

impl Sources {
    pub fn load(paths: &SourcePaths) -> Self {
        Sources {
            cedict: load_optional(&paths.cedict, "CEDICT", Cedict::load),
            reconstructions: load_optional(
                &paths.baxter,
                "Baxter-Sagart table",
                ReconstructionTable::load,
            ),
            readings: load_optional(&paths.unihan, "Unihan readings", ReadingDatabase::load),
            frequency: load_optional(&paths.frequency, "frequency list", FrequencyTable::load),
            corrections: load_optional(
                &paths.corrections,
                "pinyin suggestions",
                PinyinCorrections::load,
            ),
        }
    }
}

fn load_optional<T: Default>(path: &Path, what: &str, load: impl Fn(&Path) -> Result<T>) -> T {
    if !path.exists() {
        log::warn!("{} not found at {}, continuing without it", what, path.display());
        return T::default();
    }
    match load(path) {
        Ok(table) => table,
        Err(e) => {
            log::warn!("Failed to load {}: {:#}", what, e);
            T::default()
        }
    }
}
