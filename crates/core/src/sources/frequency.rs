//! Character frequency list: `rank,character,raw,percentile`.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyInfo {
    pub rank: String,
    pub raw: String,
    pub percentile: String,
}

#[derive(Debug, Default)]
pub struct FrequencyTable {
    by_char: HashMap<String, FrequencyInfo>,
}

impl FrequencyTable {
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open frequency list: {}", path.display()))?;
        let table = Self::from_reader(file)?;
        log::info!("Loaded frequency list: {} characters", table.by_char.len());
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut by_char = HashMap::new();
        for record in rdr.records() {
            let record = record.context("Failed to read frequency row")?;
            if record.len() < 4 {
                continue;
            }
            by_char.insert(
                record[1].to_string(),
                FrequencyInfo {
                    rank: record[0].to_string(),
                    raw: record[2].to_string(),
                    percentile: record[3].to_string(),
                },
            );
        }
        Ok(FrequencyTable { by_char })
    }

    pub fn get(&self, character: &str) -> Option<&FrequencyInfo> {
        self.by_char.get(character)
    }

    /// Numeric rank, if the character is listed with a numeric rank.
    pub fn rank(&self, character: &str) -> Option<u32> {
        self.get(character).and_then(|f| f.rank.trim().parse().ok())
    }

    /// Rank as printed in the source, or empty.
    pub fn rank_text(&self, character: &str) -> String {
        self.get(character)
            .map(|f| f.rank.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_rank() {
        let data = "Rank,Character,Freq,Pct\n1,的,7922684,4.09\n2,一,3050722,5.67\nshort,row\n";
        let table = FrequencyTable::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.rank("的"), Some(1));
        assert_eq!(table.rank_text("一"), "2");
        assert_eq!(table.rank("Character"), None);
        assert_eq!(table.rank_text("水"), "");
    }
}
