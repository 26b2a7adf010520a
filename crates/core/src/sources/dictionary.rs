//! Rows of the primary Chinese dictionary export.
//!
//! Columns: header, page, column, pinyin, level, strokes, definition block.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// Header cell of the export's own column-title row.
const TITLE_HEADER: &str = "字头";

/// One character row of the primary dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DictionaryRow {
    /// Raw variant header, e.g. `干（乾、△幹）`
    pub header: String,
    pub page: String,
    pub column: String,
    pub pinyin: String,
    pub level: String,
    pub strokes: String,
    /// Multi-sense definition block
    pub definition: String,
}

impl DictionaryRow {
    /// Column titles and preamble rows that carry no character.
    pub fn is_preamble(&self) -> bool {
        let header = self.header.trim();
        header == TITLE_HEADER || (header == "吖" && self.definition.contains("释文"))
    }
}

pub fn load_rows(path: &Path) -> Result<Vec<DictionaryRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open dictionary: {}", path.display()))?;
    let rows = read_rows(file)
        .with_context(|| format!("Failed to parse dictionary: {}", path.display()))?;
    log::info!("Loaded {} dictionary rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read all rows with at least seven columns. Shorter or undecodable rows
/// are skipped and do not count toward row numbering.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<DictionaryRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                log::debug!("Skipping bad dictionary record near line {}: {}", line + 1, e);
                continue;
            }
        };
        if record.len() < 7 {
            log::debug!("Skipping short dictionary record {} ({} fields)", line + 1, record.len());
            continue;
        }
        rows.push(DictionaryRow {
            header: record[0].trim().to_string(),
            page: record[1].trim().to_string(),
            column: record[2].trim().to_string(),
            pinyin: record[3].trim().to_string(),
            level: record[4].trim().to_string(),
            strokes: record[5].trim().to_string(),
            definition: record[6].to_string(),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_rows() {
        let data = "\
字头,页码,栏,拼音,级,笔画,释文
吖,1,a,ā,,6,释文说明
\"干（乾、△幹）\",120,b,gān,一级,3,\"❶盾牌。\n❷触犯。\"
short,row
";
        let rows = read_rows(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_preamble());
        assert!(rows[1].is_preamble());
        assert!(!rows[2].is_preamble());
        assert_eq!(rows[2].header, "干（乾、△幹）");
        assert_eq!(rows[2].pinyin, "gān");
        assert_eq!(rows[2].level, "一级");
        assert!(rows[2].definition.contains('\n'));
    }

    #[test]
    fn test_undecodable_record_skipped() {
        let mut data = Vec::new();
        data.extend_from_slice("甲,1,a,jiǎ,一级,5,❶第一位。\n".as_bytes());
        data.extend_from_slice(b"\xff\xfe,1,a,x,,1,bad\n");
        data.extend_from_slice("乙,1,b,yǐ,一级,1,❶第二位。\n".as_bytes());
        let rows = read_rows(data.as_slice()).unwrap();
        let headers: Vec<&str> = rows.iter().map(|r| r.header.as_str()).collect();
        assert_eq!(headers, vec!["甲", "乙"]);
    }

    #[test]
    fn test_plain_a_is_not_preamble() {
        let row = DictionaryRow {
            header: "吖".into(),
            definition: "❶拟声词。".into(),
            ..Default::default()
        };
        assert!(!row.is_preamble());
    }
}
