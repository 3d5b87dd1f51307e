use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BatchError, Result};
use crate::sanitize::sanitize_stem;

/// Header names of the key and label columns in a mapping file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingColumns {
    #[serde(default = "default_hexcode_column")]
    pub hexcode: String,
    #[serde(default = "default_label_column")]
    pub label: String,
}

impl Default for MappingColumns {
    fn default() -> Self {
        Self {
            hexcode: default_hexcode_column(),
            label: default_label_column(),
        }
    }
}

fn default_hexcode_column() -> String {
    "hexcode".to_string()
}

fn default_label_column() -> String {
    "annotation".to_string()
}

/// Hexcode -> sanitized label lookup, built once from a CSV file.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: HashMap<String, String>,
}

impl MappingTable {
    pub fn from_path(path: &Path, columns: &MappingColumns) -> Result<Self> {
        if !path.is_file() {
            return Err(BatchError::MissingInput(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Self::from_reader(path, file, columns)
    }

    pub fn from_reader<R: Read>(path: &Path, reader: R, columns: &MappingColumns) -> Result<Self> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|cell| cell.trim().to_string())
            .collect();
        debug!(?headers, path = %path.display(), "mapping columns");
        let key_idx = headers.iter().position(|h| h == &columns.hexcode);
        let label_idx = headers.iter().position(|h| h == &columns.label);
        let (Some(key_idx), Some(label_idx)) = (key_idx, label_idx) else {
            return Err(BatchError::MissingColumns {
                path: path.to_path_buf(),
                hexcode: columns.hexcode.clone(),
                label: columns.label.clone(),
                found: headers,
            });
        };

        let mut table = Self::default();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let key = record.get(key_idx).unwrap_or_default();
            let label = record.get(label_idx).unwrap_or_default();
            if normalize_key(key).is_empty() {
                warn!(row = row + 2, "mapping row has no {}", columns.hexcode);
                continue;
            }
            if !table.insert(key, label) {
                warn!(
                    row = row + 2,
                    key, label, "label sanitizes to an empty name, row ignored"
                );
            }
        }
        Ok(table)
    }

    /// Adds a row; returns false when the label cannot become a file name.
    /// A repeated key replaces the earlier label.
    pub fn insert(&mut self, key: &str, label: &str) -> bool {
        let label = sanitize_stem(label);
        if label.is_empty() {
            return false;
        }
        self.entries.insert(normalize_key(key), label);
        true
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(&normalize_key(key)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn normalize_key(key: &str) -> String {
    key.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn table(csv: &str) -> Result<MappingTable> {
        MappingTable::from_reader(
            Path::new("openmoji.csv"),
            Cursor::new(csv.to_string()),
            &MappingColumns::default(),
        )
    }

    #[test]
    fn builds_normalized_entries() {
        let table = table("emoji,hexcode,group,annotation\n😀,1f600,smileys,grinning face\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("1F600"), Some("grinning_face"));
        assert_eq!(table.lookup(" 1f600 "), Some("grinning_face"));
    }

    #[test]
    fn last_duplicate_wins() {
        let table =
            table("hexcode,annotation\n1F600,grinning face\n1f600,beaming face\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("1F600"), Some("beaming_face"));
    }

    #[test]
    fn missing_columns_are_reported_with_found_headers() {
        let err = table("hexcode,label\n1F600,grin\n").unwrap_err();
        match err {
            BatchError::MissingColumns { found, .. } => {
                assert_eq!(found, vec!["hexcode".to_string(), "label".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rows_with_unusable_labels_are_dropped() {
        let table = table("hexcode,annotation\n1F600,???\n,orphan\n1F601,ok\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("1F600"), None);
        assert_eq!(table.lookup("1F601"), Some("ok"));
        assert!(!table.is_empty());
    }

    #[test]
    fn only_unusable_rows_leave_an_empty_table() {
        let empty = table("hexcode,annotation\n1F600,???\n").unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
    }

    #[test]
    fn custom_column_names() {
        let columns = MappingColumns {
            hexcode: "code".into(),
            label: "name".into(),
        };
        let table = MappingTable::from_reader(
            Path::new("custom.csv"),
            Cursor::new("code,name\n2764,red heart\n"),
            &columns,
        )
        .unwrap();
        assert_eq!(table.lookup("2764"), Some("red_heart"));
    }

    #[test]
    fn absent_file_is_missing_input() {
        let err = MappingTable::from_path(
            Path::new("/definitely/not/here.csv"),
            &MappingColumns::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BatchError::MissingInput(_)));
    }
}
