use std::fs;
use std::path::Path;

use crate::error::{BatchError, Result};

/// Reads one text item per non-empty line.
pub fn load_text_items(path: &Path, strip_quotes: bool) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(BatchError::MissingInput(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path)?;
    Ok(parse_text_items(&raw, strip_quotes))
}

/// Splits `raw` into trimmed, non-empty lines. With `strip_quotes`, a
/// single-column quoted list (`"Where is the dog?",`) is unwrapped as well.
pub fn parse_text_items(raw: &str, strip_quotes: bool) -> Vec<String> {
    raw.lines()
        .map(|line| clean_line(line.trim_start_matches('\u{feff}'), strip_quotes))
        .filter(|line| !line.is_empty())
        .collect()
}

fn clean_line(line: &str, strip_quotes: bool) -> String {
    let trimmed = line.trim();
    if !strip_quotes {
        return trimmed.to_string();
    }
    trimmed
        .trim_end_matches(',')
        .trim()
        .trim_matches('"')
        .trim()
        .to_string()
}
