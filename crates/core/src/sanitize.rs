use serde::{Deserialize, Serialize};

/// Upper bound on the length of a derived filename stem, in characters.
pub const MAX_STEM_CHARS: usize = 100;

/// How a text item is turned into a filename stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingStyle {
    /// The whole sentence, sanitized.
    #[default]
    Sentence,
    /// Only the last word of the prompt ("Where is the dog?" -> `dog`).
    TargetWord,
}

impl NamingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingStyle::Sentence => "sentence",
            NamingStyle::TargetWord => "target-word",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('_', "-").as_str() {
            "sentence" => Some(NamingStyle::Sentence),
            "target-word" | "word" => Some(NamingStyle::TargetWord),
            _ => None,
        }
    }

    pub fn stem(&self, text: &str) -> String {
        match self {
            NamingStyle::Sentence => sanitize_stem(text),
            NamingStyle::TargetWord => target_word(text).unwrap_or_else(|| sanitize_stem(text)),
        }
    }
}

/// Turns arbitrary text into a lowercase filename stem made of alphanumerics
/// and single underscores.
///
/// Whitespace and hyphens become separators, everything else that is not
/// alphanumeric is dropped. The result is capped at [`MAX_STEM_CHARS`] and is
/// stable under repeated application. It can be empty.
pub fn sanitize_stem(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_sep = true;
            continue;
        }
        if !ch.is_alphanumeric() {
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('_');
        }
        pending_sep = false;
        out.push(ch);
    }
    truncate_stem(out)
}

fn truncate_stem(stem: String) -> String {
    if stem.chars().count() <= MAX_STEM_CHARS {
        return stem;
    }
    let cut: String = stem.chars().take(MAX_STEM_CHARS).collect();
    cut.trim_end_matches('_').to_string()
}

/// Extracts the last word of a prompt, ignoring closing punctuation.
pub fn target_word(text: &str) -> Option<String> {
    let trimmed = text
        .trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '?' | '!') || c.is_whitespace());
    let word: String = trimmed
        .chars()
        .rev()
        .take_while(|c| c.is_alphabetic())
        .collect::<Vec<char>>()
        .into_iter()
        .rev()
        .collect();
    if word.is_empty() {
        return None;
    }
    let stem = sanitize_stem(&word);
    (!stem.is_empty()).then_some(stem)
}

/// Joins a stem, an optional voice suffix and an extension into a file name.
pub fn file_name(stem: &str, voice_suffix: Option<&str>, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    match voice_suffix {
        Some(voice) => format!("{stem}_{voice}.{extension}"),
        None => format!("{stem}.{extension}"),
    }
}
