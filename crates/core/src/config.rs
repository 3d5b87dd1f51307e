use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BatchError, Result};
use crate::items::load_text_items;
use crate::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
use crate::sanitize::NamingStyle;
use crate::tts::{TtsJob, VoicePlan, VoiceSelection};

pub const DEFAULT_OUTPUT_DIR: &str = "mp3s";
pub const DEFAULT_BACKOFF_SECONDS: f64 = 10.0;
pub const DEFAULT_PACING_SECONDS: f64 = 2.0;

/// Optional tuning sent along with each synthesis request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_boost: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_speaker_boost: Option<bool>,
}

/// Every option a text-to-speech run recognizes, in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub api_key: Option<String>,
    pub voices: Vec<String>,
    pub selection: VoiceSelection,
    pub seed: Option<u64>,
    pub input_path: Option<PathBuf>,
    pub texts: Vec<String>,
    pub strip_quotes: bool,
    pub output_dir: PathBuf,
    pub extension: String,
    pub naming: NamingStyle,
    pub model_id: Option<String>,
    pub voice_settings: Option<VoiceSettings>,
    pub max_attempts: u32,
    pub backoff_seconds: f64,
    pub pacing_seconds: f64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            voices: Vec::new(),
            selection: VoiceSelection::default(),
            seed: None,
            input_path: None,
            texts: Vec::new(),
            strip_quotes: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            extension: "mp3".to_string(),
            naming: NamingStyle::default(),
            model_id: None,
            voice_settings: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_seconds: DEFAULT_BACKOFF_SECONDS,
            pacing_seconds: DEFAULT_PACING_SECONDS,
        }
    }
}

impl TtsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.voices.iter().all(|voice| voice.trim().is_empty()) {
            return Err(BatchError::Config(
                "at least one voice id is required".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(BatchError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(BatchError::Config("extension must not be empty".to_string()));
        }
        if self.input_path.is_none() && self.texts.is_empty() {
            return Err(BatchError::Config(
                "either input_path or texts must be provided".to_string(),
            ));
        }
        seconds("backoff_seconds", self.backoff_seconds)?;
        seconds("pacing_seconds", self.pacing_seconds)?;
        Ok(())
    }

    pub fn job(&self) -> Result<TtsJob> {
        self.validate()?;
        let voices = self
            .voices
            .iter()
            .map(|voice| voice.trim().to_string())
            .filter(|voice| !voice.is_empty())
            .collect();
        Ok(TtsJob {
            output_dir: self.output_dir.clone(),
            extension: self.extension.trim_start_matches('.').to_string(),
            voices: VoicePlan {
                voices,
                selection: self.selection,
                seed: self.seed,
            },
            naming: self.naming,
            retry: RetryPolicy::new(
                self.max_attempts,
                seconds("backoff_seconds", self.backoff_seconds)?,
            ),
            pacing: seconds("pacing_seconds", self.pacing_seconds)?,
        })
    }

    /// Items from `input_path` first, then the inline `texts`.
    pub fn load_items(&self) -> Result<Vec<String>> {
        let mut items = match &self.input_path {
            Some(path) => load_text_items(path, self.strip_quotes)?,
            None => Vec::new(),
        };
        items.extend(
            self.texts
                .iter()
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
        );
        Ok(items)
    }
}

fn seconds(name: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| BatchError::Config(format!("{name} must be a non-negative number")))
}
