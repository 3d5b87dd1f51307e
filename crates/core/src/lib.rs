mod config;
mod error;
mod items;
mod mapping;
mod rename;
mod retry;
mod sanitize;
mod synth;
mod tts;

pub use config::{
    TtsConfig, VoiceSettings, DEFAULT_BACKOFF_SECONDS, DEFAULT_OUTPUT_DIR, DEFAULT_PACING_SECONDS,
};
pub use error::{BatchError, Result};
pub use items::{load_text_items, parse_text_items};
pub use mapping::{normalize_key, MappingColumns, MappingTable};
pub use rename::{run_rename, RenameEntry, RenameJob, RenameOutcome, RenameReport};
pub use retry::{
    retry_with_backoff, Retried, RetryPolicy, Sleeper, ThreadSleeper, DEFAULT_BACKOFF,
    DEFAULT_MAX_ATTEMPTS,
};
pub use sanitize::{file_name, sanitize_stem, target_word, NamingStyle, MAX_STEM_CHARS};
pub use synth::{SynthesisBackend, SynthesisOutcome};
pub use tts::{
    plan_tasks, run_tts_batch, ItemStatus, PlannedTask, TtsItemReport, TtsJob, TtsReport,
    VoicePlan, VoiceSelection, DEFAULT_PACING,
};

/// In-memory backend and sleeper for driving batches without a network or
/// a clock.
#[cfg(any(test, feature = "test-support"))]
pub use retry::RecordingSleeper;
#[cfg(any(test, feature = "test-support"))]
pub use synth::ScriptedBackend;
