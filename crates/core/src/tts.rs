use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{BatchError, Result};
use crate::retry::{retry_with_backoff, RetryPolicy, Sleeper};
use crate::sanitize::{file_name, NamingStyle};
use crate::synth::{SynthesisBackend, SynthesisOutcome};

pub const DEFAULT_PACING: Duration = Duration::from_secs(2);

/// How voices are assigned to text items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoiceSelection {
    /// Every item uses the first voice.
    #[default]
    Single,
    /// Each item gets one voice picked at random. A voice that already has
    /// a file for the item is reused, so reruns skip finished items.
    Random,
    /// Each item is rendered once per voice.
    Each,
}

impl VoiceSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceSelection::Single => "single",
            VoiceSelection::Random => "random",
            VoiceSelection::Each => "each",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "single" => Some(VoiceSelection::Single),
            "random" => Some(VoiceSelection::Random),
            "each" | "all" => Some(VoiceSelection::Each),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePlan {
    pub voices: Vec<String>,
    #[serde(default)]
    pub selection: VoiceSelection,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl VoicePlan {
    pub fn single(voice: impl Into<String>) -> Self {
        Self {
            voices: vec![voice.into()],
            selection: VoiceSelection::Single,
            seed: None,
        }
    }

    /// Filenames carry the voice id once more than one voice can be used.
    pub fn suffixes_files(&self) -> bool {
        self.selection != VoiceSelection::Single && self.voices.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsJob {
    pub output_dir: PathBuf,
    pub extension: String,
    pub voices: VoicePlan,
    pub naming: NamingStyle,
    pub retry: RetryPolicy,
    pub pacing: Duration,
}

impl TtsJob {
    pub fn new(output_dir: impl Into<PathBuf>, voices: VoicePlan) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension: "mp3".to_string(),
            voices,
            naming: NamingStyle::default(),
            retry: RetryPolicy::default(),
            pacing: DEFAULT_PACING,
        }
    }
}

/// One (text, voice) pair and where its audio belongs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedTask {
    pub text: String,
    pub voice: String,
    /// `None` when the text leaves nothing to build a file name from.
    pub path: Option<PathBuf>,
}

impl PlannedTask {
    pub fn exists(&self) -> bool {
        self.path.as_deref().map(Path::exists).unwrap_or(false)
    }
}

pub fn plan_tasks(job: &TtsJob, items: &[String]) -> Vec<PlannedTask> {
    let plan = &job.voices;
    if plan.voices.is_empty() {
        return Vec::new();
    }
    let mut rng = match plan.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let suffixed = plan.suffixes_files();
    let mut tasks = Vec::with_capacity(items.len());
    for text in items {
        let stem = job.naming.stem(text);
        let target = |voice: &str| {
            (!stem.is_empty()).then(|| {
                let suffix = suffixed.then_some(voice);
                job.output_dir
                    .join(file_name(&stem, suffix, &job.extension))
            })
        };
        let voices: Vec<&String> = match plan.selection {
            VoiceSelection::Single => plan.voices.iter().take(1).collect(),
            VoiceSelection::Random => {
                // Draw first so a seeded sequence does not depend on disk state.
                let drawn = plan.voices.choose(&mut rng);
                let existing = plan.voices.iter().find(|voice| {
                    target(voice.as_str()).is_some_and(|path| path.exists())
                });
                existing.or(drawn).into_iter().collect()
            }
            VoiceSelection::Each => plan.voices.iter().collect(),
        };
        for voice in voices {
            let path = target(voice.as_str());
            tasks.push(PlannedTask {
                text: text.clone(),
                voice: voice.clone(),
                path,
            });
        }
    }
    tasks
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Saved,
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TtsItemReport {
    pub text: String,
    pub voice: String,
    pub path: Option<PathBuf>,
    pub attempts: u32,
    #[serde(flatten)]
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TtsReport {
    pub total: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
    pub items: Vec<TtsItemReport>,
}

impl TtsReport {
    /// Items whose artifact is on disk after the run.
    pub fn succeeded(&self) -> usize {
        self.saved + self.skipped
    }

    fn record(&mut self, item: TtsItemReport) {
        match item.status {
            ItemStatus::Saved => self.saved += 1,
            ItemStatus::Skipped => self.skipped += 1,
            ItemStatus::Failed { .. } => self.failed += 1,
        }
        self.items.push(item);
    }
}

/// Renders every item through `backend`, skipping artifacts already on disk.
///
/// Each item is finished (call, retries, write) before the next starts. An
/// item failure is recorded and the batch moves on; only an unusable job
/// (no voice, unwritable output directory) returns an error.
pub fn run_tts_batch<B, S>(
    job: &TtsJob,
    items: &[String],
    backend: &B,
    sleeper: &S,
) -> Result<TtsReport>
where
    B: SynthesisBackend + ?Sized,
    S: Sleeper + ?Sized,
{
    if job.voices.voices.is_empty() {
        return Err(BatchError::Config("no voice id configured".to_string()));
    }
    fs::create_dir_all(&job.output_dir)?;
    let tasks = plan_tasks(job, items);
    let total = tasks.len();
    info!(
        total,
        output = %job.output_dir.display(),
        selection = job.voices.selection.as_str(),
        "starting text-to-speech batch"
    );
    let mut report = TtsReport {
        total,
        ..TtsReport::default()
    };
    for (idx, task) in tasks.into_iter().enumerate() {
        let position = format!("{}/{}", idx + 1, total);
        report.record(process_task(job, task, &position, backend, sleeper));
    }
    info!(
        total = report.total,
        saved = report.saved,
        skipped = report.skipped,
        failed = report.failed,
        "text-to-speech batch complete"
    );
    Ok(report)
}

fn process_task<B, S>(
    job: &TtsJob,
    task: PlannedTask,
    position: &str,
    backend: &B,
    sleeper: &S,
) -> TtsItemReport
where
    B: SynthesisBackend + ?Sized,
    S: Sleeper + ?Sized,
{
    let PlannedTask { text, voice, path } = task;
    let finish = |path: Option<PathBuf>, attempts: u32, status: ItemStatus| TtsItemReport {
        text: text.clone(),
        voice: voice.clone(),
        path,
        attempts,
        status,
    };
    let Some(path) = path else {
        warn!("[{position}] failed: {text:?} produces an empty file name");
        return finish(
            None,
            0,
            ItemStatus::Failed {
                reason: "text produces an empty file name".to_string(),
            },
        );
    };
    if path.exists() {
        info!("[{position}] skipping {}, file already exists", path.display());
        return finish(Some(path), 0, ItemStatus::Skipped);
    }

    info!("[{position}] generating: {text} (voice {voice})");
    let retried = retry_with_backoff(
        &job.retry,
        sleeper,
        SynthesisOutcome::is_retriable,
        |attempt| {
            if attempt > 1 {
                info!("[{position}] retrying {text:?} (attempt {attempt})");
            }
            backend.synthesize(&text, &voice)
        },
    );
    let status = match retried.value {
        SynthesisOutcome::Success(bytes) => {
            let status = match write_artifact(&path, &bytes) {
                Ok(()) => {
                    info!("[{position}] saved {}", path.display());
                    ItemStatus::Saved
                }
                Err(err) => {
                    warn!("[{position}] failed to write {}: {err}", path.display());
                    ItemStatus::Failed {
                        reason: format!("write failed: {err}"),
                    }
                }
            };
            if !job.pacing.is_zero() {
                sleeper.sleep(job.pacing);
            }
            status
        }
        SynthesisOutcome::RateLimited => {
            warn!(
                "[{position}] failed to generate after {} attempts: {text}",
                retried.attempts
            );
            ItemStatus::Failed {
                reason: format!("rate limited after {} attempts", retried.attempts),
            }
        }
        SynthesisOutcome::Rejected(reason) => {
            warn!("[{position}] failed for {text:?}: {reason}");
            ItemStatus::Failed { reason }
        }
    };
    finish(Some(path), retried.attempts, status)
}

/// Writes into a temporary sibling first so an interrupted run never leaves
/// a truncated file at `path`.
fn write_artifact(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
