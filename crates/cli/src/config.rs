use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use mediabatch_core::{RenameJob, TtsConfig};
use serde::Deserialize;

pub const DEFAULT_ENV_FILE: &str = ".env";

/// Values sourced from the environment; none of them is checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub voices: Vec<String>,
    pub model_id: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .copied()
                .filter_map(&lookup)
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };
        let voices = first(&[
            "ELEVENLABS_VOICE_IDS",
            "ELEVENLABS_VOICE_ID",
            "ELEVEN_LABS_DEFAULT_VOICE_ID",
        ])
        .map(|raw| split_list(&raw))
        .unwrap_or_default();
        Self {
            api_key: first(&["ELEVENLABS_API_KEY", "ELEVEN_LABS_API_KEY"]),
            voices,
            model_id: first(&["ELEVENLABS_MODEL_ID"]),
        }
    }

    /// Fills whatever the job left unset.
    pub fn apply(&self, cfg: &mut TtsConfig) {
        if cfg.api_key.is_none() {
            cfg.api_key = self.api_key.clone();
        }
        if cfg.voices.is_empty() {
            cfg.voices = self.voices.clone();
        }
        if cfg.model_id.is_none() {
            cfg.model_id = self.model_id.clone();
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Loads `path` into the process environment. Without an explicit path a
/// missing `.env` is fine; an explicit one must exist.
pub fn load_env_file(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load env file {}", path.display()))?;
        }
        None => {
            if Path::new(DEFAULT_ENV_FILE).is_file() {
                dotenvy::from_filename(DEFAULT_ENV_FILE)
                    .with_context(|| format!("failed to load {DEFAULT_ENV_FILE}"))?;
            }
        }
    }
    Ok(())
}

/// One `[[job]]` table of a run file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Job {
    Rename(RenameJob),
    Tts(TtsConfig),
}

impl Job {
    pub fn kind(&self) -> &'static str {
        match self {
            Job::Rename(_) => "rename",
            Job::Tts(_) => "tts",
        }
    }
}

/// Jobs declared in a run file, executed in the order they appear.
#[derive(Debug, Deserialize, Default)]
pub struct RunConfig {
    #[serde(default, rename = "job")]
    pub jobs: Vec<Job>,
}

impl RunConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut cfg: RunConfig = toml::from_str(&raw)
            .with_context(|| format!("invalid run config {}", path.display()))?;
        if cfg.jobs.is_empty() {
            return Err(anyhow!(
                "run config {} declares no [[job]] tables",
                path.display()
            ));
        }
        if let Some(base) = path.parent() {
            cfg.resolve_paths(base);
        }
        Ok(cfg)
    }

    /// Relative paths in a run file are relative to the file itself.
    fn resolve_paths(&mut self, base: &Path) {
        for job in &mut self.jobs {
            match job {
                Job::Rename(job) => {
                    job.mapping_path = resolve(base, &job.mapping_path);
                    job.directory = resolve(base, &job.directory);
                }
                Job::Tts(job) => {
                    job.output_dir = resolve(base, &job.output_dir);
                    if let Some(input) = &job.input_path {
                        job.input_path = Some(resolve(base, input));
                    }
                }
            }
        }
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediabatch_core::{NamingStyle, VoiceSelection};
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn credentials_prefer_primary_names() {
        let creds = Credentials::from_lookup(lookup(&[
            ("ELEVENLABS_API_KEY", "sk_primary"),
            ("ELEVEN_LABS_API_KEY", "sk_alias"),
            ("ELEVENLABS_VOICE_IDS", "v1, v2,,v3"),
            ("ELEVENLABS_VOICE_ID", "ignored"),
        ]));
        assert_eq!(creds.api_key.as_deref(), Some("sk_primary"));
        assert_eq!(creds.voices, vec!["v1", "v2", "v3"]);
        assert_eq!(creds.model_id, None);
    }

    #[test]
    fn credentials_fall_back_to_legacy_names() {
        let creds = Credentials::from_lookup(lookup(&[
            ("ELEVEN_LABS_API_KEY", "sk_alias"),
            ("ELEVEN_LABS_DEFAULT_VOICE_ID", "legacy-voice"),
            ("ELEVENLABS_VOICE_ID", "  "),
        ]));
        assert_eq!(creds.api_key.as_deref(), Some("sk_alias"));
        assert_eq!(creds.voices, vec!["legacy-voice"]);
    }

    #[test]
    fn apply_keeps_explicit_values() {
        let creds = Credentials {
            api_key: Some("env-key".into()),
            voices: vec!["env-voice".into()],
            model_id: Some("env-model".into()),
        };
        let mut cfg = TtsConfig {
            voices: vec!["cli-voice".into()],
            ..TtsConfig::default()
        };
        creds.apply(&mut cfg);
        assert_eq!(cfg.voices, vec!["cli-voice"]);
        assert_eq!(cfg.api_key.as_deref(), Some("env-key"));
        assert_eq!(cfg.model_id.as_deref(), Some("env-model"));
    }

    #[test]
    fn run_file_parses_and_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mediabatch.toml");
        fs::write(
            &path,
            r#"
[[job]]
kind = "rename"
mapping_path = "openmoji.csv"
directory = "svg"

[[job]]
kind = "tts"
input_path = "es6_sentences.md"
output_dir = "mp3s"
voices = ["voice-a", "voice-b"]
selection = "random"
seed = 7
naming = "target-word"
pacing_seconds = 1.2
max_attempts = 3

[job.voice_settings]
stability = 0.5
similarity_boost = 0.75
"#,
        )
        .unwrap();
        let cfg = RunConfig::from_path(&path).unwrap();
        assert_eq!(cfg.jobs.len(), 2);
        let Job::Rename(rename) = &cfg.jobs[0] else {
            panic!("expected rename job first, got {}", cfg.jobs[0].kind());
        };
        assert_eq!(rename.mapping_path, dir.path().join("openmoji.csv"));
        assert_eq!(rename.extension, "svg");
        assert_eq!(rename.columns.label, "annotation");
        let Job::Tts(tts) = &cfg.jobs[1] else {
            panic!("expected tts job second, got {}", cfg.jobs[1].kind());
        };
        assert_eq!(tts.output_dir, dir.path().join("mp3s"));
        assert_eq!(tts.input_path.as_deref(), Some(dir.path().join("es6_sentences.md").as_path()));
        assert_eq!(tts.selection, VoiceSelection::Random);
        assert_eq!(tts.seed, Some(7));
        assert_eq!(tts.naming, NamingStyle::TargetWord);
        assert_eq!(tts.max_attempts, 3);
        assert_eq!(tts.backoff_seconds, 10.0);
        assert_eq!(
            tts.voice_settings.as_ref().and_then(|s| s.similarity_boost),
            Some(0.75)
        );
    }

    #[test]
    fn run_file_keeps_declaration_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mediabatch.toml");
        fs::write(
            &path,
            r#"
[[job]]
kind = "tts"
texts = ["Where is the dog?"]

[[job]]
kind = "rename"
mapping_path = "openmoji.csv"
directory = "svg"

[[job]]
kind = "tts"
texts = ["Pick the TV!"]
"#,
        )
        .unwrap();
        let cfg = RunConfig::from_path(&path).unwrap();
        let kinds: Vec<&str> = cfg.jobs.iter().map(Job::kind).collect();
        assert_eq!(kinds, vec!["tts", "rename", "tts"]);
    }

    #[test]
    fn unknown_job_kind_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mediabatch.toml");
        fs::write(&path, "[[job]]\nkind = \"transcode\"\n").unwrap();
        assert!(RunConfig::from_path(&path).is_err());
    }

    #[test]
    fn empty_run_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        fs::write(&path, "# nothing\n").unwrap();
        assert!(RunConfig::from_path(&path).is_err());
    }
}
