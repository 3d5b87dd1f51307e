use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "mediabatch",
    version,
    about = "Batch utilities for the media pipeline: emoji renaming and text-to-speech"
)]
pub struct Cli {
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,
    /// Environment file loaded before reading credentials.
    #[arg(long = "env-file", global = true)]
    pub env_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rename `<hexcode>.<ext>` assets after a CSV mapping.
    Rename(RenameArgs),
    /// Turn a list of sentences into audio files.
    Tts(TtsArgs),
    /// Run the jobs declared in a TOML file.
    Run {
        #[arg(long, default_value = "mediabatch.toml")]
        config: PathBuf,
    },
    /// Print the file stem each text would be saved under.
    Sanitize {
        #[arg(required = true)]
        texts: Vec<String>,
        #[arg(long, default_value = "sentence")]
        naming: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RenameArgs {
    #[arg(long, default_value = "openmoji.csv")]
    pub mapping: PathBuf,
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
    #[arg(long, default_value = "svg")]
    pub extension: String,
    #[arg(long = "hexcode-column", default_value = "hexcode")]
    pub hexcode_column: String,
    #[arg(long = "label-column", default_value = "annotation")]
    pub label_column: String,
    /// Write a JSON report of every file to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TtsArgs {
    /// Line-delimited text file, one sentence per line.
    pub input: Option<PathBuf>,
    /// Inline sentence; may be repeated.
    #[arg(long = "text")]
    pub texts: Vec<String>,
    #[arg(long, default_value = "mp3s")]
    pub output: PathBuf,
    /// Voice id; may be repeated. Falls back to ELEVENLABS_VOICE_ID(S).
    #[arg(long = "voice")]
    pub voices: Vec<String>,
    /// single, random or each. Random reuses a voice whose file already
    /// exists; pass --seed for the same picks on every run.
    #[arg(long, default_value = "single")]
    pub selection: String,
    #[arg(long, default_value = "sentence")]
    pub naming: String,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long = "max-attempts", default_value_t = 5)]
    pub max_attempts: u32,
    #[arg(long = "backoff-secs", default_value_t = 10.0)]
    pub backoff_secs: f64,
    #[arg(long = "pacing-secs", default_value_t = 2.0)]
    pub pacing_secs: f64,
    /// Unwrap `"sentence",` lines from quoted one-column lists.
    #[arg(long = "strip-quotes", action = ArgAction::SetTrue)]
    pub strip_quotes: bool,
    #[arg(long, default_value = "mp3")]
    pub extension: String,
    #[arg(long)]
    pub seed: Option<u64>,
    /// List target files and whether they exist, without calling the API.
    #[arg(long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,
    #[arg(long)]
    pub report: Option<PathBuf>,
}
