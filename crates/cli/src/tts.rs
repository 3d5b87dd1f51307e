use std::path::Path;

use anyhow::{anyhow, Context, Result};
use mediabatch_core::{
    plan_tasks, run_tts_batch, NamingStyle, Sleeper, SynthesisBackend, ThreadSleeper, TtsConfig,
    TtsReport, VoiceSelection,
};
use mediabatch_elevenlabs::ElevenLabsClient;
use tracing::warn;

use crate::cli::TtsArgs;
use crate::config::Credentials;
use crate::report;

pub fn run(args: TtsArgs) -> Result<()> {
    let mut cfg = config_from_args(&args)?;
    Credentials::from_env().apply(&mut cfg);
    run_config(&cfg, args.dry_run, args.report.as_deref())
}

fn config_from_args(args: &TtsArgs) -> Result<TtsConfig> {
    let selection = VoiceSelection::from_str(&args.selection)
        .ok_or_else(|| anyhow!("unknown voice selection {}", args.selection))?;
    let naming = NamingStyle::from_str(&args.naming)
        .ok_or_else(|| anyhow!("unknown naming style {}", args.naming))?;
    Ok(TtsConfig {
        api_key: None,
        voices: args.voices.clone(),
        selection,
        seed: args.seed,
        input_path: args.input.clone(),
        texts: args.texts.clone(),
        strip_quotes: args.strip_quotes,
        output_dir: args.output.clone(),
        extension: args.extension.clone(),
        naming,
        model_id: args.model.clone(),
        voice_settings: None,
        max_attempts: args.max_attempts,
        backoff_seconds: args.backoff_secs,
        pacing_seconds: args.pacing_secs,
    })
}

pub fn run_config(cfg: &TtsConfig, dry_run: bool, report_path: Option<&Path>) -> Result<()> {
    if dry_run {
        return print_plan(cfg);
    }
    let client = build_client(cfg)?;
    let report = run_with(cfg, &client, &ThreadSleeper)?;
    println!(
        "[mediabatch] text-to-speech complete: {} total, {} saved, {} already present, {} failed (output {})",
        report.total,
        report.saved,
        report.skipped,
        report.failed,
        cfg.output_dir.display()
    );
    if let Some(path) = report_path {
        report::write_json(path, &report)?;
    }
    Ok(())
}

fn run_with<B, S>(cfg: &TtsConfig, backend: &B, sleeper: &S) -> Result<TtsReport>
where
    B: SynthesisBackend + ?Sized,
    S: Sleeper + ?Sized,
{
    let job = cfg.job().context("invalid text-to-speech configuration")?;
    let items = cfg.load_items()?;
    Ok(run_tts_batch(&job, &items, backend, sleeper)?)
}

fn build_client(cfg: &TtsConfig) -> Result<ElevenLabsClient> {
    let api_key = match cfg.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => {
            warn!("ELEVENLABS_API_KEY is not set; requests will be rejected by the service");
            String::new()
        }
    };
    let mut client =
        ElevenLabsClient::new(api_key)?.with_voice_settings(cfg.voice_settings.clone());
    if let Some(model) = &cfg.model_id {
        client = client.with_model(model.clone());
    }
    Ok(client)
}

fn print_plan(cfg: &TtsConfig) -> Result<()> {
    let job = cfg.job().context("invalid text-to-speech configuration")?;
    let items = cfg.load_items()?;
    let tasks = plan_tasks(&job, &items);
    let pending = tasks.iter().filter(|task| !task.exists()).count();
    for task in &tasks {
        match &task.path {
            Some(path) if task.exists() => println!("[exists] {}", path.display()),
            Some(path) => println!("[new]    {} <- {:?} ({})", path.display(), task.text, task.voice),
            None => println!("[skip]   {:?} has no usable file name", task.text),
        }
    }
    println!(
        "[mediabatch] {} tasks, {} would call the API",
        tasks.len(),
        pending
    );
    Ok(())
}
