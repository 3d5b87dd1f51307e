use std::path::Path;

use anyhow::{Context, Result};
use mediabatch_core::{RenameJob, TtsConfig};

use crate::config::{Credentials, Job, RunConfig};
use crate::{rename, tts};

pub fn run_from_config(path: &Path) -> Result<()> {
    let cfg = RunConfig::from_path(path)?;
    let credentials = Credentials::from_env();
    run_jobs(
        cfg,
        &credentials,
        |job| rename::run_job(job, None),
        |job| tts::run_config(job, false, None),
    )
}

fn run_jobs<FRename, FTts>(
    cfg: RunConfig,
    credentials: &Credentials,
    rename_fn: FRename,
    tts_fn: FTts,
) -> Result<()>
where
    FRename: Fn(&RenameJob) -> Result<()>,
    FTts: Fn(&TtsConfig) -> Result<()>,
{
    let total = cfg.jobs.len();
    for (index, job) in cfg.jobs.into_iter().enumerate() {
        let position = index + 1;
        let kind = job.kind();
        let outcome = match job {
            Job::Rename(job) => {
                println!(
                    "[mediabatch] job {position}/{total}: rename {} using {}",
                    job.directory.display(),
                    job.mapping_path.display()
                );
                rename_fn(&job)
            }
            Job::Tts(mut job) => {
                credentials.apply(&mut job);
                println!(
                    "[mediabatch] job {position}/{total}: text-to-speech into {}",
                    job.output_dir.display()
                );
                tts_fn(&job)
            }
        };
        outcome.with_context(|| format!("job {position} ({kind}) failed"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::path::PathBuf;

    fn cfg() -> RunConfig {
        RunConfig {
            jobs: vec![
                Job::Rename(RenameJob::new("openmoji.csv", "svg")),
                Job::Tts(TtsConfig {
                    texts: vec!["Where is the dog?".into()],
                    ..TtsConfig::default()
                }),
                Job::Tts(TtsConfig {
                    texts: vec!["Pick the TV!".into()],
                    voices: vec!["explicit".into()],
                    output_dir: PathBuf::from("level_1"),
                    ..TtsConfig::default()
                }),
            ],
        }
    }

    #[test]
    fn jobs_run_in_order_with_credentials_applied() {
        let credentials = Credentials {
            api_key: Some("sk_env".into()),
            voices: vec!["env-voice".into()],
            model_id: None,
        };
        let rename_calls: RefCell<Vec<PathBuf>> = RefCell::new(Vec::new());
        let tts_calls: RefCell<Vec<(Vec<String>, Option<String>)>> = RefCell::new(Vec::new());
        run_jobs(
            cfg(),
            &credentials,
            |job| {
                rename_calls.borrow_mut().push(job.directory.clone());
                Ok(())
            },
            |job| {
                tts_calls
                    .borrow_mut()
                    .push((job.voices.clone(), job.api_key.clone()));
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(rename_calls.borrow().as_slice(), &[PathBuf::from("svg")]);
        let tts_calls = tts_calls.borrow();
        assert_eq!(tts_calls.len(), 2);
        assert_eq!(tts_calls[0].0, vec!["env-voice"]);
        assert_eq!(tts_calls[1].0, vec!["explicit"]);
        assert_eq!(tts_calls[1].1.as_deref(), Some("sk_env"));
    }

    #[test]
    fn configuration_error_stops_remaining_jobs() {
        let tts_calls = RefCell::new(0);
        let err = run_jobs(
            cfg(),
            &Credentials::default(),
            |_| Err(anyhow!("mapping file missing")),
            |_| {
                *tts_calls.borrow_mut() += 1;
                Ok(())
            },
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("job 1 (rename) failed"));
        assert_eq!(*tts_calls.borrow(), 0);
    }

    #[test]
    fn tts_declared_before_rename_runs_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mediabatch.toml");
        std::fs::write(
            &path,
            r#"
[[job]]
kind = "tts"
texts = ["Where is the dog?"]

[[job]]
kind = "rename"
mapping_path = "openmoji.csv"
directory = "svg"
"#,
        )
        .unwrap();
        let order: RefCell<Vec<&str>> = RefCell::new(Vec::new());
        run_jobs(
            RunConfig::from_path(&path).unwrap(),
            &Credentials::default(),
            |_| {
                order.borrow_mut().push("rename");
                Ok(())
            },
            |_| {
                order.borrow_mut().push("tts");
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(order.into_inner(), vec!["tts", "rename"]);
    }
}
