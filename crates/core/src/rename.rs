use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{BatchError, Result};
use crate::mapping::{MappingColumns, MappingTable};
use crate::sanitize::file_name;

/// A directory of `<hexcode>.<ext>` assets to rename after a mapping file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameJob {
    pub mapping_path: PathBuf,
    pub directory: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub columns: MappingColumns,
}

fn default_extension() -> String {
    "svg".to_string()
}

impl RenameJob {
    pub fn new(mapping_path: impl Into<PathBuf>, directory: impl Into<PathBuf>) -> Self {
        Self {
            mapping_path: mapping_path.into(),
            directory: directory.into(),
            extension: default_extension(),
            columns: MappingColumns::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenameOutcome {
    Renamed { to: String },
    AlreadyNamed,
    Unmapped,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameEntry {
    pub file: String,
    pub key: String,
    #[serde(flatten)]
    pub outcome: RenameOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameReport {
    pub found: usize,
    pub renamed: usize,
    pub unmapped: usize,
    pub failed: usize,
    pub entries: Vec<RenameEntry>,
}

impl RenameReport {
    fn record(&mut self, entry: RenameEntry) {
        match &entry.outcome {
            RenameOutcome::Renamed { .. } => self.renamed += 1,
            RenameOutcome::Unmapped => self.unmapped += 1,
            RenameOutcome::Failed { .. } => self.failed += 1,
            RenameOutcome::AlreadyNamed => {}
        }
        self.entries.push(entry);
    }
}

/// Renames every matching file in place. Lookup misses and filesystem
/// failures are recorded per file; only setup problems abort the run.
pub fn run_rename(job: &RenameJob) -> Result<RenameReport> {
    if !job.mapping_path.is_file() {
        return Err(BatchError::MissingInput(job.mapping_path.clone()));
    }
    if !job.directory.is_dir() {
        return Err(BatchError::MissingDirectory(job.directory.clone()));
    }
    let files = list_assets(&job.directory, &job.extension)?;
    info!(
        directory = %job.directory.display(),
        count = files.len(),
        "found .{} files",
        job.extension
    );
    if files.is_empty() {
        return Ok(RenameReport::default());
    }
    let table = MappingTable::from_path(&job.mapping_path, &job.columns)?;
    if table.is_empty() {
        warn!(
            mapping = %job.mapping_path.display(),
            "mapping has no usable rows; every file will stay unmapped"
        );
    } else {
        info!(entries = table.len(), "loaded mapping");
    }

    let mut report = RenameReport {
        found: files.len(),
        ..RenameReport::default()
    };
    for path in files {
        report.record(rename_one(&path, &table, &job.extension));
    }
    info!(
        renamed = report.renamed,
        found = report.found,
        unmapped = report.unmapped,
        failed = report.failed,
        "renaming complete"
    );
    Ok(report)
}

fn rename_one(path: &Path, table: &MappingTable, extension: &str) -> RenameEntry {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let key = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    let Some(label) = table.lookup(&key) else {
        warn!(%file, %key, "no mapping found");
        return RenameEntry {
            file,
            key,
            outcome: RenameOutcome::Unmapped,
        };
    };
    let new_name = file_name(label, None, extension);
    if new_name == file {
        return RenameEntry {
            file,
            key,
            outcome: RenameOutcome::AlreadyNamed,
        };
    }
    let target = path.with_file_name(&new_name);
    let outcome = match move_file(path, &target) {
        Ok(()) => {
            info!("renamed {file} -> {new_name}");
            RenameOutcome::Renamed { to: new_name }
        }
        Err(reason) => {
            warn!(%file, %reason, "rename failed");
            RenameOutcome::Failed { reason }
        }
    };
    RenameEntry { file, key, outcome }
}

fn move_file(from: &Path, to: &Path) -> std::result::Result<(), String> {
    // fs::rename silently replaces the target on unix.
    if to.exists() {
        return Err(format!("{} already exists", to.display()));
    }
    fs::rename(from, to).map_err(|err| err.to_string())
}

fn list_assets(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let wanted = extension.trim_start_matches('.').to_lowercase();
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|err| BatchError::Io(err.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase() == wanted)
            .unwrap_or(false);
        if matches {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
