use std::path::Path;

use anyhow::{Context, Result};
use mediabatch_core::{run_rename, MappingColumns, RenameJob};

use crate::cli::RenameArgs;
use crate::report;

pub fn run(args: RenameArgs) -> Result<()> {
    let job = RenameJob {
        mapping_path: args.mapping,
        directory: args.dir,
        extension: args.extension,
        columns: MappingColumns {
            hexcode: args.hexcode_column,
            label: args.label_column,
        },
    };
    run_job(&job, args.report.as_deref())
}

pub fn run_job(job: &RenameJob, report_path: Option<&Path>) -> Result<()> {
    let report = run_rename(job).with_context(|| {
        format!(
            "rename of {} using {} failed",
            job.directory.display(),
            job.mapping_path.display()
        )
    })?;
    println!(
        "[mediabatch] renaming complete: {} of {} files renamed ({} unmapped, {} failed)",
        report.renamed, report.found, report.unmapped, report.failed
    );
    if let Some(path) = report_path {
        report::write_json(path, &report)?;
    }
    Ok(())
}
