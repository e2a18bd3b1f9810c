use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::allocator::RenameOp;
use crate::planner::{FileDecision, RenamePlan};

#[derive(Serialize)]
struct Report<'a> {
    folder: &'a Path,
    live: bool,
    files: &'a [FileDecision],
    renames: &'a [RenameOp],
}

/// Write a JSON audit of every decision and rename of a run.
pub fn write_report(
    report_path: &Path,
    folder: &Path,
    plan: &RenamePlan,
    live: bool,
) -> anyhow::Result<()> {
    let report = Report {
        folder,
        live,
        files: &plan.decisions,
        renames: &plan.ops,
    };

    let writer = BufWriter::new(File::create(report_path)?);
    serde_json::to_writer_pretty(writer, &report)?;
    Ok(())
}
