use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::planner::RenamePlan;

/// Performs (or pretends to perform) renames.
pub trait RenameEffector {
    fn rename(&mut self, from: &Path, to: &Path) -> Result<(), Error>;

    /// Whether renames actually reach the filesystem.
    fn is_live(&self) -> bool;
}

/// Renames on disk. Never overwrites an existing file.
#[derive(Debug, Default)]
pub struct FsEffector;

impl RenameEffector for FsEffector {
    fn rename(&mut self, from: &Path, to: &Path) -> Result<(), Error> {
        if to.exists() {
            return Err(Error::TargetExists(to.to_path_buf()));
        }
        fs::rename(from, to)?;
        Ok(())
    }

    fn is_live(&self) -> bool {
        true
    }
}

/// Records the renames it is given and leaves the filesystem alone.
#[derive(Debug, Default)]
pub struct DryRun {
    pub renames: Vec<(PathBuf, PathBuf)>,
}

impl RenameEffector for DryRun {
    fn rename(&mut self, from: &Path, to: &Path) -> Result<(), Error> {
        self.renames.push((from.to_path_buf(), to.to_path_buf()));
        Ok(())
    }

    fn is_live(&self) -> bool {
        false
    }
}

/// Apply the plan in order. There is no rollback: renames done before a
/// failure stay done.
pub fn apply(
    dir: &Path,
    plan: &RenamePlan,
    effector: &mut dyn RenameEffector,
    set_mtime: bool,
) -> Result<usize, Error> {
    let live = effector.is_live();
    let mut applied = 0;

    for op in &plan.ops {
        if live {
            tracing::info!(from = %op.from, to = %op.to, kind = ?op.kind, "renaming");
        } else {
            tracing::info!(from = %op.from, to = %op.to, kind = ?op.kind, "suggested name change");
        }
        effector.rename(&dir.join(&op.from), &dir.join(&op.to))?;
        applied += 1;
    }

    if live && set_mtime {
        stamp_mtimes(dir, plan);
    }

    Ok(applied)
}

/// Set each renamed file's mtime to its resolved timestamp (local time).
fn stamp_mtimes(dir: &Path, plan: &RenamePlan) {
    for decision in &plan.decisions {
        let (Some(final_name), Some(resolution)) = (&decision.final_name, &decision.resolution) else {
            continue;
        };
        let Some(dt) = resolution.token.as_datetime() else {
            continue;
        };
        let Some(local) = dt.and_local_timezone(chrono::Local).single() else {
            tracing::warn!(file = %final_name, "ambiguous local time, mtime left unchanged");
            continue;
        };

        let ft = filetime::FileTime::from_unix_time(local.timestamp(), 0);
        if let Err(err) = filetime::set_file_mtime(dir.join(final_name), ft) {
            tracing::warn!(file = %final_name, error = %err, "could not set mtime");
        }
    }
}
