pub mod allocator;
pub mod date;
pub mod description;
pub mod error;
pub mod media;
pub mod planner;
pub mod reader;
pub mod report;
pub mod scan;
pub mod writer;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use date::reconcile::{ConflictChooser, ConflictPolicy, PolicyKind, Selection};
pub use date::{NameStyle, TimestampToken};
pub use error::Error;
pub use planner::RenamePlan;

fn default_fallback() -> bool {
    true
}

fn default_ffprobe() -> PathBuf {
    PathBuf::from("ffprobe")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Directory whose files are renamed in place
    pub folder: PathBuf,
    /// Suffix for every new name (without separator; may be empty)
    #[serde(default)]
    pub description: String,
    /// Only URI-unreserved characters, `_` as separator
    #[serde(default)]
    pub strict: bool,
    /// Actually rename; otherwise only report what would happen
    #[serde(default)]
    pub rename: bool,
    #[serde(default)]
    pub policy: PolicyKind,
    /// Give files without any timestamp the previous one plus a second
    #[serde(default = "default_fallback")]
    pub fallback: bool,
    /// Set the mtime of renamed files to their timestamp
    #[serde(default)]
    pub set_mtime: bool,
    #[serde(default = "default_ffprobe")]
    pub ffprobe: PathBuf,
    /// Where to write a JSON report of the run
    #[serde(default)]
    pub report: Option<PathBuf>,
}

impl ProcessOptions {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            description: String::new(),
            strict: false,
            rename: false,
            policy: PolicyKind::default(),
            fallback: default_fallback(),
            set_mtime: false,
            ffprobe: default_ffprobe(),
            report: None,
        }
    }

    pub fn style(&self) -> NameStyle {
        if self.strict {
            NameStyle::Strict
        } else {
            NameStyle::Standard
        }
    }

    /// Metadata reader configured from these options.
    pub fn reader(&self) -> reader::ExternalReader {
        reader::ExternalReader::new(&self.ffprobe)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub files_seen: u64,
    pub files_renamed: u64,
    pub files_skipped: u64,
    pub promotions: u64,
    pub conflicts: u64,
    pub fallbacks: u64,
    pub plan: RenamePlan,
}

/// Plan and apply a run, renaming on disk when `options.rename` is set.
pub fn process(
    options: &ProcessOptions,
    reader: &dyn reader::MetadataReader,
    chooser: Option<&mut dyn ConflictChooser>,
) -> anyhow::Result<ProcessResult> {
    if options.rename {
        tracing::warn!(folder = %options.folder.display(), "renaming mode, files will be renamed");
        process_with_effector(options, reader, chooser, &mut writer::FsEffector)
    } else {
        tracing::info!(folder = %options.folder.display(), "dry run, files will not be renamed");
        process_with_effector(options, reader, chooser, &mut writer::DryRun::default())
    }
}

/// Same as [`process`] with an explicit rename effector.
pub fn process_with_effector(
    options: &ProcessOptions,
    reader: &dyn reader::MetadataReader,
    chooser: Option<&mut dyn ConflictChooser>,
    effector: &mut dyn writer::RenameEffector,
) -> anyhow::Result<ProcessResult> {
    let style = options.style();
    let description = description::Description::parse(&options.description, style)
        .map_err(Error::from)?;

    let mut policy = match (options.policy, chooser) {
        (PolicyKind::PreferMetadata, _) => ConflictPolicy::PreferMetadata,
        (PolicyKind::PreferName, _) => ConflictPolicy::PreferName,
        (PolicyKind::Interactive, Some(chooser)) => ConflictPolicy::Interactive(chooser),
        (PolicyKind::Interactive, None) => {
            anyhow::bail!("interactive conflict resolution needs a chooser")
        }
    };

    let listing = scan::list_directory(&options.folder)?;
    tracing::debug!(files = listing.len(), "directory listed");

    let settings = planner::PlanSettings {
        style,
        description,
        fallback: options.fallback,
    };

    // Stage 1: decide everything; fatal problems surface before any rename
    let plan = planner::plan(&options.folder, &listing, reader, &mut policy, &settings)?;

    // Stage 2: rename
    let applied = writer::apply(&options.folder, &plan, effector, options.set_mtime)?;

    if let Some(ref path) = options.report {
        report::write_report(path, &options.folder, &plan, effector.is_live())?;
    }

    let count = |pred: fn(&planner::FileDecision) -> bool| -> u64 {
        plan.decisions.iter().filter(|d| pred(d)).count() as u64
    };
    let conflicts = count(|d| {
        matches!(
            d.outcome,
            date::reconcile::ReconciliationOutcome::Conflict { .. }
        )
    });
    let fallbacks = count(|d| {
        d.resolution
            .as_ref()
            .is_some_and(|r| r.provenance == date::reconcile::Provenance::Fallback)
    });

    let promotions = plan.promotions() as u64;
    let result = ProcessResult {
        files_seen: listing.len() as u64,
        files_renamed: applied as u64 - promotions,
        files_skipped: plan.skipped() as u64,
        promotions,
        conflicts,
        fallbacks,
        plan,
    };

    tracing::info!(
        seen = result.files_seen,
        renamed = result.files_renamed,
        skipped = result.files_skipped,
        promotions = result.promotions,
        conflicts = result.conflicts,
        fallbacks = result.fallbacks,
        live = effector.is_live(),
        "run finished"
    );

    Ok(result)
}
