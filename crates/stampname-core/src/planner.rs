use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::allocator::{NameAllocator, RenameKind, RenameOp};
use crate::date::metadata;
use crate::date::name::{self, NameParse};
use crate::date::reconcile::{
    classify, resolve, CarriedStamp, ConflictPolicy, Decision, ReconciliationOutcome, Resolution,
};
use crate::date::{NameStyle, TimestampToken};
use crate::description::Description;
use crate::error::Error;
use crate::media::{MediaFile, MediaKind};
use crate::reader::MetadataReader;

/// Run-wide settings that shape every generated name.
#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub style: NameStyle,
    pub description: Description,
    /// Increment the previous timestamp for files that have none.
    pub fallback: bool,
}

/// Everything that was tried, found and chosen for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileDecision {
    pub original: String,
    pub kind: MediaKind,
    pub name: NameParse,
    pub metadata: Option<TimestampToken>,
    pub outcome: ReconciliationOutcome,
    pub resolution: Option<Resolution>,
    /// Name the file ends up with, after any later "00" promotion.
    pub final_name: Option<String>,
    pub counter_index: Option<u32>,
}

/// Ordered renames for one directory plus the per-file audit trail.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenamePlan {
    pub decisions: Vec<FileDecision>,
    pub ops: Vec<RenameOp>,
}

impl RenamePlan {
    pub fn promotions(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| op.kind == RenameKind::Promote)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| d.outcome == ReconciliationOutcome::SkipAlreadyProcessed)
            .count()
    }
}

/// Fold the directory listing into a rename plan without touching the disk.
///
/// Fails on the first file that cannot be classified or dated, before any
/// rename has been performed.
pub fn plan(
    dir: &Path,
    listing: &[String],
    reader: &dyn MetadataReader,
    policy: &mut ConflictPolicy<'_>,
    settings: &PlanSettings,
) -> Result<RenamePlan, Error> {
    let mut allocator = NameAllocator::new(listing.iter().cloned(), settings.style);
    let mut carried = CarriedStamp::new(settings.fallback);
    let mut plan = RenamePlan::default();
    // current name -> index into plan.decisions, to follow promotions
    let mut holders: HashMap<String, usize> = HashMap::new();
    // promotions of files not yet reached in the listing
    let mut promoted_ahead: HashMap<String, String> = HashMap::new();

    for filename in listing {
        let file = MediaFile::new(dir, filename);
        if file.kind == MediaKind::Unrecognized {
            tracing::error!(file = %filename, "file type not recognized");
            return Err(Error::UnrecognizedKind {
                file: filename.clone(),
            });
        }
        name::source_hint(&file);

        let name_result = name::parse(&file.stem);
        let meta_result = match name_result {
            // already renamed files are not even opened
            NameParse::AlreadyCanonical => None,
            _ => metadata::read(&file, reader),
        };

        let outcome = classify(&name_result, meta_result.as_ref());
        let decision = resolve(filename, outcome.clone(), policy, &mut carried)?;

        let mut record = FileDecision {
            original: filename.clone(),
            kind: file.kind,
            name: name_result,
            metadata: meta_result,
            outcome,
            resolution: None,
            final_name: None,
            counter_index: None,
        };

        if let Decision::Use(resolution) = decision {
            let stamp = resolution.token.render(settings.style);
            let (candidate, promoted) = allocator.allocate(
                &stamp,
                settings.description.as_str(),
                &file.extension,
            );

            if let Some(op) = promoted {
                match holders.remove(&op.from) {
                    Some(idx) => {
                        plan.decisions[idx].final_name = Some(op.to.clone());
                        plan.decisions[idx].counter_index = Some(1);
                        holders.insert(op.to.clone(), idx);
                    }
                    None => {
                        promoted_ahead.insert(op.from.clone(), op.to.clone());
                    }
                }
                plan.ops.push(op);
            }

            allocator.release(filename);
            plan.ops.push(RenameOp {
                from: filename.clone(),
                to: candidate.name.clone(),
                kind: RenameKind::Allocate,
            });

            holders.insert(candidate.name.clone(), plan.decisions.len());
            record.final_name = Some(candidate.name);
            record.counter_index = Some(candidate.index);
            record.resolution = Some(resolution);
        } else {
            // already named: it keeps its name unless a later file promotes it
            if let Some(stamp) = name::canonical_stamp(&file.stem) {
                carried.observe(&stamp);
            }
            match promoted_ahead.remove(filename) {
                Some(to) => {
                    record.final_name = Some(to);
                    record.counter_index = Some(1);
                }
                None => {
                    holders.insert(filename.clone(), plan.decisions.len());
                    record.final_name = Some(filename.clone());
                }
            }
        }

        plan.decisions.push(record);
    }

    Ok(plan)
}
