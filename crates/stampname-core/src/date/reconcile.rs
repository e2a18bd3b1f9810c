use serde::{Deserialize, Serialize};

use super::name::NameParse;
use super::TimestampToken;
use crate::error::Error;

/// How the name- and metadata-derived timestamps of one file relate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ReconciliationOutcome {
    Agreed { token: TimestampToken },
    NameOnly { token: TimestampToken },
    MetadataOnly { token: TimestampToken },
    BothAbsent,
    Conflict { name: TimestampToken, metadata: TimestampToken },
    SkipAlreadyProcessed,
}

/// What to do when name and metadata disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    #[default]
    PreferMetadata,
    PreferName,
    Interactive,
}

/// One of the two answers an operator may give to a conflict prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Selection {
    Metadata,
    Name,
}

impl Selection {
    /// `1` selects the metadata timestamp, `2` the name timestamp.
    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer.trim() {
            "1" => Some(Selection::Metadata),
            "2" => Some(Selection::Name),
            _ => None,
        }
    }
}

/// Asks a human to settle a conflict. Implementations return the raw answer;
/// anything other than a valid selector is asked again.
pub trait ConflictChooser {
    fn ask(
        &mut self,
        file: &str,
        name: &TimestampToken,
        metadata: &TimestampToken,
    ) -> Result<String, Error>;
}

pub enum ConflictPolicy<'c> {
    PreferMetadata,
    PreferName,
    Interactive(&'c mut dyn ConflictChooser),
}

impl ConflictPolicy<'_> {
    fn label(&self) -> &'static str {
        match self {
            ConflictPolicy::PreferMetadata => "prefer-metadata",
            ConflictPolicy::PreferName => "prefer-name",
            ConflictPolicy::Interactive(_) => "interactive",
        }
    }
}

/// Where the final timestamp of a file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    Agreed,
    Name,
    Metadata,
    NameByPolicy,
    MetadataByPolicy,
    Operator(Selection),
    /// Previous file's timestamp plus one second.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub token: TimestampToken,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip,
    Use(Resolution),
}

/// Last complete timestamp seen in this run, used when a file has none.
#[derive(Debug, Clone, Default)]
pub struct CarriedStamp {
    last: Option<TimestampToken>,
    enabled: bool,
}

impl CarriedStamp {
    pub fn new(enabled: bool) -> Self {
        Self {
            last: None,
            enabled,
        }
    }

    pub fn last(&self) -> Option<&TimestampToken> {
        self.last.as_ref()
    }

    /// Remember `token` as the latest timestamp; partial tokens are ignored.
    pub fn observe(&mut self, token: &TimestampToken) {
        if token.is_complete() {
            self.last = Some(token.clone());
        }
    }

    fn next(&self) -> Option<TimestampToken> {
        if !self.enabled {
            return None;
        }
        self.last.as_ref()?.next_second()
    }
}

pub fn classify(name: &NameParse, metadata: Option<&TimestampToken>) -> ReconciliationOutcome {
    match (name, metadata) {
        (NameParse::AlreadyCanonical, _) => ReconciliationOutcome::SkipAlreadyProcessed,
        (NameParse::Found(n), Some(m)) if n == m => ReconciliationOutcome::Agreed { token: m.clone() },
        (NameParse::Found(n), Some(m)) => ReconciliationOutcome::Conflict {
            name: n.clone(),
            metadata: m.clone(),
        },
        (NameParse::Found(n), None) => ReconciliationOutcome::NameOnly { token: n.clone() },
        (NameParse::Absent, Some(m)) => ReconciliationOutcome::MetadataOnly { token: m.clone() },
        (NameParse::Absent, None) => ReconciliationOutcome::BothAbsent,
    }
}

/// Turn an outcome into one timestamp, applying `policy` to conflicts and
/// the carried-forward stamp to files without any timestamp.
pub fn resolve(
    file: &str,
    outcome: ReconciliationOutcome,
    policy: &mut ConflictPolicy<'_>,
    carried: &mut CarriedStamp,
) -> Result<Decision, Error> {
    let resolution = match outcome {
        ReconciliationOutcome::SkipAlreadyProcessed => return Ok(Decision::Skip),
        ReconciliationOutcome::Agreed { token } => {
            tracing::debug!(file, token = %token, "name and metadata agree");
            Resolution {
                token,
                provenance: Provenance::Agreed,
            }
        }
        ReconciliationOutcome::NameOnly { token } => {
            tracing::warn!(file, token = %token, "no timestamp in metadata, using the name");
            Resolution {
                token,
                provenance: Provenance::Name,
            }
        }
        ReconciliationOutcome::MetadataOnly { token } => {
            tracing::warn!(file, token = %token, "no timestamp in name, using metadata");
            Resolution {
                token,
                provenance: Provenance::Metadata,
            }
        }
        ReconciliationOutcome::Conflict { name, metadata } => {
            settle_conflict(file, name, metadata, policy)?
        }
        ReconciliationOutcome::BothAbsent => {
            let Some(token) = carried.next() else {
                tracing::error!(file, last = ?carried.last().map(|t| t.to_string()), "no valid timestamp");
                return Err(Error::NoTimestamp {
                    file: file.to_string(),
                });
            };
            tracing::warn!(file, token = %token, "no timestamp at all, incrementing the previous one");
            Resolution {
                token,
                provenance: Provenance::Fallback,
            }
        }
    };

    carried.observe(&resolution.token);
    Ok(Decision::Use(resolution))
}

/// Classify and resolve in one step.
pub fn reconcile(
    file: &str,
    name: &NameParse,
    metadata: Option<&TimestampToken>,
    policy: &mut ConflictPolicy<'_>,
    carried: &mut CarriedStamp,
) -> Result<Decision, Error> {
    resolve(file, classify(name, metadata), policy, carried)
}

fn settle_conflict(
    file: &str,
    name: TimestampToken,
    metadata: TimestampToken,
    policy: &mut ConflictPolicy<'_>,
) -> Result<Resolution, Error> {
    let label = policy.label();
    let (selection, provenance) = match policy {
        ConflictPolicy::PreferMetadata => (Selection::Metadata, Provenance::MetadataByPolicy),
        ConflictPolicy::PreferName => (Selection::Name, Provenance::NameByPolicy),
        ConflictPolicy::Interactive(chooser) => loop {
            let answer = chooser.ask(file, &name, &metadata)?;
            match Selection::from_answer(&answer) {
                Some(selection) => break (selection, Provenance::Operator(selection)),
                None => tracing::warn!(file, answer = answer.trim(), "answer 1 (metadata) or 2 (name)"),
            }
        },
    };

    tracing::warn!(
        file,
        name_ts = %name,
        meta_ts = %metadata,
        policy = label,
        chosen = ?selection,
        "name and metadata timestamps disagree"
    );

    let token = match selection {
        Selection::Metadata => metadata,
        Selection::Name => name,
    };
    Ok(Resolution { token, provenance })
}
