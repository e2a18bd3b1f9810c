use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::date::NameStyle;

/// A final file name and the counter that produced it: 0 for the bare
/// name, `n + 1` for counter `n` (so 1 is the retroactive "00").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCandidate {
    pub name: String,
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenameKind {
    /// A processed file moves to its allocated name.
    Allocate,
    /// The earlier holder of a bare name moves to its "00" name.
    Promote,
}

/// One rename inside the target directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOp {
    pub from: String,
    pub to: String,
    pub kind: RenameKind,
}

/// Hands out collision-free names, mirroring the directory contents in
/// memory so that later allocations see earlier ones.
///
/// Names are compared case-insensitively, as on the filesystems most
/// photo libraries live on; `IMG.JPG` and `img.jpg` collide.
#[derive(Debug, Clone)]
pub struct NameAllocator {
    /// case-folded name -> name as it appears on disk
    existing: HashMap<String, String>,
    style: NameStyle,
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

impl NameAllocator {
    pub fn new<I, S>(existing: I, style: NameStyle) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            existing: existing
                .into_iter()
                .map(|name| {
                    let name = name.into();
                    (fold(&name), name)
                })
                .collect(),
            style,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.existing.contains_key(&fold(name))
    }

    /// Forget a name that is about to disappear from the directory.
    pub fn release(&mut self, name: &str) {
        self.existing.remove(&fold(name));
    }

    fn record(&mut self, name: &str) {
        self.existing.insert(fold(name), name.to_string());
    }

    /// Allocate a name for `stamp` + `description` + `extension`.
    ///
    /// The first time a second file shows up for the same stamp, the holder
    /// of the bare name is moved to counter "00" (returned as a `Promote`
    /// op) and the new file gets "01". After that, counters continue at the
    /// first free value.
    pub fn allocate(
        &mut self,
        stamp: &str,
        description: &str,
        extension: &str,
    ) -> (NameCandidate, Option<RenameOp>) {
        let base = format!("{}{}{}", stamp, description, extension);
        let zero = self.with_counter(stamp, 0, description, extension);

        if !self.contains(&base) && !self.contains(&zero) {
            self.record(&base);
            return (NameCandidate { name: base, index: 0 }, None);
        }

        let promoted = if self.contains(&zero) {
            None
        } else {
            // the holder keeps its own extension spelling
            let holder = self.existing.remove(&fold(&base)).unwrap_or(base);
            let holder_ext = match Path::new(&holder).extension().and_then(|e| e.to_str()) {
                Some(ext) if !extension.is_empty() => format!(".{}", ext),
                _ => extension.to_string(),
            };
            let to = self.with_counter(stamp, 0, description, &holder_ext);
            tracing::info!(from = %holder, to = %to, "first collision, renaming existing file");
            self.record(&to);
            Some(RenameOp {
                from: holder,
                to,
                kind: RenameKind::Promote,
            })
        };

        let mut counter = 1u32;
        let name = loop {
            let candidate = self.with_counter(stamp, counter, description, extension);
            if !self.contains(&candidate) {
                break candidate;
            }
            tracing::debug!(candidate = %candidate, "already exists, incrementing counter");
            counter += 1;
        };

        self.record(&name);
        (
            NameCandidate {
                name,
                index: counter + 1,
            },
            promoted,
        )
    }

    fn with_counter(&self, stamp: &str, counter: u32, description: &str, extension: &str) -> String {
        format!(
            "{}{}{:02}{}{}",
            stamp,
            self.style.separator(),
            counter,
            description,
            extension
        )
    }
}
