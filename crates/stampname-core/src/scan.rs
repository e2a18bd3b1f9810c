use std::fs;
use std::path::Path;

/// Names of the plain, non-hidden files directly inside `dir`, sorted so the
/// processing order is the same on every run.
pub fn list_directory(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(file = ?entry.file_name(), "skipping file with non UTF-8 name");
            continue;
        };

        if name.starts_with('.') {
            continue;
        }

        names.push(name);
    }

    names.sort();
    Ok(names)
}
