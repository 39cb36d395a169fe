//! Turns command-line paths into upload candidates.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use codechat_core::ingest::FileCandidate;

/// Expands `paths` into file candidates. Directories are walked
/// recursively, skipping hidden entries; admission filtering happens later.
pub fn collect_candidates(paths: &[PathBuf]) -> Result<Vec<FileCandidate>> {
    let mut candidates = Vec::new();
    for path in paths {
        collect(path, &mut candidates)?;
    }
    Ok(candidates)
}

fn collect(path: &Path, out: &mut Vec<FileCandidate>) -> Result<()> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;

    if metadata.is_dir() {
        let mut entries = std::fs::read_dir(path)
            .with_context(|| format!("Cannot list {}", path.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|child| !is_hidden(child))
            .collect::<Vec<_>>();
        entries.sort();
        for child in entries {
            collect(&child, out)?;
        }
    } else {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        out.push(FileCandidate::new(name, path, metadata.len()));
    }
    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}
