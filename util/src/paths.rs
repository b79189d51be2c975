//! Path helpers shared across the grading pipeline.

use crate::filters::is_hidden;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Create a directory (and all parents) if it doesn't exist, and return the path.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let p = path.as_ref();
    fs::create_dir_all(p)?;
    Ok(p.to_path_buf())
}

/// Ensure the parent directory of a *file path* exists (no-op if none).
pub fn ensure_parent_dir<P: AsRef<Path>>(file_path: P) -> io::Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// A single student's workspace: `{target_root}/{student}`.
pub fn student_dir(target_root: &Path, student: &str) -> PathBuf {
    target_root.join(student)
}

/// Returns the first file with the given extension in `dir`, or `None`.
///
/// Hidden files are ignored. Matches are resolved lexicographically so the
/// result is deterministic regardless of directory iteration order.
pub fn find_file_by_extension(dir: &Path, extension: &str) -> Option<PathBuf> {
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| !is_hidden(n))
                .unwrap_or(false)
        })
        .filter(|p| p.extension().map(|ext| ext == extension).unwrap_or(false))
        .collect();
    matches.sort();
    matches.into_iter().next()
}
