//! Archive content-root locator.
//!
//! Archiving tools routinely wrap a submission in one or more levels of
//! directories (`jsmith_project/project/…`), and sometimes in none at all.
//! [`locate_content_root`] resolves that inconsistency with a deterministic
//! rule applied level by level, after platform metadata entries are filtered
//! out:
//!
//! - any files at the current level → this is the content root;
//! - exactly one subdirectory and no files → descend;
//! - multiple subdirectories and no files → ambiguous, unresolvable;
//! - nothing at all → empty, unresolvable.

use crate::error::NormalizeError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use util::filters::{is_metadata_dir, is_metadata_file};

/// Finds the directory under `root` that holds the actual submission files.
///
/// Terminates on arbitrarily deep nesting; a symlink cycle is detected via a
/// visited set over canonicalized paths and reported as
/// [`NormalizeError::CyclicStructure`].
pub fn locate_content_root(root: &Path) -> Result<PathBuf, NormalizeError> {
    let mut current = root.to_path_buf();
    let mut visited: HashSet<PathBuf> = HashSet::new();

    loop {
        let canonical = fs::canonicalize(&current)?;
        if !visited.insert(canonical) {
            return Err(NormalizeError::CyclicStructure(current));
        }

        let mut subdirs: Vec<PathBuf> = Vec::new();
        let mut has_files = false;

        for entry in fs::read_dir(&current)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();

            // `is_dir` follows symlinks, so a symlinked directory is traversed
            // and caught by the visited set rather than miscounted as a file.
            let path = entry.path();
            if path.is_dir() {
                if !is_metadata_dir(&name) {
                    subdirs.push(path);
                }
            } else if !is_metadata_file(&name) {
                has_files = true;
            }
        }

        if has_files {
            return Ok(current);
        }

        match subdirs.len() {
            0 => return Err(NormalizeError::EmptyStructure),
            1 => current = subdirs.remove(0),
            n => return Err(NormalizeError::AmbiguousStructure(n)),
        }
    }
}
