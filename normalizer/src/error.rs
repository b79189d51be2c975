//! Normalizer error types.
//!
//! Every error here is scoped to a single upload: the batch loop logs the
//! failure for that submission and moves on. Structure errors ([`NormalizeError::AmbiguousStructure`],
//! [`NormalizeError::EmptyStructure`], [`NormalizeError::CyclicStructure`])
//! mean the archive's content root could not be resolved and the student's
//! workspace was left untouched.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// More than one sibling subdirectory and no files at one level of the
    /// extracted tree; there is no single content root to pick.
    #[error("ambiguous archive layout: {0} sibling directories and no files at the same level")]
    AmbiguousStructure(usize),

    /// The extracted tree contains neither files nor subdirectories.
    #[error("empty archive: no files or directories found")]
    EmptyStructure,

    /// Directory traversal revisited a directory (symlink cycle).
    #[error("cyclic directory structure under {}", .0.display())]
    CyclicStructure(PathBuf),

    /// The archive's total uncompressed size exceeds the configured cap.
    #[error("archive too large when decompressed (limit {limit} bytes)")]
    ArchiveTooLarge { limit: u64 },

    /// An archive entry's path would escape the extraction root.
    #[error("unsafe path in archive: {0}")]
    UnsafeArchivePath(String),

    /// The upload has an archive extension the normalizer cannot extract.
    #[error("unsupported archive format: {0}")]
    UnsupportedArchive(String),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl NormalizeError {
    /// True for the structure errors of the content-root locator.
    pub fn is_structure_error(&self) -> bool {
        matches!(
            self,
            NormalizeError::AmbiguousStructure(_)
                | NormalizeError::EmptyStructure
                | NormalizeError::CyclicStructure(_)
        )
    }
}
