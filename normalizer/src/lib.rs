//! # Submission Normalizer
//!
//! Takes a batch of inconsistently packaged student uploads (archives or loose
//! files, named by an upstream system) and produces one canonical workspace
//! directory per student.
//!
//! Archives are extracted into a private temporary area, the real content root
//! is resolved with [`locate::locate_content_root`], and the content is merged
//! into the student's workspace. Loose files have their real filename derived
//! from the upstream naming convention in [`naming`]. Merging never silently
//! overwrites: a name collision keeps the first-seen content and records a
//! conflict warning on the outcome.
//!
//! Every failure is scoped to a single upload. A structure error aborts that
//! upload with the workspace untouched; the batch continues with the next one.

pub mod archive;
pub mod error;
pub mod locate;
pub mod naming;

use crate::archive::{extract_archive, is_archive_name};
use crate::error::NormalizeError;
use crate::locate::locate_content_root;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, warn};
use util::config::GraderConfig;
use util::filters::is_hidden;
use util::paths::{ensure_dir, student_dir};

/// How an upload is packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Archive,
    Loose,
}

/// One raw upload as discovered in the submissions directory.
#[derive(Debug, Clone)]
pub struct RawUpload {
    /// Path to the uploaded file.
    pub path: PathBuf,
    /// Archive or loose file, decided by the filename extension.
    pub kind: UploadKind,
    /// Owning student, derived from the filename's first token.
    pub student: String,
}

/// The result of normalizing one upload into a workspace.
#[derive(Debug)]
pub struct NormalizationOutcome {
    /// Owning student identifier.
    pub student: String,
    /// Workspace entries written by this normalization pass.
    pub copied: Vec<String>,
    /// Non-fatal conflict warnings (first-write-wins collisions).
    pub conflicts: Vec<String>,
}

/// Normalizes raw uploads into per-student workspaces under a target root.
pub struct Normalizer {
    target_root: PathBuf,
    config: GraderConfig,
}

impl Normalizer {
    pub fn new(target_root: PathBuf, config: GraderConfig) -> Self {
        Self {
            target_root,
            config,
        }
    }

    /// Enumerates uploads in a submissions directory.
    ///
    /// Hidden files and subdirectories are skipped. Results are sorted by
    /// filename so batch processing order is deterministic.
    pub fn discover_uploads(&self, submissions_dir: &Path) -> io::Result<Vec<RawUpload>> {
        let mut uploads = Vec::new();

        for entry in fs::read_dir(submissions_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()).map(String::from)
            else {
                continue;
            };
            if is_hidden(&file_name) {
                continue;
            }

            let student = naming::student_token(&file_name, &self.config.naming).to_string();
            let kind = if is_archive_name(&file_name) {
                UploadKind::Archive
            } else {
                UploadKind::Loose
            };
            uploads.push(RawUpload {
                path,
                kind,
                student,
            });
        }

        uploads.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(uploads)
    }

    /// Normalizes one upload into its student's workspace.
    ///
    /// On a structure error the workspace is left exactly as it was; it is
    /// never partially populated from an unresolvable archive.
    pub fn normalize(&self, upload: &RawUpload) -> Result<NormalizationOutcome, NormalizeError> {
        let workspace = student_dir(&self.target_root, &upload.student);
        let mut outcome = NormalizationOutcome {
            student: upload.student.clone(),
            copied: Vec::new(),
            conflicts: Vec::new(),
        };

        match upload.kind {
            UploadKind::Archive => self.normalize_archive(upload, &workspace, &mut outcome)?,
            UploadKind::Loose => self.normalize_loose(upload, &workspace, &mut outcome)?,
        }

        Ok(outcome)
    }

    /// Discovers and normalizes every upload in a submissions directory.
    ///
    /// A failed upload is logged and reported in its slot; it never aborts the
    /// rest of the batch.
    pub fn normalize_batch(
        &self,
        submissions_dir: &Path,
    ) -> io::Result<Vec<(RawUpload, Result<NormalizationOutcome, NormalizeError>)>> {
        let uploads = self.discover_uploads(submissions_dir)?;
        let mut results = Vec::with_capacity(uploads.len());

        for upload in uploads {
            let result = self.normalize(&upload);
            if let Err(e) = &result {
                error!(
                    upload = %upload.path.display(),
                    student = %upload.student,
                    "failed to normalize upload: {e}"
                );
            }
            results.push((upload, result));
        }

        Ok(results)
    }

    fn normalize_archive(
        &self,
        upload: &RawUpload,
        workspace: &Path,
        outcome: &mut NormalizationOutcome,
    ) -> Result<(), NormalizeError> {
        // TempDir removes the extraction area on every exit path.
        let extract_dir = tempfile::Builder::new()
            .prefix("submission-extract-")
            .tempdir()?;

        extract_archive(
            &upload.path,
            extract_dir.path(),
            self.config.execution.max_uncompressed_size,
        )?;

        let content_root = locate_content_root(extract_dir.path())?;

        // The workspace is only created once the archive is known resolvable.
        ensure_dir(workspace)?;
        let mut entries: Vec<_> = fs::read_dir(&content_root)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|e| e.path())
            .collect();
        entries.sort();

        for source in entries {
            let Some(name) = source.file_name().and_then(|n| n.to_str()).map(String::from)
            else {
                continue;
            };
            let target = workspace.join(&name);

            if target.exists() {
                warn!(
                    student = %outcome.student,
                    entry = %name,
                    "workspace entry already exists, keeping first-seen content"
                );
                outcome.conflicts.push(name);
                continue;
            }

            if source.is_dir() {
                copy_dir_all(&source, &target)?;
            } else {
                fs::copy(&source, &target)?;
            }
            outcome.copied.push(name);
        }

        Ok(())
    }

    fn normalize_loose(
        &self,
        upload: &RawUpload,
        workspace: &Path,
        outcome: &mut NormalizationOutcome,
    ) -> Result<(), NormalizeError> {
        let file_name = upload
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let derived = naming::submitted_file_name(file_name, &self.config.naming);

        if derived.is_empty() {
            warn!(
                student = %outcome.student,
                upload = %file_name,
                "could not derive a filename from the upload name, skipping"
            );
            outcome.conflicts.push(file_name.to_string());
            return Ok(());
        }

        ensure_dir(workspace)?;
        let target = workspace.join(&derived);
        if target.exists() {
            warn!(
                student = %outcome.student,
                entry = %derived,
                "workspace entry already exists, keeping first-seen content"
            );
            outcome.conflicts.push(derived);
            return Ok(());
        }

        fs::copy(&upload.path, &target)?;
        outcome.copied.push(derived);
        Ok(())
    }
}

/// Recursively copies a directory tree.
fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
