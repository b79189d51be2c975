//! Archive extraction.
//!
//! Supports the containers the upstream system actually produces: `.zip` and
//! gzip-compressed tarballs. Extraction is defensive because archives are
//! student-controlled input: entry paths may not escape the extraction root,
//! the total uncompressed size is capped, and platform metadata entries are
//! dropped on the way out.

use crate::error::NormalizeError;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use util::filters::is_metadata_archive_entry;
use util::paths::ensure_parent_dir;
use zip::ZipArchive;

/// Returns true if the upload looks like an archive the normalizer can extract.
pub fn is_archive_name(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    lower.ends_with(".zip") || lower.ends_with(".tgz") || lower.ends_with(".tar.gz")
}

/// Extracts `archive` into `dest`, enforcing the uncompressed size cap.
pub fn extract_archive(
    archive: &Path,
    dest: &Path,
    max_uncompressed: u64,
) -> Result<(), NormalizeError> {
    let file_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = file_name.to_ascii_lowercase();

    if lower.ends_with(".zip") {
        let bytes = std::fs::read(archive)?;
        extract_zip(&bytes, dest, max_uncompressed)
    } else if lower.ends_with(".tgz") || lower.ends_with(".tar.gz") {
        extract_tar_gz(archive, dest, max_uncompressed)
    } else {
        Err(NormalizeError::UnsupportedArchive(file_name))
    }
}

/// Extracts a zip archive, checking for size overruns and zip-slip paths.
fn extract_zip(zip_bytes: &[u8], dest: &Path, max_uncompressed: u64) -> Result<(), NormalizeError> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))?;
    let mut total_uncompressed = 0u64;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        total_uncompressed += entry.size();

        if total_uncompressed > max_uncompressed {
            return Err(NormalizeError::ArchiveTooLarge {
                limit: max_uncompressed,
            });
        }

        let raw_name = entry.name().to_string();
        if raw_name.contains("..") || raw_name.starts_with('/') || raw_name.contains('\\') {
            return Err(NormalizeError::UnsafeArchivePath(raw_name));
        }
        if is_metadata_archive_entry(&raw_name) {
            continue;
        }

        let outpath = dest.join(&raw_name);
        if raw_name.ends_with('/') {
            std::fs::create_dir_all(&outpath)?;
        } else {
            ensure_parent_dir(&outpath)?;
            let mut outfile = File::create(&outpath)?;
            std::io::copy(&mut entry, &mut outfile)?;
        }
    }

    Ok(())
}

/// Extracts a gzip-compressed tarball with the same guarantees as [`extract_zip`].
fn extract_tar_gz(archive: &Path, dest: &Path, max_uncompressed: u64) -> Result<(), NormalizeError> {
    let file = File::open(archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    let mut total_uncompressed = 0u64;

    for entry in tar.entries()? {
        let mut entry = entry?;
        total_uncompressed += entry.header().size()?;

        if total_uncompressed > max_uncompressed {
            return Err(NormalizeError::ArchiveTooLarge {
                limit: max_uncompressed,
            });
        }

        let raw_name = entry.path()?.to_string_lossy().into_owned();
        if raw_name.contains("..") || raw_name.starts_with('/') || raw_name.contains('\\') {
            return Err(NormalizeError::UnsafeArchivePath(raw_name));
        }
        if is_metadata_archive_entry(&raw_name) {
            continue;
        }

        // unpack_in re-checks containment against dest.
        entry.unpack_in(dest)?;
    }

    Ok(())
}
