//! Filename and metadata filters.
//!
//! Upstream systems and platform archiving tools leave artifacts that must
//! never be treated as submission content: hidden files in the submissions
//! directory, resource-fork folders inside macOS-produced zips, and desktop
//! metadata files. These predicates are shared by upload discovery, archive
//! extraction, and content-root location so all three agree on what counts.

/// Directory names created by platform archiving tools, never real content.
pub const METADATA_DIR_NAMES: &[&str] = &["__MACOSX"];

/// File names created by desktop environments, never real content.
pub const METADATA_FILE_NAMES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Returns true for hidden names (leading `.`), which upload discovery skips.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Returns true if `name` is a platform metadata directory.
pub fn is_metadata_dir(name: &str) -> bool {
    METADATA_DIR_NAMES.contains(&name)
}

/// Returns true if `name` is a platform metadata file.
pub fn is_metadata_file(name: &str) -> bool {
    METADATA_FILE_NAMES.contains(&name)
}

/// Returns true if an archive entry path should be skipped during extraction.
///
/// An entry is metadata when any of its components is a metadata directory or
/// its final component is a metadata file. Paths use either separator.
pub fn is_metadata_archive_entry(entry_path: &str) -> bool {
    let mut components = entry_path
        .split(['/', '\\'])
        .filter(|c| !c.is_empty())
        .peekable();

    while let Some(component) = components.next() {
        if is_metadata_dir(component) {
            return true;
        }
        if components.peek().is_none() && is_metadata_file(component) {
            return true;
        }
    }
    false
}
