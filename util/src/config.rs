//! Grader configuration.
//!
//! [`GraderConfig`] holds the tunable knobs shared by the normalizer and the
//! test runner: execution limits for the sandboxed child process and the
//! upstream filename convention used to split loose uploads into tokens.
//! Configuration is loaded from a JSON file (every field optional, falling
//! back to a default) and passed explicitly into the components that need it;
//! there is no process-wide configuration state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Limits applied to a single hidden-test execution.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionLimits {
    /// Hard wall-clock timeout for one child process, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cap on the total uncompressed size of one submission archive, in bytes.
    #[serde(default = "default_max_uncompressed_size")]
    pub max_uncompressed_size: u64,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_uncompressed_size: default_max_uncompressed_size(),
        }
    }
}

/// The upstream naming convention for loose (non-archive) uploads.
///
/// Filenames arrive as delimiter-separated tokens. The first token is the
/// student identifier. The token at `late_marker_index` may be an extra
/// numeric marker flagging a late submission, which shifts the start of the
/// real filename by one token.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamingPolicy {
    /// Token delimiter used by the upstream system.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Zero-based index of the possible late-submission marker token.
    #[serde(default = "default_late_marker_index")]
    pub late_marker_index: usize,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            late_marker_index: default_late_marker_index(),
        }
    }
}

/// Complete grader configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GraderConfig {
    #[serde(default)]
    pub execution: ExecutionLimits,

    #[serde(default)]
    pub naming: NamingPolicy,
}

impl GraderConfig {
    /// Loads the configuration from a JSON file.
    ///
    /// Missing fields take their defaults; a missing or malformed file is an
    /// error so that a typo'd path never silently grades with defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
        serde_json::from_str(&raw)
            .map_err(|e| format!("Invalid config file {}: {}", path.display(), e))
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_uncompressed_size() -> u64 {
    50 * 1024 * 1024
}

fn default_delimiter() -> String {
    "_".to_string()
}

fn default_late_marker_index() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_values() {
        let config = GraderConfig::default();
        assert_eq!(config.execution.timeout_secs, 10);
        assert_eq!(config.execution.max_uncompressed_size, 50 * 1024 * 1024);
        assert_eq!(config.naming.delimiter, "_");
        assert_eq!(config.naming.late_marker_index, 3);
    }

    #[test]
    fn partial_file_fills_missing_fields_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "execution": {{ "timeout_secs": 30 }} }}"#).unwrap();

        let config = GraderConfig::from_file(file.path()).unwrap();
        assert_eq!(config.execution.timeout_secs, 30);
        assert_eq!(config.execution.max_uncompressed_size, 50 * 1024 * 1024);
        assert_eq!(config.naming.late_marker_index, 3);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(GraderConfig::from_file("/definitely/not/here.json").is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(GraderConfig::from_file(file.path()).is_err());
    }
}
