//! Extractor and runner error types.

use thiserror::Error;

/// The submitted source is not syntactically valid enough to scan.
///
/// Carries the byte offset where scanning failed so graders can surface a
/// precise comment.
#[derive(Debug, Error)]
#[error("parse error at byte {offset}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Infrastructure failures of the sandboxed test runner.
///
/// These are never scored as test failures: a missing tool or a process that
/// could not be launched says nothing about the student's code.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// A required external tool (node, mocha) is not available.
    #[error("required tooling unavailable: {0}")]
    ToolingUnavailable(String),

    /// The test process could not be launched.
    #[error("failed to launch test process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
