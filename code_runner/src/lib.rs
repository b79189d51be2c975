//! Code extraction and sandboxed hidden-test execution.
//!
//! Two halves, used together by the dynamic execution grader:
//!
//! - [`extractor`]: pulls allow-listed top-level function declarations out of
//!   untrusted student source and synthesizes a minimal module from them.
//! - [`runner`]: executes the hidden test template against that module in an
//!   isolated, time-bounded child process and reports a structured outcome.

pub mod error;
pub mod extractor;
pub mod runner;

pub use error::{ParseError, RunnerError};
pub use extractor::{ExtractedFunctionSet, extract};
pub use runner::{TestRunOutcome, TestRunner};
