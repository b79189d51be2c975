//! Batch driver abstraction.
//!
//! The batch loop is externally paced: a human marker may want to look at each
//! report before moving on, or stop grading partway through. The engine knows
//! nothing about pausing; it just asks the driver after each submission
//! whether to continue. Cancelling leaves every already-computed report in the
//! batch result.

use crate::report::SubmissionReport;

/// Decision returned by a driver after each submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchControl {
    /// Proceed to the next submission.
    Continue,
    /// Stop the batch; prior reports are kept.
    Cancel,
}

/// Paces the batch loop between submissions.
pub trait BatchDriver {
    /// Called after `student`'s report is computed and recorded.
    fn advance(&mut self, student: &str, report: &SubmissionReport) -> BatchControl;
}

/// A driver that never pauses and never cancels.
pub struct AutoAdvance;

impl BatchDriver for AutoAdvance {
    fn advance(&mut self, _student: &str, _report: &SubmissionReport) -> BatchControl {
        BatchControl::Continue
    }
}
