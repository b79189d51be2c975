use crate::types::GradingResult;
use async_trait::async_trait;
use std::path::Path;

/// Criterion is the single capability every rubric item implements.
///
/// The engine holds an ordered collection of this trait and nothing else;
/// static content checks and dynamic execution graders differ only in
/// implementation, never in contract. Implementations must be stateless
/// across submissions and must treat the workspace as read-only.
#[async_trait]
pub trait Criterion: Send + Sync {
    /// The criterion's display name, used as the report key.
    fn name(&self) -> &str;

    /// The maximum points this criterion can award.
    fn max_points(&self) -> f64;

    /// Scores one student workspace.
    ///
    /// Never fails: every failure mode (missing file, parse error, test
    /// failure, infrastructure error) maps to a `GradingResult` with
    /// explanatory comments, so one bad submission can never abort a batch.
    async fn grade(&self, workspace: &Path) -> GradingResult;
}
