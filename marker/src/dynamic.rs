//! Dynamic execution grader.
//!
//! Scores one function of the submission by extracting the allow-listed
//! functions from the student's script, running the hidden test suite scoped
//! to this criterion's describe block, and translating the run outcome
//! through the criterion's deduction table.

use crate::deductions::DeductionTable;
use crate::traits::criterion::Criterion;
use crate::types::GradingResult;
use async_trait::async_trait;
use code_runner::{TestRunner, extract};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};
use util::paths::find_file_by_extension;

/// A rubric criterion scored by executing extracted student code against a
/// hidden test suite.
pub struct DynamicExecutionGrader {
    name: String,
    max_points: f64,
    /// Name of this criterion's describe block in the hidden suite.
    suite: String,
    /// The full allow-list; extraction always retains every graded function so
    /// the synthesized module is identical across criteria.
    allowed_functions: Vec<&'static str>,
    template: PathBuf,
    runner: Arc<TestRunner>,
    deductions: DeductionTable,
}

impl DynamicExecutionGrader {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        max_points: f64,
        suite: impl Into<String>,
        allowed_functions: Vec<&'static str>,
        template: PathBuf,
        runner: Arc<TestRunner>,
        deductions: DeductionTable,
    ) -> Self {
        Self {
            name: name.into(),
            max_points,
            suite: suite.into(),
            allowed_functions,
            template,
            runner,
            deductions,
        }
    }
}

#[async_trait]
impl Criterion for DynamicExecutionGrader {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_points(&self) -> f64 {
        self.max_points
    }

    async fn grade(&self, workspace: &Path) -> GradingResult {
        let Some(script) = find_file_by_extension(workspace, "js") else {
            return GradingResult::zero("No script file found in submission", self.max_points);
        };

        let source = match fs::read_to_string(&script) {
            Ok(source) => source,
            Err(e) => {
                return GradingResult::zero(
                    format!("Could not read submitted script: {e}"),
                    self.max_points,
                );
            }
        };

        let module = match extract(&source, &self.allowed_functions) {
            Ok(module) => module,
            Err(e) => {
                debug!(criterion = %self.name, "submission failed to parse: {e}");
                return GradingResult::zero(
                    format!("Failed to parse submitted script: {e}"),
                    self.max_points,
                );
            }
        };

        match self
            .runner
            .run(&module, &self.template, Some(&self.suite))
            .await
        {
            Ok(outcome) => self.deductions.apply(&outcome, self.max_points),
            Err(e) => {
                // Infrastructure failure, not a judgement on the code.
                error!(criterion = %self.name, "hidden test run could not execute: {e}");
                GradingResult::zero(
                    format!("Could not execute hidden tests: {e}"),
                    self.max_points,
                )
            }
        }
    }
}
