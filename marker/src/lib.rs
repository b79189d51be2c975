//! # Rubric Grading Engine
//!
//! Evaluates normalized student workspaces against an ordered rubric and
//! produces one structured report per submission.
//!
//! The engine is polymorphic over a single capability,
//! [`traits::criterion::Criterion`]; it holds criteria behind the trait and
//! never a concrete grader type. A submission missing a required file kind
//! short-circuits to a zero-score error report without running any criterion.
//! Batch processing is sequential and externally paced through
//! [`driver::BatchDriver`]; every failure mode is scoped to one submission or
//! one criterion, so a batch run always yields one report per submission
//! attempted.

pub mod deductions;
pub mod driver;
pub mod dynamic;
pub mod report;
pub mod rubrics;
pub mod traits;
pub mod types;

use crate::driver::{BatchControl, BatchDriver};
use crate::report::{BatchReport, CriterionReport, SubmissionReport, TotalScore};
use crate::traits::criterion::Criterion;
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

/// A file kind the rubric as a whole requires in every workspace.
pub struct RequiredFile {
    /// Extension to look for (no leading dot).
    pub extension: String,
    /// Human-readable kind used in error reports, e.g. "script".
    pub label: String,
}

/// An ordered rubric plus the file kinds it requires.
pub struct RubricEngine {
    criteria: Vec<Box<dyn Criterion>>,
    required: Vec<RequiredFile>,
}

impl RubricEngine {
    pub fn new() -> Self {
        Self {
            criteria: Vec::new(),
            required: Vec::new(),
        }
    }

    /// Appends a criterion; criteria run in insertion order.
    pub fn with_criterion(mut self, criterion: Box<dyn Criterion>) -> Self {
        self.criteria.push(criterion);
        self
    }

    /// Appends several criteria at once, preserving their order.
    pub fn with_criteria(mut self, criteria: Vec<Box<dyn Criterion>>) -> Self {
        self.criteria.extend(criteria);
        self
    }

    /// Requires one file with `extension` to be present in every workspace.
    pub fn require_file(mut self, extension: impl Into<String>, label: impl Into<String>) -> Self {
        self.required.push(RequiredFile {
            extension: extension.into(),
            label: label.into(),
        });
        self
    }

    /// Sum of all criteria's maximum points.
    pub fn max_total(&self) -> f64 {
        self.criteria.iter().map(|c| c.max_points()).sum()
    }

    /// Grades one workspace against the full rubric.
    ///
    /// The workspace is treated as read-only; criteria run independently and
    /// in fixed order.
    pub async fn grade_submission(&self, workspace: &Path) -> SubmissionReport {
        for required in &self.required {
            if util::paths::find_file_by_extension(workspace, &required.extension).is_none() {
                return SubmissionReport::Error {
                    error: format!("Missing required {} file", required.label),
                    total: TotalScore::zero(self.max_total()),
                };
            }
        }

        let mut criteria = Vec::with_capacity(self.criteria.len());
        let mut points = 0.0;
        for criterion in &self.criteria {
            let result = criterion.grade(workspace).await;
            points += result.points;
            criteria.push(CriterionReport::new(criterion.name(), result));
        }

        SubmissionReport::Graded {
            criteria,
            total: TotalScore::new(points, self.max_total()),
        }
    }

    /// Grades every student workspace under `workspace_root`.
    ///
    /// Workspaces are visited in sorted order, optionally rotated to begin at
    /// `start_from` (or the next student alphabetically, wrapping around).
    /// After each submission the driver decides whether to continue;
    /// cancellation keeps all reports computed so far.
    pub async fn grade_batch(
        &self,
        workspace_root: &Path,
        start_from: Option<&str>,
        driver: &mut dyn BatchDriver,
    ) -> io::Result<BatchReport> {
        let mut students: Vec<String> = fs::read_dir(workspace_root)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        students.sort();

        if let Some(start) = start_from {
            let pivot = students.partition_point(|s| s.as_str() < start);
            let len = students.len().max(1);
            students.rotate_left(pivot % len);
        }

        let mut batch = BatchReport::new();
        for student in students {
            let workspace = workspace_root.join(&student);
            let report = self.grade_submission(&workspace).await;
            info!(
                student = %student,
                points = report.total().points,
                max_points = report.total().max_points,
                "submission graded"
            );
            let control = driver.advance(&student, &report);
            batch.submissions.insert(student, report);
            if control == BatchControl::Cancel {
                break;
            }
        }

        Ok(batch)
    }
}

impl Default for RubricEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GradingResult;
    use async_trait::async_trait;

    /// Fixed-score criterion used to exercise the engine without a runner.
    struct FixedScore {
        name: &'static str,
        points: f64,
        max_points: f64,
    }

    #[async_trait]
    impl Criterion for FixedScore {
        fn name(&self) -> &str {
            self.name
        }

        fn max_points(&self) -> f64 {
            self.max_points
        }

        async fn grade(&self, _workspace: &Path) -> GradingResult {
            GradingResult::new(self.points, vec!["fixed".to_string()], self.max_points)
        }
    }

    fn engine() -> RubricEngine {
        RubricEngine::new()
            .with_criterion(Box::new(FixedScore {
                name: "Markup",
                points: 2.0,
                max_points: 2.0,
            }))
            .with_criterion(Box::new(FixedScore {
                name: "Styling",
                points: 1.0,
                max_points: 3.0,
            }))
            .with_criterion(Box::new(FixedScore {
                name: "Behavior",
                points: 6.0,
                max_points: 6.0,
            }))
            .require_file("html", "markup")
            .require_file("js", "script")
    }

    fn seed_workspace(root: &Path, student: &str, files: &[&str]) {
        let dir = root.join(student);
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), "content").unwrap();
        }
    }

    #[tokio::test]
    async fn full_rubric_aggregates_points_and_percentage() {
        let tmp = tempfile::tempdir().unwrap();
        seed_workspace(tmp.path(), "jsmith", &["index.html", "tasklist.js"]);

        let report = engine().grade_submission(&tmp.path().join("jsmith")).await;
        let SubmissionReport::Graded { criteria, total } = report else {
            panic!("expected graded report");
        };
        assert_eq!(criteria.len(), 3);
        assert_eq!(total.points, 9.0);
        assert_eq!(total.max_points, 11.0);
        assert_eq!(total.percentage, 81.82);
    }

    #[tokio::test]
    async fn missing_required_file_short_circuits_to_error_report() {
        let tmp = tempfile::tempdir().unwrap();
        // Markup present, script missing.
        seed_workspace(tmp.path(), "jsmith", &["index.html"]);

        let report = engine().grade_submission(&tmp.path().join("jsmith")).await;
        let SubmissionReport::Error { error, total } = report else {
            panic!("expected error report");
        };
        assert_eq!(error, "Missing required script file");
        assert_eq!(total.points, 0.0);
        assert_eq!(total.max_points, 11.0);
        assert_eq!(total.percentage, 0.0);
    }

    #[tokio::test]
    async fn batch_grades_every_student_in_sorted_order() {
        let tmp = tempfile::tempdir().unwrap();
        seed_workspace(tmp.path(), "zdoe", &["index.html", "tasklist.js"]);
        seed_workspace(tmp.path(), "abrown", &["index.html"]);

        let mut driver = driver::AutoAdvance;
        let batch = engine()
            .grade_batch(tmp.path(), None, &mut driver)
            .await
            .unwrap();

        assert_eq!(batch.submissions.len(), 2);
        assert!(batch.submissions["abrown"].is_error());
        assert!(!batch.submissions["zdoe"].is_error());
    }

    #[tokio::test]
    async fn cancellation_keeps_prior_reports() {
        struct CancelAfterFirst;
        impl BatchDriver for CancelAfterFirst {
            fn advance(&mut self, _student: &str, _report: &SubmissionReport) -> BatchControl {
                BatchControl::Cancel
            }
        }

        let tmp = tempfile::tempdir().unwrap();
        seed_workspace(tmp.path(), "abrown", &["index.html", "tasklist.js"]);
        seed_workspace(tmp.path(), "zdoe", &["index.html", "tasklist.js"]);

        let mut driver = CancelAfterFirst;
        let batch = engine()
            .grade_batch(tmp.path(), None, &mut driver)
            .await
            .unwrap();

        assert_eq!(batch.submissions.len(), 1);
        assert!(batch.submissions.contains_key("abrown"));
    }

    #[tokio::test]
    async fn start_from_rotates_to_the_requested_student() {
        struct Recorder(Vec<String>);
        impl BatchDriver for Recorder {
            fn advance(&mut self, student: &str, _report: &SubmissionReport) -> BatchControl {
                self.0.push(student.to_string());
                BatchControl::Continue
            }
        }

        let tmp = tempfile::tempdir().unwrap();
        for student in ["abrown", "jsmith", "zdoe"] {
            seed_workspace(tmp.path(), student, &["index.html", "tasklist.js"]);
        }

        let mut driver = Recorder(Vec::new());
        engine()
            .grade_batch(tmp.path(), Some("jsmith"), &mut driver)
            .await
            .unwrap();
        assert_eq!(driver.0, vec!["jsmith", "zdoe", "abrown"]);

        // An unknown student starts from the next one alphabetically.
        let mut driver = Recorder(Vec::new());
        engine()
            .grade_batch(tmp.path(), Some("mmiddle"), &mut driver)
            .await
            .unwrap();
        assert_eq!(driver.0, vec!["zdoe", "abrown", "jsmith"]);
    }

    #[tokio::test]
    async fn empty_rubric_grades_to_zero_percentage() {
        let tmp = tempfile::tempdir().unwrap();
        seed_workspace(tmp.path(), "jsmith", &["index.html"]);

        let report = RubricEngine::new()
            .grade_submission(&tmp.path().join("jsmith"))
            .await;
        assert_eq!(report.total().max_points, 0.0);
        assert_eq!(report.total().percentage, 0.0);
    }
}
