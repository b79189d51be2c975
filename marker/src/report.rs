//! Grading reports.
//!
//! Serializable per-submission and per-batch report types. Persistence and
//! pretty-printing are external collaborators' concerns; everything here is
//! plain data with a stable JSON shape.

use crate::types::GradingResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Round a float to two decimal places.
#[inline]
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// One criterion's scored entry in a submission report.
#[derive(Debug, Clone, Serialize)]
pub struct CriterionReport {
    pub name: String,
    pub points: f64,
    pub max_points: f64,
    pub comments: Vec<String>,
}

impl CriterionReport {
    pub fn new(name: impl Into<String>, result: GradingResult) -> Self {
        Self {
            name: name.into(),
            points: result.points,
            max_points: result.max_points,
            comments: result.comments,
        }
    }
}

/// Aggregate score for one submission.
#[derive(Debug, Clone, Serialize)]
pub struct TotalScore {
    pub points: f64,
    pub max_points: f64,
    /// `points / max_points × 100`, rounded to two decimals; 0 when
    /// `max_points` is 0.
    pub percentage: f64,
}

impl TotalScore {
    pub fn new(points: f64, max_points: f64) -> Self {
        let percentage = if max_points > 0.0 {
            round2(points / max_points * 100.0)
        } else {
            0.0
        };
        Self {
            points,
            max_points,
            percentage,
        }
    }

    /// A zero score out of `max_points`, used for error reports.
    pub fn zero(max_points: f64) -> Self {
        Self::new(0.0, max_points)
    }
}

/// The full report for one student's submission.
///
/// Every submission attempted yields exactly one of these; grading failures
/// are represented in the report, never raised out of the batch loop.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmissionReport {
    /// All criteria ran; entries appear in rubric order.
    Graded {
        criteria: Vec<CriterionReport>,
        total: TotalScore,
    },
    /// A required file kind was missing; no criterion ran.
    Error { error: String, total: TotalScore },
}

impl SubmissionReport {
    pub fn total(&self) -> &TotalScore {
        match self {
            SubmissionReport::Graded { total, .. } => total,
            SubmissionReport::Error { total, .. } => total,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SubmissionReport::Error { .. })
    }
}

/// All reports from one batch run, keyed by student identifier.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub submissions: BTreeMap<String, SubmissionReport>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            submissions: BTreeMap::new(),
        }
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn percentage_is_rounded_to_two_decimals() {
        // 2/2, 1/3, 6/6 -> 9/11 ≈ 81.82%.
        let total = TotalScore::new(9.0, 11.0);
        assert_eq!(total.percentage, 81.82);
    }

    #[test]
    fn zero_max_points_yields_zero_percentage() {
        let total = TotalScore::new(0.0, 0.0);
        assert_eq!(total.percentage, 0.0);
    }

    #[test]
    fn graded_report_serializes_with_status_tag() {
        let report = SubmissionReport::Graded {
            criteria: vec![CriterionReport::new(
                "validateDate() Function",
                GradingResult::full("All tests passed", 6.0),
            )],
            total: TotalScore::new(6.0, 6.0),
        };
        let value: Value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "graded");
        assert_eq!(value["criteria"][0]["name"], "validateDate() Function");
        assert_eq!(value["criteria"][0]["points"], 6.0);
        assert_eq!(value["total"]["percentage"], 100.0);
    }

    #[test]
    fn error_report_serializes_with_zero_total() {
        let report = SubmissionReport::Error {
            error: "Missing required script file".to_string(),
            total: TotalScore::zero(20.0),
        };
        let value: Value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["total"]["points"], 0.0);
        assert_eq!(value["total"]["max_points"], 20.0);
        assert!(value.get("criteria").is_none());
    }

    #[test]
    fn batch_report_keys_students_in_order() {
        let mut batch = BatchReport::new();
        batch.submissions.insert(
            "zlast".to_string(),
            SubmissionReport::Error {
                error: "x".into(),
                total: TotalScore::zero(1.0),
            },
        );
        batch.submissions.insert(
            "afirst".to_string(),
            SubmissionReport::Error {
                error: "x".into(),
                total: TotalScore::zero(1.0),
            },
        );
        let students: Vec<&String> = batch.submissions.keys().collect();
        assert_eq!(students, vec!["afirst", "zlast"]);
    }
}
