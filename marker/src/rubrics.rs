//! Reference rubric for the task-list assignment.
//!
//! Three dynamically executed criteria, one per graded function, with the
//! deduction tables the course's rubric assigns to each hidden test scenario.

use crate::deductions::{DeductionRule, DeductionTable};
use crate::dynamic::DynamicExecutionGrader;
use crate::traits::criterion::Criterion;
use code_runner::TestRunner;
use std::path::PathBuf;
use std::sync::Arc;

/// The functions the code extractor is allowed to retain.
pub const ALLOWED_FUNCTIONS: &[&str] = &["validateDate", "validateTime", "calculatePriority"];

/// Builds the three criteria of the task-list rubric, in grading order.
pub fn tasklist_rubric(runner: Arc<TestRunner>, template: PathBuf) -> Vec<Box<dyn Criterion>> {
    vec![
        Box::new(validate_date_grader(runner.clone(), template.clone())),
        Box::new(validate_time_grader(runner.clone(), template.clone())),
        Box::new(calculate_priority_grader(runner, template)),
    ]
}

fn validate_date_grader(runner: Arc<TestRunner>, template: PathBuf) -> DynamicExecutionGrader {
    let deductions = DeductionTable::new(
        vec![
            DeductionRule {
                needle: "should accept valid dates",
                points: 1.0,
                comment: "Failed to validate correct date formats",
            },
            DeductionRule {
                needle: "should reject strings without exactly one forward slash",
                points: 1.0,
                comment: "Failed to properly check for single forward slash",
            },
            DeductionRule {
                needle: "should reject parts that are not exactly 2 digits",
                points: 1.0,
                comment: "Failed to verify exactly 2 digits in each part",
            },
            DeductionRule {
                needle: "should reject non-numeric characters",
                points: 1.0,
                comment: "Failed to validate numeric characters",
            },
            DeductionRule {
                needle: "should reject invalid months",
                points: 1.0,
                comment: "Failed to properly validate month range",
            },
            DeductionRule {
                needle: "should reject invalid days for each month",
                points: 1.0,
                comment: "Failed to properly validate days for specific months",
            },
        ],
        "All validateDate tests passed successfully",
        2.0,
        1.0,
    );
    DynamicExecutionGrader::new(
        "validateDate() Function",
        6.0,
        "validateDate",
        ALLOWED_FUNCTIONS.to_vec(),
        template,
        runner,
        deductions,
    )
}

fn validate_time_grader(runner: Arc<TestRunner>, template: PathBuf) -> DynamicExecutionGrader {
    let deductions = DeductionTable::new(
        vec![
            DeductionRule {
                needle: "should accept valid times",
                points: 1.0,
                comment: "Failed to validate correct time formats",
            },
            DeductionRule {
                needle: "should reject strings without exactly one colon",
                points: 1.0,
                comment: "Failed to properly check for single colon",
            },
            DeductionRule {
                needle: "should reject parts that are not exactly 2 digits",
                points: 1.0,
                comment: "Failed to verify exactly 2 digits in each part",
            },
            DeductionRule {
                needle: "should reject non-numeric characters",
                points: 1.0,
                comment: "Failed to validate numeric characters",
            },
            DeductionRule {
                needle: "should reject invalid hours",
                points: 1.0,
                comment: "Failed to properly validate hours range (0-23)",
            },
            DeductionRule {
                needle: "should reject invalid minutes",
                points: 1.0,
                comment: "Failed to properly validate minutes range (0-59)",
            },
        ],
        "All validateTime tests passed successfully",
        2.0,
        1.0,
    );
    DynamicExecutionGrader::new(
        "validateTime() Function",
        6.0,
        "validateTime",
        ALLOWED_FUNCTIONS.to_vec(),
        template,
        runner,
        deductions,
    )
}

fn calculate_priority_grader(runner: Arc<TestRunner>, template: PathBuf) -> DynamicExecutionGrader {
    let deductions = DeductionTable::new(
        vec![
            DeductionRule {
                needle: "should correctly calculate priority for valid inputs",
                points: 3.0,
                comment: "Failed to calculate correct priorities for various scenarios",
            },
            DeductionRule {
                needle: "should handle edge cases correctly",
                points: 3.0,
                comment: "Failed to handle edge cases properly",
            },
            DeductionRule {
                needle: "should return 0 for invalid inputs",
                points: 2.0,
                comment: "Failed to handle invalid inputs properly",
            },
        ],
        "All calculatePriority tests passed successfully",
        4.0,
        1.0,
    );
    DynamicExecutionGrader::new(
        "calculatePriority() Function",
        8.0,
        "calculatePriority",
        ALLOWED_FUNCTIONS.to_vec(),
        template,
        runner,
        deductions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rubric_totals_twenty_points_in_fixed_order() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = Arc::new(TestRunner::new(tmp.path().join("scratch"), 10).unwrap());
        let rubric = tasklist_rubric(runner, tmp.path().join("template.js"));

        let names: Vec<&str> = rubric.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "validateDate() Function",
                "validateTime() Function",
                "calculatePriority() Function"
            ]
        );
        let total: f64 = rubric.iter().map(|c| c.max_points()).sum();
        assert_eq!(total, 20.0);
    }
}
