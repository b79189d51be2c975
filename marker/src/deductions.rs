//! Deduction mapping from test output to rubric points.
//!
//! The hidden test runner emits free-text output; this module is the single
//! place that text is translated into points and comments. Each rule couples
//! a human-readable test description to a fixed deduction: the rule fires
//! when its description appears in the captured stdout of a failing run
//! alongside the fixed failure marker. A failing run that matches no rule
//! gets a default deduction floored at a configured minimum.
//!
//! Substring matching against test descriptions is fragile by construction:
//! renaming a test silently breaks its attribution. The policy lives behind
//! [`DeductionTable::apply`] alone so a runner that emits structured pass/fail
//! results can replace it without touching any grader.

use crate::types::GradingResult;
use code_runner::TestRunOutcome;

/// Marker that must accompany a matched description for a rule to fire.
pub const FAILURE_MARKER: &str = "failing";

/// One known failure signature and its cost.
#[derive(Debug, Clone)]
pub struct DeductionRule {
    /// Substring of the hidden test's description.
    pub needle: &'static str,
    /// Points removed when the rule fires.
    pub points: f64,
    /// Comment appended when the rule fires.
    pub comment: &'static str,
}

/// The full translation policy for one criterion.
#[derive(Debug, Clone)]
pub struct DeductionTable {
    rules: Vec<DeductionRule>,
    /// Comment used on full credit.
    pass_comment: &'static str,
    /// Deduction applied when a failing run matches no rule.
    unknown_deduction: f64,
    /// Minimum points left after an unknown-failure deduction.
    unknown_floor: f64,
}

impl DeductionTable {
    pub fn new(
        rules: Vec<DeductionRule>,
        pass_comment: &'static str,
        unknown_deduction: f64,
        unknown_floor: f64,
    ) -> Self {
        Self {
            rules,
            pass_comment,
            unknown_deduction,
            unknown_floor,
        }
    }

    /// Translates one run outcome into a grading result for a criterion worth
    /// `max_points`. The result is always within `[0, max_points]`.
    pub fn apply(&self, outcome: &TestRunOutcome, max_points: f64) -> GradingResult {
        if outcome.success {
            return GradingResult::full(self.pass_comment, max_points);
        }

        if outcome.timed_out {
            return GradingResult::new(
                (max_points - self.unknown_deduction).max(self.unknown_floor),
                vec!["Hidden test execution timed out".to_string()],
                max_points,
            );
        }

        let mut points = max_points;
        let mut comments = Vec::new();

        for rule in &self.rules {
            if outcome.stdout.contains(rule.needle) && outcome.stdout.contains(FAILURE_MARKER) {
                points -= rule.points;
                comments.push(rule.comment.to_string());
            }
        }

        if comments.is_empty() {
            comments.push("Unknown test failures".to_string());
            points = (max_points - self.unknown_deduction).max(self.unknown_floor);
        }

        GradingResult::new(points, comments, max_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(success: bool, stdout: &str) -> TestRunOutcome {
        TestRunOutcome {
            success,
            stdout: stdout.to_string(),
            stderr: String::new(),
            timed_out: false,
        }
    }

    fn table() -> DeductionTable {
        DeductionTable::new(
            vec![
                DeductionRule {
                    needle: "should accept valid dates",
                    points: 1.0,
                    comment: "Failed to validate correct date formats",
                },
                DeductionRule {
                    needle: "should reject invalid months",
                    points: 1.0,
                    comment: "Failed to properly validate month range",
                },
            ],
            "All validateDate tests passed successfully",
            2.0,
            1.0,
        )
    }

    #[test]
    fn success_awards_full_credit_with_positive_comment() {
        let result = table().apply(&outcome(true, "6 passing"), 6.0);
        assert_eq!(result.points, 6.0);
        assert_eq!(result.comments, vec!["All validateDate tests passed successfully"]);
    }

    #[test]
    fn matched_descriptions_deduct_their_points() {
        let stdout = "2 failing\n1) should accept valid dates\n2) should reject invalid months";
        let result = table().apply(&outcome(false, stdout), 6.0);
        assert_eq!(result.points, 4.0);
        assert_eq!(result.comments.len(), 2);
    }

    #[test]
    fn description_without_failure_marker_does_not_fire() {
        let result = table().apply(&outcome(false, "should accept valid dates: passing"), 6.0);
        assert_eq!(result.comments, vec!["Unknown test failures"]);
        assert_eq!(result.points, 4.0);
    }

    #[test]
    fn unmatched_failure_gets_default_deduction_with_floor() {
        let result = table().apply(&outcome(false, "TypeError: validateTime is not a function"), 6.0);
        assert_eq!(result.comments, vec!["Unknown test failures"]);
        assert_eq!(result.points, 4.0);

        // Floor kicks in when max_points is small.
        let result = table().apply(&outcome(false, "garbage"), 2.0);
        assert_eq!(result.points, 1.0);
    }

    #[test]
    fn timeout_is_a_floored_failure_not_a_crash() {
        let timed_out = TestRunOutcome {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: true,
        };
        let result = table().apply(&timed_out, 6.0);
        assert_eq!(result.points, 4.0);
        assert_eq!(result.comments, vec!["Hidden test execution timed out"]);
    }

    #[test]
    fn deductions_never_push_points_below_zero() {
        let rules = (0..10)
            .map(|_| DeductionRule {
                needle: "always present",
                points: 1.0,
                comment: "deducted",
            })
            .collect();
        let table = DeductionTable::new(rules, "ok", 2.0, 1.0);
        let stdout = "always present failing";
        let result = table.apply(&outcome(false, stdout), 6.0);
        assert_eq!(result.points, 0.0);
    }
}
