//! Core grading data structures.

use serde::Serialize;

/// The result of grading one rubric criterion.
///
/// Awarded points are always within `[0, max_points]`; the constructor clamps
/// so no criterion implementation can break that invariant.
#[derive(Debug, Clone, Serialize)]
pub struct GradingResult {
    /// Points awarded for this criterion.
    pub points: f64,
    /// Human-readable comments. Populated whenever points < max_points, or a
    /// single positive comment on full credit.
    pub comments: Vec<String>,
    /// The maximum points this criterion can award.
    pub max_points: f64,
}

impl GradingResult {
    /// Builds a result, clamping `points` into `[0, max_points]`.
    pub fn new(points: f64, comments: Vec<String>, max_points: f64) -> Self {
        Self {
            points: points.clamp(0.0, max_points),
            comments,
            max_points,
        }
    }

    /// Zero points with a single explanatory comment.
    pub fn zero(comment: impl Into<String>, max_points: f64) -> Self {
        Self::new(0.0, vec![comment.into()], max_points)
    }

    /// Full credit with a single positive comment.
    pub fn full(comment: impl Into<String>, max_points: f64) -> Self {
        Self::new(max_points, vec![comment.into()], max_points)
    }
}
