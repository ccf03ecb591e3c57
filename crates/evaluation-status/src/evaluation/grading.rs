use std::cmp::Ordering;

use super::domain::GradeBand;

/// Ordered grade bands for a period; the first band containing a score wins.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeScale {
    bands: Vec<GradeBand>,
}

impl GradeScale {
    /// Builds a scale ordered by descending `min_range`.
    pub fn new(mut bands: Vec<GradeBand>) -> Self {
        bands.sort_by(|left, right| {
            right
                .min_range
                .partial_cmp(&left.min_range)
                .unwrap_or(Ordering::Equal)
        });
        Self { bands }
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Grade whose inclusive range contains `score`, or `None` outside every band.
    pub fn grade_for(&self, score: f64) -> Option<&str> {
        self.bands
            .iter()
            .find(|band| band.min_range <= score && score <= band.max_range)
            .map(|band| band.grade.as_str())
    }
}
