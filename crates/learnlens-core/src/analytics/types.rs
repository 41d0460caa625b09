//! Result types for the aggregate queries

use crate::analytics::charts::ChartSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Separator used when joining badge names into a learning-path key
pub const PATH_SEPARATOR: &str = " → ";

/// An aggregate result paired with its chart payloads
#[derive(Debug, Clone, Serialize)]
pub struct Report<T> {
    pub data: T,
    pub charts: ChartSet,
}

/// Per-badge enrollment summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeEnrollmentRow {
    pub badge: String,
    pub total_enrollments: i64,
    /// Enrollments with a completion timestamp
    pub completed: i64,
    /// completed / total * 100, rounded to 2 decimals (0 when total is 0)
    pub completion_rate: f64,
    /// Mean days from enrollment to completion over completed rows (0 when none)
    pub avg_completion_days: f64,
}

/// Enrollments per organization per calendar month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgTrendRow {
    pub organization: String,
    /// Year-month bucket key, e.g. "2025-08"
    pub month: String,
    pub enrollments: i64,
}

/// Completion metrics for one (badge, organization) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionMetricsRow {
    pub badge: String,
    pub organization: String,
    pub total_enrollments: i64,
    pub completions: i64,
    pub completion_rate: f64,
    pub avg_days_to_complete: f64,
    pub min_days: f64,
    pub max_days: f64,
}

/// One user's chronological badge sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPathDetail {
    pub user_id: i64,
    pub user_name: String,
    pub organization: String,
    /// Badge names ordered by enrollment timestamp ascending
    pub path: Vec<String>,
    /// Enrollment timestamps matching `path` position for position
    pub dates: Vec<DateTime<Utc>>,
}

/// Learning-path analysis over users with more than one distinct badge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPathSummary {
    /// Ordered path key -> number of users sharing that exact path
    pub paths: BTreeMap<String, u32>,
    pub path_details: Vec<UserPathDetail>,
}

/// Global entity counts used as prompt context
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub total_users: i64,
    pub total_badges: i64,
    pub total_enrollments: i64,
    pub total_organizations: i64,
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Completion rate as a percentage, rounded to 2 decimals
///
/// Returns 0 for an empty group rather than dividing by zero.
pub fn completion_rate(completed: i64, total: i64) -> f64 {
    if total > 0 {
        round2(completed as f64 / total as f64 * 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.66666), 66.67);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_completion_rate() {
        assert_eq!(completion_rate(2, 3), 66.67);
        assert_eq!(completion_rate(1, 2), 50.0);
        assert_eq!(completion_rate(0, 5), 0.0);
        // Empty group must not divide by zero
        assert_eq!(completion_rate(0, 0), 0.0);
    }

    #[test]
    fn test_completion_rate_full() {
        assert_eq!(completion_rate(4, 4), 100.0);
    }
}
