//! Analytics module
//!
//! Read-only aggregate queries over the enrollment schema, each paired with a
//! named set of chart payloads.

pub mod charts;
pub mod engine;
pub mod types;

pub use engine::AnalyticsEngine;
pub use types::{
    BadgeEnrollmentRow, CompletionMetricsRow, DatabaseStats, LearningPathSummary, OrgTrendRow,
    Report, UserPathDetail,
};
