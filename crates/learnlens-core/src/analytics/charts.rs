//! Chart payload generation
//!
//! The charting collaborator is treated as a black box: each builder takes
//! tabular records and emits an opaque, self-describing JSON payload. The
//! frontend owns how these are actually drawn.

use crate::analytics::types::{
    BadgeEnrollmentRow, CompletionMetricsRow, LearningPathSummary, OrgTrendRow, PATH_SEPARATOR,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Named set of chart payloads for one aggregation
pub type ChartSet = BTreeMap<String, Value>;

/// The aggregation kinds that carry charts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartGroup {
    BadgeEnrollments,
    OrganizationTrends,
    CompletionMetrics,
    LearningPaths,
}

impl ChartGroup {
    /// The one chart key used as the representative payload for this group
    ///
    /// The mapping is fixed: bar for enrollment summaries, line for trends,
    /// heatmap for completion metrics, sankey for learning paths.
    pub fn representative(&self) -> &'static str {
        match self {
            ChartGroup::BadgeEnrollments => "bar",
            ChartGroup::OrganizationTrends => "line",
            ChartGroup::CompletionMetrics => "heatmap",
            ChartGroup::LearningPaths => "sankey",
        }
    }
}

/// Charts for the badge enrollment summary: bar, radar, funnel
pub fn enrollment_charts(rows: &[BadgeEnrollmentRow]) -> ChartSet {
    let mut charts = ChartSet::new();

    let badges: Vec<&str> = rows.iter().map(|r| r.badge.as_str()).collect();
    let totals: Vec<i64> = rows.iter().map(|r| r.total_enrollments).collect();
    let completed: Vec<i64> = rows.iter().map(|r| r.completed).collect();

    charts.insert(
        "bar".to_string(),
        json!({
            "kind": "bar",
            "title": "Badge Enrollments and Completions",
            "x": badges,
            "series": [
                { "name": "total_enrollments", "values": totals },
                { "name": "completed", "values": completed },
            ],
        }),
    );

    charts.insert(
        "radar".to_string(),
        json!({
            "kind": "radar",
            "title": "Completion Rates by Badge",
            "theta": badges,
            "r": rows.iter().map(|r| r.completion_rate).collect::<Vec<_>>(),
        }),
    );

    charts.insert(
        "funnel".to_string(),
        json!({
            "kind": "funnel",
            "title": "Enrollment Pipeline",
            "stages": ["total_enrollments", "completed"],
            "values": [totals.iter().sum::<i64>(), completed.iter().sum::<i64>()],
        }),
    );

    charts
}

/// Charts for the organization trend summary: line, area
pub fn trend_charts(rows: &[OrgTrendRow]) -> ChartSet {
    let mut charts = ChartSet::new();

    // One series per organization, points keyed by month
    let mut series: BTreeMap<&str, Vec<Value>> = BTreeMap::new();
    for row in rows {
        series
            .entry(row.organization.as_str())
            .or_default()
            .push(json!({ "month": row.month, "enrollments": row.enrollments }));
    }
    let series: Vec<Value> = series
        .into_iter()
        .map(|(org, points)| json!({ "name": org, "points": points }))
        .collect();

    charts.insert(
        "line".to_string(),
        json!({
            "kind": "line",
            "title": "Enrollment Timeline",
            "series": series,
        }),
    );

    charts.insert(
        "area".to_string(),
        json!({
            "kind": "area",
            "title": "Cumulative Enrollments",
            "series": series,
        }),
    );

    charts
}

/// Charts for the completion metrics: heatmap, sunburst
pub fn completion_charts(rows: &[CompletionMetricsRow]) -> ChartSet {
    let mut charts = ChartSet::new();

    let mut organizations: Vec<&str> = rows.iter().map(|r| r.organization.as_str()).collect();
    organizations.sort_unstable();
    organizations.dedup();
    let mut badges: Vec<&str> = rows.iter().map(|r| r.badge.as_str()).collect();
    badges.sort_unstable();
    badges.dedup();

    // organization x badge matrix of completion rates; missing pairs are null
    let matrix: Vec<Vec<Value>> = organizations
        .iter()
        .map(|org| {
            badges
                .iter()
                .map(|badge| {
                    rows.iter()
                        .find(|r| r.organization == *org && r.badge == *badge)
                        .map(|r| json!(r.completion_rate))
                        .unwrap_or(Value::Null)
                })
                .collect()
        })
        .collect();

    charts.insert(
        "heatmap".to_string(),
        json!({
            "kind": "heatmap",
            "title": "Completion Rates by Organization and Badge (%)",
            "x": badges,
            "y": organizations,
            "values": matrix,
        }),
    );

    charts.insert(
        "sunburst".to_string(),
        json!({
            "kind": "sunburst",
            "title": "Hierarchical View of Enrollments and Completion Rates",
            "path": ["organization", "badge"],
            "records": rows.iter().map(|r| json!({
                "organization": r.organization,
                "badge": r.badge,
                "total_enrollments": r.total_enrollments,
                "completion_rate": r.completion_rate,
            })).collect::<Vec<_>>(),
        }),
    );

    charts
}

/// Charts for learning paths: sankey, treemap
pub fn path_charts(summary: &LearningPathSummary) -> ChartSet {
    let mut charts = ChartSet::new();

    // Flatten each path into consecutive (source, target) links weighted by
    // how many users share the path
    let mut links: Vec<Value> = Vec::new();
    let mut nodes: Vec<String> = Vec::new();
    for (path, count) in &summary.paths {
        let badges: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        for window in badges.windows(2) {
            for badge in window {
                if !nodes.iter().any(|n| n == badge) {
                    nodes.push((*badge).to_string());
                }
            }
            links.push(json!({
                "source": window[0],
                "target": window[1],
                "value": count,
            }));
        }
    }

    charts.insert(
        "sankey".to_string(),
        json!({
            "kind": "sankey",
            "title": "Learning Path Flows",
            "nodes": nodes,
            "links": links,
        }),
    );

    charts.insert(
        "treemap".to_string(),
        json!({
            "kind": "treemap",
            "title": "Popular Learning Path Combinations",
            "records": summary.paths.iter().map(|(path, count)| json!({
                "path": path,
                "users": count,
            })).collect::<Vec<_>>(),
        }),
    );

    charts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample_rows() -> Vec<BadgeEnrollmentRow> {
        vec![
            BadgeEnrollmentRow {
                badge: "Python Master".to_string(),
                total_enrollments: 10,
                completed: 6,
                completion_rate: 60.0,
                avg_completion_days: 45.5,
            },
            BadgeEnrollmentRow {
                badge: "Cloud Expert".to_string(),
                total_enrollments: 4,
                completed: 1,
                completion_rate: 25.0,
                avg_completion_days: 80.0,
            },
        ]
    }

    #[test]
    fn test_representative_mapping() {
        assert_eq!(ChartGroup::BadgeEnrollments.representative(), "bar");
        assert_eq!(ChartGroup::OrganizationTrends.representative(), "line");
        assert_eq!(ChartGroup::CompletionMetrics.representative(), "heatmap");
        assert_eq!(ChartGroup::LearningPaths.representative(), "sankey");
    }

    #[test]
    fn test_enrollment_charts_contain_representative() {
        let charts = enrollment_charts(&sample_rows());
        assert!(charts.contains_key("bar"));
        assert!(charts.contains_key("radar"));
        assert!(charts.contains_key("funnel"));

        let bar = &charts["bar"];
        assert_eq!(bar["kind"], "bar");
        assert_eq!(bar["x"][0], "Python Master");
        // Funnel sums across all badges
        assert_eq!(charts["funnel"]["values"][0], 14);
        assert_eq!(charts["funnel"]["values"][1], 7);
    }

    #[test]
    fn test_trend_charts_group_by_organization() {
        let rows = vec![
            OrgTrendRow {
                organization: "Tech Corp".to_string(),
                month: "2025-07".to_string(),
                enrollments: 3,
            },
            OrgTrendRow {
                organization: "Tech Corp".to_string(),
                month: "2025-08".to_string(),
                enrollments: 5,
            },
            OrgTrendRow {
                organization: "Data Systems".to_string(),
                month: "2025-08".to_string(),
                enrollments: 2,
            },
        ];

        let charts = trend_charts(&rows);
        let line = &charts["line"];
        let series = line["series"].as_array().unwrap();
        assert_eq!(series.len(), 2);
        // BTreeMap ordering: Data Systems before Tech Corp
        assert_eq!(series[0]["name"], "Data Systems");
        assert_eq!(series[1]["points"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_heatmap_has_null_for_missing_pair() {
        let rows = vec![
            CompletionMetricsRow {
                badge: "A".to_string(),
                organization: "X".to_string(),
                total_enrollments: 2,
                completions: 1,
                completion_rate: 50.0,
                avg_days_to_complete: 10.0,
                min_days: 10.0,
                max_days: 10.0,
            },
            CompletionMetricsRow {
                badge: "B".to_string(),
                organization: "Y".to_string(),
                total_enrollments: 1,
                completions: 0,
                completion_rate: 0.0,
                avg_days_to_complete: 0.0,
                min_days: 0.0,
                max_days: 0.0,
            },
        ];

        let charts = completion_charts(&rows);
        let heatmap = &charts["heatmap"];
        // X enrolled only in A, so (X, B) has no value
        assert_eq!(heatmap["values"][0][0], 50.0);
        assert!(heatmap["values"][0][1].is_null());
    }

    #[test]
    fn test_sankey_links_follow_path_order() {
        let mut paths = BTreeMap::new();
        paths.insert(
            format!("Python Master{}Cloud Expert", PATH_SEPARATOR),
            2u32,
        );

        let summary = LearningPathSummary {
            paths,
            path_details: Vec::new(),
        };

        let charts = path_charts(&summary);
        let sankey = &charts["sankey"];
        let links = sankey["links"].as_array().unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0]["source"], "Python Master");
        assert_eq!(links[0]["target"], "Cloud Expert");
        assert_eq!(links[0]["value"], 2);
    }

    #[test]
    fn test_empty_input_yields_empty_series() {
        let charts = enrollment_charts(&[]);
        assert_eq!(charts["bar"]["x"].as_array().unwrap().len(), 0);

        let charts = path_charts(&LearningPathSummary {
            paths: BTreeMap::new(),
            path_details: Vec::new(),
        });
        assert_eq!(charts["sankey"]["links"].as_array().unwrap().len(), 0);
    }
}
