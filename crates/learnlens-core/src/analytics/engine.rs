//! Aggregate queries over the enrollment schema
//!
//! Four read-only aggregations plus global counts. Every query returns empty
//! collections against an empty database.

use crate::analytics::charts;
use crate::analytics::types::{
    completion_rate, round2, BadgeEnrollmentRow, CompletionMetricsRow, DatabaseStats,
    LearningPathSummary, OrgTrendRow, Report, UserPathDetail, PATH_SEPARATOR,
};
use crate::model;
use crate::storage::Database;
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// Trailing window for the organization trend query, in days
const TREND_WINDOW_DAYS: i64 = 180;

/// Analytics engine over a shared database handle
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    db: Database,
}

impl AnalyticsEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The underlying database handle
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Enrollment statistics per badge, optionally filtered to one badge name
    pub async fn badge_enrollments(
        &self,
        badge_name: Option<&str>,
    ) -> Result<Report<Vec<BadgeEnrollmentRow>>> {
        debug!(badge = ?badge_name, "Running badge enrollment summary");

        let base = "SELECT b.name,
                           COUNT(e.id),
                           COUNT(e.completed_at),
                           AVG(julianday(e.completed_at) - julianday(e.enrolled_at))
                    FROM badges b
                    JOIN enrollments e ON e.badge_id = b.id";

        let rows: Vec<(String, i64, i64, Option<f64>)> = match badge_name {
            Some(name) => {
                let sql = format!("{} WHERE b.name = ? GROUP BY b.name ORDER BY b.name", base);
                sqlx::query_as(&sql)
                    .bind(name)
                    .fetch_all(self.db.pool())
                    .await?
            }
            None => {
                let sql = format!("{} GROUP BY b.name ORDER BY b.name", base);
                sqlx::query_as(&sql).fetch_all(self.db.pool()).await?
            }
        };

        let data: Vec<BadgeEnrollmentRow> = rows
            .into_iter()
            .map(|(badge, total, completed, avg_days)| BadgeEnrollmentRow {
                badge,
                total_enrollments: total,
                completed,
                completion_rate: completion_rate(completed, total),
                avg_completion_days: round2(avg_days.unwrap_or(0.0)),
            })
            .collect();

        let charts = charts::enrollment_charts(&data);
        Ok(Report { data, charts })
    }

    /// Enrollment counts per organization per month over the trailing 180 days
    pub async fn organization_trends(
        &self,
        org_name: Option<&str>,
    ) -> Result<Report<Vec<OrgTrendRow>>> {
        debug!(organization = ?org_name, "Running organization trend summary");

        let cutoff: DateTime<Utc> = Utc::now() - Duration::days(TREND_WINDOW_DAYS);

        let base = "SELECT o.name,
                           strftime('%Y-%m', e.enrolled_at) AS month,
                           COUNT(e.id)
                    FROM organizations o
                    JOIN users u ON u.organization_id = o.id
                    JOIN enrollments e ON e.user_id = u.id
                    WHERE julianday(e.enrolled_at) >= julianday(?)";

        let rows: Vec<(String, String, i64)> = match org_name {
            Some(name) => {
                let sql = format!(
                    "{} AND o.name = ? GROUP BY o.name, month ORDER BY o.name, month",
                    base
                );
                sqlx::query_as(&sql)
                    .bind(cutoff)
                    .bind(name)
                    .fetch_all(self.db.pool())
                    .await?
            }
            None => {
                let sql = format!("{} GROUP BY o.name, month ORDER BY o.name, month", base);
                sqlx::query_as(&sql)
                    .bind(cutoff)
                    .fetch_all(self.db.pool())
                    .await?
            }
        };

        let data: Vec<OrgTrendRow> = rows
            .into_iter()
            .map(|(organization, month, enrollments)| OrgTrendRow {
                organization,
                month,
                enrollments,
            })
            .collect();

        let charts = charts::trend_charts(&data);
        Ok(Report { data, charts })
    }

    /// Completion metrics for every (badge, organization) pair with enrollments
    pub async fn completion_metrics(&self) -> Result<Report<Vec<CompletionMetricsRow>>> {
        debug!("Running completion metrics");

        let rows: Vec<(String, String, i64, i64, Option<f64>, Option<f64>, Option<f64>)> =
            sqlx::query_as(
                "SELECT b.name,
                        o.name,
                        COUNT(e.id),
                        COUNT(e.completed_at),
                        AVG(julianday(e.completed_at) - julianday(e.enrolled_at)),
                        MIN(julianday(e.completed_at) - julianday(e.enrolled_at)),
                        MAX(julianday(e.completed_at) - julianday(e.enrolled_at))
                 FROM enrollments e
                 JOIN badges b ON b.id = e.badge_id
                 JOIN users u ON u.id = e.user_id
                 JOIN organizations o ON o.id = u.organization_id
                 GROUP BY b.name, o.name
                 ORDER BY b.name, o.name",
            )
            .fetch_all(self.db.pool())
            .await?;

        let data: Vec<CompletionMetricsRow> = rows
            .into_iter()
            .map(
                |(badge, organization, total, completions, avg_days, min_days, max_days)| {
                    CompletionMetricsRow {
                        badge,
                        organization,
                        total_enrollments: total,
                        completions,
                        completion_rate: completion_rate(completions, total),
                        avg_days_to_complete: round2(avg_days.unwrap_or(0.0)),
                        min_days: round2(min_days.unwrap_or(0.0)),
                        max_days: round2(max_days.unwrap_or(0.0)),
                    }
                },
            )
            .collect();

        let charts = charts::completion_charts(&data);
        Ok(Report { data, charts })
    }

    /// Ordered badge sequences for users with more than one distinct badge
    pub async fn learning_paths(&self) -> Result<Report<LearningPathSummary>> {
        debug!("Running learning path analysis");

        // Flat rows in user + enrollment order; grouping happens here rather
        // than in SQL so the per-user ordering stays explicit
        let rows: Vec<(i64, String, String, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT e.user_id,
                    u.name,
                    o.name,
                    b.name,
                    e.enrolled_at
             FROM enrollments e
             JOIN users u ON u.id = e.user_id
             JOIN organizations o ON o.id = u.organization_id
             JOIN badges b ON b.id = e.badge_id
             ORDER BY e.user_id, e.enrolled_at, e.id",
        )
        .fetch_all(self.db.pool())
        .await?;

        let mut per_user: BTreeMap<i64, UserPathDetail> = BTreeMap::new();
        for (user_id, user_name, organization, badge, enrolled_at) in rows {
            let detail = per_user.entry(user_id).or_insert_with(|| UserPathDetail {
                user_id,
                user_name,
                organization,
                path: Vec::new(),
                dates: Vec::new(),
            });
            detail.path.push(badge);
            detail.dates.push(enrolled_at);
        }

        let mut paths: BTreeMap<String, u32> = BTreeMap::new();
        let mut path_details: Vec<UserPathDetail> = Vec::new();

        for detail in per_user.into_values() {
            let mut distinct = detail.path.clone();
            distinct.sort_unstable();
            distinct.dedup();
            if distinct.len() <= 1 {
                continue;
            }

            let key = detail.path.join(PATH_SEPARATOR);
            *paths.entry(key).or_insert(0) += 1;
            path_details.push(detail);
        }

        let summary = LearningPathSummary {
            paths,
            path_details,
        };
        let charts = charts::path_charts(&summary);
        Ok(Report {
            data: summary,
            charts,
        })
    }

    /// Global entity counts
    pub async fn database_stats(&self) -> Result<DatabaseStats> {
        Ok(DatabaseStats {
            total_users: model::count_users(&self.db).await?,
            total_badges: model::count_badges(&self.db).await?,
            total_enrollments: model::count_enrollments(&self.db).await?,
            total_organizations: model::count_organizations(&self.db).await?,
        })
    }
}
