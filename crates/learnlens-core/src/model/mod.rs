//! Entity types for the enrollment schema
//!
//! Plain records with explicit foreign-key fields. Relationships are resolved
//! with joins at query time; there is no live object graph.

use crate::storage::Database;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An organization that users belong to
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// A user enrolled in badges through their organization
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub organization_id: i64,
}

/// A credential a user can enroll in and complete
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Badge {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// A course that grants one or more badges
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// A join record linking a user to a badge
///
/// `completed_at` is NULL while the enrollment is in progress.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub badge_id: i64,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Insert an organization, returning its id
pub async fn insert_organization(
    db: &Database,
    name: &str,
    description: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO organizations (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(description)
        .execute(db.pool())
        .await?;
    Ok(result.last_insert_rowid())
}

/// Insert a user, returning their id
pub async fn insert_user(
    db: &Database,
    email: &str,
    name: &str,
    organization_id: i64,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO users (email, name, organization_id) VALUES (?, ?, ?)")
        .bind(email)
        .bind(name)
        .bind(organization_id)
        .execute(db.pool())
        .await?;
    Ok(result.last_insert_rowid())
}

/// Insert a badge, returning its id
pub async fn insert_badge(db: &Database, name: &str, description: Option<&str>) -> Result<i64> {
    let result = sqlx::query("INSERT INTO badges (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(description)
        .execute(db.pool())
        .await?;
    Ok(result.last_insert_rowid())
}

/// Insert a course, returning its id
pub async fn insert_course(db: &Database, name: &str, description: Option<&str>) -> Result<i64> {
    let result = sqlx::query("INSERT INTO courses (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(description)
        .execute(db.pool())
        .await?;
    Ok(result.last_insert_rowid())
}

/// Associate a course with the badge it grants
pub async fn link_course_badge(db: &Database, course_id: i64, badge_id: i64) -> Result<()> {
    sqlx::query("INSERT INTO course_badges (course_id, badge_id) VALUES (?, ?)")
        .bind(course_id)
        .bind(badge_id)
        .execute(db.pool())
        .await?;
    Ok(())
}

/// Insert an enrollment, returning its id
pub async fn insert_enrollment(
    db: &Database,
    user_id: i64,
    badge_id: i64,
    enrolled_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO enrollments (user_id, badge_id, enrolled_at, completed_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(badge_id)
    .bind(enrolled_at)
    .bind(completed_at)
    .execute(db.pool())
    .await?;
    Ok(result.last_insert_rowid())
}

/// Count rows in a table
async fn count_table(db: &Database, table: &'static str) -> Result<i64> {
    let query = format!("SELECT COUNT(*) FROM {}", table);
    let (count,): (i64,) = sqlx::query_as(&query).fetch_one(db.pool()).await?;
    Ok(count)
}

pub async fn count_organizations(db: &Database) -> Result<i64> {
    count_table(db, "organizations").await
}

pub async fn count_users(db: &Database) -> Result<i64> {
    count_table(db, "users").await
}

pub async fn count_badges(db: &Database) -> Result<i64> {
    count_table(db, "badges").await
}

pub async fn count_enrollments(db: &Database) -> Result<i64> {
    count_table(db, "enrollments").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_insert_and_count_entities() {
        let db = Database::in_memory().await.unwrap();

        let org = insert_organization(&db, "Tech Corp", Some("Technology Company"))
            .await
            .unwrap();
        let user = insert_user(&db, "user0@techcorp.com", "User 0", org)
            .await
            .unwrap();
        let badge = insert_badge(&db, "Python Master", Some("Advanced Python"))
            .await
            .unwrap();
        let course = insert_course(&db, "Python Programming", None).await.unwrap();
        link_course_badge(&db, course, badge).await.unwrap();

        let now = Utc::now();
        insert_enrollment(&db, user, badge, now - Duration::days(30), Some(now))
            .await
            .unwrap();

        assert_eq!(count_organizations(&db).await.unwrap(), 1);
        assert_eq!(count_users(&db).await.unwrap(), 1);
        assert_eq!(count_badges(&db).await.unwrap(), 1);
        assert_eq!(count_enrollments(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unique_names_enforced() {
        let db = Database::in_memory().await.unwrap();

        insert_badge(&db, "Python Master", None).await.unwrap();
        let duplicate = insert_badge(&db, "Python Master", None).await;
        assert!(duplicate.is_err());

        insert_organization(&db, "Tech Corp", None).await.unwrap();
        let duplicate = insert_organization(&db, "Tech Corp", None).await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_enrollment_timestamps_round_trip() {
        let db = Database::in_memory().await.unwrap();

        let org = insert_organization(&db, "Org", None).await.unwrap();
        let user = insert_user(&db, "a@b.c", "A", org).await.unwrap();
        let badge = insert_badge(&db, "Badge", None).await.unwrap();

        let enrolled = Utc::now() - Duration::days(10);
        insert_enrollment(&db, user, badge, enrolled, None)
            .await
            .unwrap();

        let row: Enrollment = sqlx::query_as(
            "SELECT id, user_id, badge_id, enrolled_at, completed_at FROM enrollments",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();

        assert_eq!(row.user_id, user);
        assert!(row.completed_at.is_none());
        assert!((row.enrolled_at - enrolled).num_seconds().abs() < 1);
    }
}
