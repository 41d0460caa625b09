//! Sample data seeding
//!
//! Populates an empty database with a small realistic data set so the service
//! can answer queries out of the box. Seeding is a no-op when any organization
//! already exists.

use crate::model;
use crate::storage::Database;
use crate::Result;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Users created per organization
const USERS_PER_ORG: usize = 5;

const ORGANIZATIONS: &[(&str, &str)] = &[
    ("Tech Corp", "Technology Company"),
    ("Education Plus", "Educational Institution"),
    ("Data Systems", "Data Analytics Company"),
];

const BADGES: &[(&str, &str)] = &[
    ("Python Master", "Advanced Python Programming"),
    ("Data Science Pro", "Data Science and Analytics"),
    ("Cloud Expert", "Cloud Computing and Architecture"),
    ("AI Developer", "Artificial Intelligence Development"),
];

/// Courses and the badge each one grants
const COURSES: &[(&str, &str, &str)] = &[
    ("Python Programming", "Learn Python basics to advanced", "Python Master"),
    ("Data Analysis", "Data analysis with Python", "Data Science Pro"),
    ("Cloud Computing", "Introduction to cloud computing", "Cloud Expert"),
    ("Machine Learning", "ML fundamentals", "AI Developer"),
];

/// Seed the database with sample data if it is empty
///
/// Returns true when data was inserted, false when the database already
/// contained organizations.
pub async fn seed_sample_data(db: &Database) -> Result<bool> {
    if model::count_organizations(db).await? > 0 {
        info!("Sample data already exists, skipping seed");
        return Ok(false);
    }

    info!("Seeding database with sample data");

    let mut badge_ids = Vec::with_capacity(BADGES.len());
    for (name, description) in BADGES {
        badge_ids.push(model::insert_badge(db, name, Some(description)).await?);
    }

    for (name, description, badge_name) in COURSES {
        let course_id = model::insert_course(db, name, Some(description)).await?;
        let badge_index = BADGES
            .iter()
            .position(|(b, _)| b == badge_name)
            .unwrap_or(0);
        model::link_course_badge(db, course_id, badge_ids[badge_index]).await?;
    }

    // StdRng rather than thread_rng so the future stays Send
    let mut rng = StdRng::from_entropy();
    let now = Utc::now();

    for (org_name, org_description) in ORGANIZATIONS {
        let org_id = model::insert_organization(db, org_name, Some(org_description)).await?;
        let domain = org_name.to_lowercase().replace(' ', "");

        for i in 0..USERS_PER_ORG {
            let email = format!("user{}@{}.com", i, domain);
            let name = format!("User {} {}", i, org_name);
            let user_id = model::insert_user(db, &email, &name, org_id).await?;

            // Enroll each user in 1-3 random badges
            let num_enrollments = rng.gen_range(1..=3);
            let selected: Vec<i64> = badge_ids
                .choose_multiple(&mut rng, num_enrollments)
                .copied()
                .collect();

            for badge_id in selected {
                let enrolled_at = now - Duration::days(rng.gen_range(0..=180));
                // 50% of enrollments complete 30-90 days after enrollment
                let completed_at = if rng.gen_bool(0.5) {
                    Some(enrolled_at + Duration::days(rng.gen_range(30..=90)))
                } else {
                    None
                };
                model::insert_enrollment(db, user_id, badge_id, enrolled_at, completed_at).await?;
            }
        }
    }

    info!(
        organizations = ORGANIZATIONS.len(),
        badges = BADGES.len(),
        "Sample data seeded"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_populates_empty_database() {
        let db = Database::in_memory().await.unwrap();

        let seeded = seed_sample_data(&db).await.unwrap();
        assert!(seeded);

        assert_eq!(model::count_organizations(&db).await.unwrap(), 3);
        assert_eq!(model::count_badges(&db).await.unwrap(), 4);
        assert_eq!(model::count_users(&db).await.unwrap(), 15);

        // Every user has between 1 and 3 enrollments
        let enrollments = model::count_enrollments(&db).await.unwrap();
        assert!((15..=45).contains(&enrollments));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = Database::in_memory().await.unwrap();

        assert!(seed_sample_data(&db).await.unwrap());
        let first_count = model::count_enrollments(&db).await.unwrap();

        assert!(!seed_sample_data(&db).await.unwrap());
        assert_eq!(model::count_enrollments(&db).await.unwrap(), first_count);
    }

    #[tokio::test]
    async fn test_seeded_completions_follow_enrollment() {
        let db = Database::in_memory().await.unwrap();
        seed_sample_data(&db).await.unwrap();

        let (violations,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM enrollments WHERE completed_at IS NOT NULL AND completed_at < enrolled_at",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(violations, 0);
    }
}
