use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use crate::{models, repository::RelationalRepository};

/// Create a new in-memory SQLite database with migrations already applied.
/// Each call creates a fresh, isolated database instance.
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    models::migrate_up(&db)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn relational_repository() -> RelationalRepository {
    RelationalRepository::new(create_test_db().await)
}

/// A fixed instant plus `secs` seconds, for deterministic ordering in tests.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
}
