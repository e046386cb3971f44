use sea_orm_migration::prelude::*;

mod m20251212_000001_create_post_table;
mod m20251212_000002_create_comment_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251212_000001_create_post_table::Migration),
            Box::new(m20251212_000002_create_comment_table::Migration),
        ]
    }
}

#[cfg(test)]
use sea_orm::{Database, DbErr};

#[tokio::test]
async fn test_migrations_okay() -> Result<(), DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    let schema_manager = SchemaManager::new(&db);

    Migrator::refresh(&db).await?;

    assert!(schema_manager.has_table("post").await?);
    assert!(schema_manager.has_table("comment").await?);
    assert!(schema_manager.has_column("comment", "parent_id").await?);
    assert!(schema_manager.has_column("comment", "depth").await?);

    Ok(())
}
