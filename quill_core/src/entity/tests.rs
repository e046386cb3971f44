#[cfg(test)]
mod entity_tests {
    use crate::entity::prelude::*;
    use crate::ids::*;
    use crate::models::migrator::Migrator;
    use chrono::{TimeZone, Utc};
    use sea_orm_migration::MigratorTrait;

    /// Test helper to create and migrate an in-memory database
    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    async fn insert_post(db: &DatabaseConnection, allow_comments: bool) -> PostId {
        let post_id = PostId::new();
        let post = PostActiveModel {
            id: Set(post_id),
            text: Set("A post".to_string()),
            allow_comments: Set(allow_comments),
            created_at: Set(Utc::now()),
        };
        PostEntity::insert(post).exec(db).await.unwrap();
        post_id
    }

    #[tokio::test]
    async fn test_create_and_find_post() {
        let db = setup_test_db().await;
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        let post_id = PostId::new();
        let post = PostActiveModel {
            id: Set(post_id),
            text: Set("Hello, World!".to_string()),
            allow_comments: Set(false),
            created_at: Set(created_at),
        };
        PostEntity::insert(post).exec(&db).await.unwrap();

        let found = PostEntity::find_by_id(post_id)
            .one(&db)
            .await
            .unwrap()
            .expect("post should exist");

        assert_eq!(found.text, "Hello, World!");
        assert!(!found.allow_comments);
        assert_eq!(found.created_at, created_at);
    }

    #[tokio::test]
    async fn test_comments_filter_by_post_and_parent() {
        let db = setup_test_db().await;
        let post_id = insert_post(&db, true).await;
        let other_post = insert_post(&db, true).await;

        let root_id = CommentId::new();
        let root = CommentActiveModel {
            id: Set(root_id),
            text: Set("root".to_string()),
            post_id: Set(post_id),
            parent_id: Set(None),
            depth: Set(0),
            created_at: Set(Utc::now()),
        };
        CommentEntity::insert(root).exec(&db).await.unwrap();

        for i in 0..2 {
            let reply = CommentActiveModel {
                id: Set(CommentId::new()),
                text: Set(format!("reply {}", i)),
                post_id: Set(post_id),
                parent_id: Set(Some(root_id)),
                depth: Set(1),
                created_at: Set(Utc::now()),
            };
            CommentEntity::insert(reply).exec(&db).await.unwrap();
        }

        let elsewhere = CommentActiveModel {
            id: Set(CommentId::new()),
            text: Set("elsewhere".to_string()),
            post_id: Set(other_post),
            parent_id: Set(None),
            depth: Set(0),
            created_at: Set(Utc::now()),
        };
        CommentEntity::insert(elsewhere).exec(&db).await.unwrap();

        let roots = CommentEntity::find()
            .filter(CommentColumn::PostId.eq(post_id))
            .filter(CommentColumn::ParentId.is_null())
            .all(&db)
            .await
            .unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, root_id);
        assert_eq!(roots[0].parent_id, None);
        assert_eq!(roots[0].depth, 0);

        let replies = CommentEntity::find()
            .filter(CommentColumn::ParentId.eq(root_id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(replies, 2);
    }

    #[tokio::test]
    async fn test_find_comments_through_post_relation() {
        let db = setup_test_db().await;
        let post_id = insert_post(&db, true).await;

        let comment = CommentActiveModel {
            id: Set(CommentId::new()),
            text: Set("hi".to_string()),
            post_id: Set(post_id),
            parent_id: Set(None),
            depth: Set(0),
            created_at: Set(Utc::now()),
        };
        CommentEntity::insert(comment).exec(&db).await.unwrap();

        let post = PostEntity::find_by_id(post_id).one(&db).await.unwrap().unwrap();
        let comments = post
            .find_related(CommentEntity)
            .all(&db)
            .await
            .unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "hi");
    }
}
