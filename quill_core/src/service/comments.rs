use std::sync::Arc;

use thiserror::Error;

use crate::{
    domain::{validate_text, Comment, NewComment, MAX_COMMENT_TEXT},
    error::{ErrorKind, StoreError, ValidationError},
    ids::{CommentId, PostId},
    pagination::PageRequest,
    repository::Repository,
};

#[derive(Debug, Error)]
pub enum CommentsServiceError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("comments are disabled for this post")]
    CommentsDisabled,

    #[error("failed to {action}")]
    Store {
        action: &'static str,
        #[source]
        source: StoreError,
    },
}

impl CommentsServiceError {
    fn store(action: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { action, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CommentsServiceError::Invalid(_) => ErrorKind::Validation,
            CommentsServiceError::CommentsDisabled => ErrorKind::PermissionDenied,
            CommentsServiceError::Store { source, .. } => source.kind(),
        }
    }
}

#[derive(Clone)]
pub struct CommentsService {
    repo: Arc<dyn Repository>,
}

impl CommentsService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Create a comment on a post, optionally as a reply to `parent_id`.
    ///
    /// The post's comment permission is checked here and again by the
    /// repository. The two checks are separate reads, so a permission change
    /// landing between them is not observed by this call.
    pub async fn create_comment(
        &self,
        post_id: &str,
        text: String,
        parent_id: Option<&str>,
    ) -> Result<Comment, CommentsServiceError> {
        let post_id = PostId::parse_str(post_id).map_err(ValidationError::from)?;
        validate_text(&text, MAX_COMMENT_TEXT)?;
        let parent_id = parent_id
            .map(CommentId::parse_str)
            .transpose()
            .map_err(ValidationError::from)?;

        let allowed = self
            .repo
            .is_comments_allowed(post_id)
            .await
            .map_err(CommentsServiceError::store("check comments allowed"))?;
        if !allowed {
            return Err(CommentsServiceError::CommentsDisabled);
        }

        let comment = NewComment {
            post_id,
            parent_id,
            text,
            created_at: None,
        };

        self.repo
            .create_comment(comment)
            .await
            .map_err(CommentsServiceError::store("create comment"))
    }

    /// One page of root comments for a post, each with its full reply tree
    pub async fn get_comments_for_post(
        &self,
        post_id: &str,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Comment>, CommentsServiceError> {
        let post_id = PostId::parse_str(post_id).map_err(ValidationError::from)?;
        let page = PageRequest::from_optional(page, limit)?;

        self.repo
            .get_comments_for_post(post_id, page)
            .await
            .map_err(CommentsServiceError::store("get comments"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repository::MemoryRepository, service::posts::PostsService,
        service::tests::UnreachableRepository, test_utils,
    };

    struct Fixture {
        posts: PostsService,
        comments: CommentsService,
    }

    fn fixture(repo: Arc<dyn Repository>) -> Fixture {
        Fixture {
            posts: PostsService::new(repo.clone()),
            comments: CommentsService::new(repo),
        }
    }

    #[tokio::test]
    async fn test_create_comment_and_reply() {
        let f = fixture(Arc::new(MemoryRepository::new()));
        let post = f.posts.create_post("Post".to_string(), None).await.unwrap();
        let post_id = post.id.to_string();

        let root = f
            .comments
            .create_comment(&post_id, "First!".to_string(), None)
            .await
            .unwrap();
        assert!(root.is_root());
        assert_eq!(root.post_id, post.id);

        let parent_id = root.id.to_string();
        let reply = f
            .comments
            .create_comment(&post_id, "Reply".to_string(), Some(parent_id.as_str()))
            .await
            .unwrap();
        assert_eq!(reply.parent_id, Some(root.id));

        let thread = f
            .comments
            .get_comments_for_post(&post_id, None, None)
            .await
            .unwrap();
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].children.len(), 1);
        assert_eq!(thread[0].children[0].id, reply.id);
    }

    #[tokio::test]
    async fn test_disabled_post_is_permission_denied() {
        let f = fixture(Arc::new(test_utils::relational_repository().await));
        let post = f
            .posts
            .create_post("Closed".to_string(), Some(false))
            .await
            .unwrap();

        let err = f
            .comments
            .create_comment(&post.id.to_string(), "hello?".to_string(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CommentsServiceError::CommentsDisabled));
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_unknown_post_or_parent_is_not_found() {
        let f = fixture(Arc::new(MemoryRepository::new()));

        let err = f
            .comments
            .create_comment(&PostId::new().to_string(), "hi".to_string(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let post = f.posts.create_post("Post".to_string(), None).await.unwrap();
        let ghost = CommentId::new().to_string();
        let err = f
            .comments
            .create_comment(&post.id.to_string(), "hi".to_string(), Some(ghost.as_str()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommentsServiceError::Store {
                source: StoreError::ParentNotFound,
                ..
            }
        ));

        let err = f
            .comments
            .get_comments_for_post(&PostId::new().to_string(), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rejects_bad_input_before_storage() {
        let f = fixture(Arc::new(UnreachableRepository));
        let post_id = PostId::new().to_string();

        let err = f
            .comments
            .create_comment(&post_id, String::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CommentsServiceError::Invalid(ValidationError::EmptyText)));

        let err = f
            .comments
            .create_comment(&post_id, "x".repeat(MAX_COMMENT_TEXT + 1), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommentsServiceError::Invalid(ValidationError::TextTooLong { max: MAX_COMMENT_TEXT })
        ));

        let err = f
            .comments
            .create_comment(&post_id, "ok".to_string(), Some("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommentsServiceError::Invalid(ValidationError::InvalidId(_))));

        let err = f
            .comments
            .create_comment("", "ok".to_string(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        for (page, limit) in [(Some(0), None), (None, Some(0)), (Some(-2), Some(-2))] {
            let err = f
                .comments
                .get_comments_for_post(&post_id, page, limit)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[tokio::test]
    async fn test_max_length_comment_is_accepted() {
        let f = fixture(Arc::new(test_utils::relational_repository().await));
        let post = f.posts.create_post("Post".to_string(), None).await.unwrap();

        let text = "é".repeat(MAX_COMMENT_TEXT);
        let comment = f
            .comments
            .create_comment(&post.id.to_string(), text.clone(), None)
            .await
            .unwrap();
        assert_eq!(comment.text, text);
    }
}
