use std::sync::Arc;

use thiserror::Error;

use crate::{
    domain::{validate_text, NewPost, Post, MAX_POST_TEXT},
    error::{ErrorKind, StoreError, ValidationError},
    ids::PostId,
    pagination::PageRequest,
    repository::Repository,
};

#[derive(Debug, Error)]
pub enum PostsServiceError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("failed to {action}")]
    Store {
        action: &'static str,
        #[source]
        source: StoreError,
    },
}

impl PostsServiceError {
    fn store(action: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { action, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PostsServiceError::Invalid(_) => ErrorKind::Validation,
            PostsServiceError::Store { source, .. } => source.kind(),
        }
    }
}

#[derive(Clone)]
pub struct PostsService {
    repo: Arc<dyn Repository>,
}

impl PostsService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Create a new post. Comments are allowed unless `allow_comments` says otherwise.
    pub async fn create_post(
        &self,
        text: String,
        allow_comments: Option<bool>,
    ) -> Result<Post, PostsServiceError> {
        validate_text(&text, MAX_POST_TEXT)?;

        let post = NewPost {
            allow_comments: Some(allow_comments.unwrap_or(true)),
            ..NewPost::new(text)
        };

        self.repo
            .create_post(post)
            .await
            .map_err(PostsServiceError::store("create post"))
    }

    /// Get a post with one page of its comment threads
    pub async fn get_post(
        &self,
        id: &str,
        comment_page: Option<i64>,
        comment_limit: Option<i64>,
    ) -> Result<Post, PostsServiceError> {
        let id = PostId::parse_str(id).map_err(ValidationError::from)?;
        let comments = PageRequest::from_optional(comment_page, comment_limit)?;

        self.repo
            .get_post(id, comments)
            .await
            .map_err(PostsServiceError::store("get post"))
    }

    /// List posts oldest first
    pub async fn get_posts(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Post>, PostsServiceError> {
        let page = PageRequest::from_optional(page, limit)?;

        self.repo
            .get_posts(page)
            .await
            .map_err(PostsServiceError::store("get posts"))
    }

    pub async fn is_comments_allowed(&self, post_id: &str) -> Result<bool, PostsServiceError> {
        let post_id = PostId::parse_str(post_id).map_err(ValidationError::from)?;

        self.repo
            .is_comments_allowed(post_id)
            .await
            .map_err(PostsServiceError::store("check comments allowed"))
    }
}
