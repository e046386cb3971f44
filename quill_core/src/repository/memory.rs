use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    domain::{Comment, NewComment, NewPost, Post, MAX_REPLY_DEPTH},
    error::StoreError,
    ids::{CommentId, PostId},
    pagination::PageRequest,
    tree,
};

use super::Repository;

/// In-process backend for tests and local development.
///
/// Posts and comments live in two tables, each behind its own lock. A single
/// table operation is atomic. Operations touching both tables are not:
/// `create_comment` reads the post, then the parent, then inserts, and a
/// concurrent writer may interleave between those steps.
#[derive(Default)]
pub struct MemoryRepository {
    posts: RwLock<HashMap<PostId, Post>>,
    comments: RwLock<HashMap<CommentId, Comment>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn comments_of(&self, post_id: PostId) -> Vec<Comment> {
        self.comments
            .read()
            .await
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect()
    }

    async fn thread_page(&self, post_id: PostId, page: PageRequest) -> Vec<Comment> {
        let comments = self.comments_of(post_id).await;
        tree::paginate_forest(&comments, post_id, page)
    }
}

/// Depth a reply to `parent` would sit at. Stops counting once past the cap.
fn reply_depth(comments: &HashMap<CommentId, Comment>, parent: &Comment) -> usize {
    let mut depth = 1;
    let mut cursor = parent.parent_id;
    while let Some(id) = cursor {
        depth += 1;
        if depth > MAX_REPLY_DEPTH {
            break;
        }
        cursor = comments.get(&id).and_then(|c| c.parent_id);
    }
    depth
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let post = post.into_post();
        self.posts.write().await.insert(post.id, post.clone());

        tracing::info!(post_id = %post.id, allow_comments = post.allow_comments, "post created");
        Ok(post)
    }

    async fn get_post(&self, id: PostId, comments: PageRequest) -> Result<Post, StoreError> {
        let mut post = self
            .posts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::PostNotFound)?;

        post.comments = self.thread_page(id, comments).await;
        Ok(post)
    }

    async fn get_posts(&self, page: PageRequest) -> Result<Vec<Post>, StoreError> {
        let mut all: Vec<Post> = self.posts.read().await.values().cloned().collect();
        all.sort_by_key(|p| (p.created_at, *p.id.as_uuid()));

        let mut posts = page.slice(&all).to_vec();

        // One pass over the comment table for the whole page of posts
        let mut threads: HashMap<PostId, Vec<Comment>> =
            posts.iter().map(|p| (p.id, Vec::new())).collect();
        for comment in self.comments.read().await.values() {
            if let Some(thread) = threads.get_mut(&comment.post_id) {
                thread.push(comment.clone());
            }
        }
        for post in &mut posts {
            let comments = threads.remove(&post.id).unwrap_or_default();
            post.comments = tree::paginate_forest(&comments, post.id, PageRequest::default());
        }

        tracing::debug!(page = page.page(), limit = page.limit(), found = posts.len(), "listed posts");
        Ok(posts)
    }

    async fn is_comments_allowed(&self, post_id: PostId) -> Result<bool, StoreError> {
        self.posts
            .read()
            .await
            .get(&post_id)
            .map(|p| p.allow_comments)
            .ok_or(StoreError::PostNotFound)
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        if !self.is_comments_allowed(comment.post_id).await? {
            tracing::warn!(post_id = %comment.post_id, "comment rejected, comments disabled");
            return Err(StoreError::CommentsDisabled);
        }

        if let Some(parent_id) = comment.parent_id {
            let comments = self.comments.read().await;
            let parent = comments.get(&parent_id).ok_or(StoreError::ParentNotFound)?;
            if parent.post_id != comment.post_id {
                return Err(StoreError::ParentOnAnotherPost);
            }
            if reply_depth(&comments, parent) > MAX_REPLY_DEPTH {
                return Err(StoreError::ReplyTooDeep {
                    max: MAX_REPLY_DEPTH,
                });
            }
        }

        let comment = comment.into_comment();
        self.comments
            .write()
            .await
            .insert(comment.id, comment.clone());

        tracing::info!(
            comment_id = %comment.id,
            post_id = %comment.post_id,
            parent_id = ?comment.parent_id.map(|id| id.to_string()),
            "comment created"
        );
        Ok(comment)
    }

    async fn get_comments_for_post(
        &self,
        post_id: PostId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, StoreError> {
        if !self.posts.read().await.contains_key(&post_id) {
            return Err(StoreError::PostNotFound);
        }
        Ok(self.thread_page(post_id, page).await)
    }

    async fn count_root_comments(&self, post_id: PostId) -> Result<u64, StoreError> {
        if !self.posts.read().await.contains_key(&post_id) {
            return Err(StoreError::PostNotFound);
        }
        let count = self
            .comments
            .read()
            .await
            .values()
            .filter(|c| c.post_id == post_id && c.is_root())
            .count();
        Ok(count as u64)
    }
}
