use async_trait::async_trait;

use crate::{
    domain::{Comment, NewComment, NewPost, Post, MAX_REPLY_DEPTH},
    entity::prelude::*,
    error::StoreError,
    ids::{CommentId, PostId},
    pagination::PageRequest,
    tree,
};

use super::Repository;

/// Upper bound on ids bound into a single `IN (...)` clause.
const MAX_IN_PARAMS: usize = 500;

/// sea-orm backed repository over the `post` and `comment` tables.
///
/// Every write is a single-row insert. Reads fetch flat rows and assemble
/// threads in application code with [`tree::build_forest`].
#[derive(Clone)]
pub struct RelationalRepository {
    db: DatabaseConnection,
}

impl RelationalRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn find_post(&self, id: PostId) -> Result<PostModel, StoreError> {
        PostEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(StoreError::PostNotFound)
    }

    async fn ensure_post(&self, id: PostId) -> Result<(), StoreError> {
        let exists = PostEntity::find_by_id(id).count(&self.db).await? > 0;
        if exists {
            Ok(())
        } else {
            Err(StoreError::PostNotFound)
        }
    }

    /// Loads one page of root comments, then their descendants one tree
    /// level per query. Stored depth is capped at [`MAX_REPLY_DEPTH`], which
    /// bounds the number of queries.
    async fn thread_page(
        &self,
        post_id: PostId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, StoreError> {
        let mut rows: Vec<Comment> = CommentEntity::find()
            .filter(CommentColumn::PostId.eq(post_id))
            .filter(CommentColumn::ParentId.is_null())
            .order_by_asc(CommentColumn::CreatedAt)
            .order_by_asc(CommentColumn::Id)
            .limit(page.limit())
            .offset(clamp_offset(page.offset()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(Comment::from)
            .collect();

        let mut frontier: Vec<CommentId> = rows.iter().map(|c| c.id).collect();
        while !frontier.is_empty() {
            let mut level = Vec::new();
            for parents in frontier.chunks(MAX_IN_PARAMS) {
                let children = CommentEntity::find()
                    .filter(CommentColumn::PostId.eq(post_id))
                    .filter(CommentColumn::ParentId.is_in(parents.iter().copied()))
                    .all(&self.db)
                    .await?;
                level.extend(children.into_iter().map(Comment::from));
            }
            frontier = level.iter().map(|c| c.id).collect();
            rows.append(&mut level);
        }

        Ok(tree::build_forest(&rows, post_id))
    }
}

// SQL offsets are signed 64-bit on every supported engine
fn clamp_offset(offset: u64) -> u64 {
    offset.min(i64::MAX as u64)
}

#[async_trait]
impl Repository for RelationalRepository {
    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let post = post.into_post();
        let model = PostActiveModel {
            id: Set(post.id),
            text: Set(post.text),
            allow_comments: Set(post.allow_comments),
            created_at: Set(post.created_at),
        };

        let stored = PostEntity::insert(model)
            .exec_with_returning(&self.db)
            .await?;

        tracing::info!(post_id = %stored.id, allow_comments = stored.allow_comments, "post created");
        Ok(stored.into())
    }

    async fn get_post(&self, id: PostId, comments: PageRequest) -> Result<Post, StoreError> {
        let mut post: Post = self.find_post(id).await?.into();
        post.comments = self.thread_page(id, comments).await?;
        Ok(post)
    }

    async fn get_posts(&self, page: PageRequest) -> Result<Vec<Post>, StoreError> {
        let rows = PostEntity::find()
            .order_by_asc(PostColumn::CreatedAt)
            .order_by_asc(PostColumn::Id)
            .limit(page.limit())
            .offset(clamp_offset(page.offset()))
            .all(&self.db)
            .await?;

        let mut posts = Vec::with_capacity(rows.len());
        for row in rows {
            let mut post: Post = row.into();
            post.comments = self.thread_page(post.id, PageRequest::default()).await?;
            posts.push(post);
        }

        tracing::debug!(page = page.page(), limit = page.limit(), found = posts.len(), "listed posts");
        Ok(posts)
    }

    async fn is_comments_allowed(&self, post_id: PostId) -> Result<bool, StoreError> {
        Ok(self.find_post(post_id).await?.allow_comments)
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let post = self.find_post(comment.post_id).await?;
        if !post.allow_comments {
            tracing::warn!(post_id = %post.id, "comment rejected, comments disabled");
            return Err(StoreError::CommentsDisabled);
        }

        let depth = match comment.parent_id {
            Some(parent_id) => {
                let parent = CommentEntity::find_by_id(parent_id)
                    .one(&self.db)
                    .await?
                    .ok_or(StoreError::ParentNotFound)?;
                if parent.post_id != comment.post_id {
                    return Err(StoreError::ParentOnAnotherPost);
                }
                parent.depth.saturating_add(1)
            }
            None => 0,
        };
        if usize::try_from(depth).map_or(true, |d| d > MAX_REPLY_DEPTH) {
            return Err(StoreError::ReplyTooDeep {
                max: MAX_REPLY_DEPTH,
            });
        }

        let comment = comment.into_comment();
        let model = CommentActiveModel {
            id: Set(comment.id),
            text: Set(comment.text.clone()),
            post_id: Set(comment.post_id),
            parent_id: Set(comment.parent_id),
            depth: Set(depth),
            created_at: Set(comment.created_at),
        };

        let stored = CommentEntity::insert(model)
            .exec_with_returning(&self.db)
            .await?;

        tracing::info!(
            comment_id = %stored.id,
            post_id = %stored.post_id,
            parent_id = ?stored.parent_id.map(|id| id.to_string()),
            "comment created"
        );
        Ok(stored.into())
    }

    async fn get_comments_for_post(
        &self,
        post_id: PostId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, StoreError> {
        self.ensure_post(post_id).await?;
        self.thread_page(post_id, page).await
    }

    async fn count_root_comments(&self, post_id: PostId) -> Result<u64, StoreError> {
        self.ensure_post(post_id).await?;
        let count = CommentEntity::find()
            .filter(CommentColumn::PostId.eq(post_id))
            .filter(CommentColumn::ParentId.is_null())
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
