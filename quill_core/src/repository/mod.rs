//! Storage contract shared by every backend.

use async_trait::async_trait;

use crate::{
    domain::{Comment, NewComment, NewPost, Post},
    error::StoreError,
    ids::PostId,
    pagination::PageRequest,
};

pub mod memory;
pub mod relational;


pub use memory::MemoryRepository;
pub use relational::RelationalRepository;

/// Persistence operations for posts and their comment threads.
///
/// Implementations must be interchangeable: for the same sequence of calls
/// every backend returns the same posts, in the same order, with the same
/// comment forests.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Stores a post, assigning an id and timestamp when absent.
    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError>;

    /// Fetches a post with the requested page of its comment forest.
    async fn get_post(&self, id: PostId, comments: PageRequest) -> Result<Post, StoreError>;

    /// Lists posts oldest first. Each post carries the first default page of
    /// its comments. Pages past the end are empty.
    async fn get_posts(&self, page: PageRequest) -> Result<Vec<Post>, StoreError>;

    async fn is_comments_allowed(&self, post_id: PostId) -> Result<bool, StoreError>;

    /// Stores a comment after checking the post accepts comments and the
    /// parent, if any, exists on the same post.
    async fn create_comment(&self, comment: NewComment) -> Result<Comment, StoreError>;

    /// Returns one page of root comments, each with its full reply tree.
    async fn get_comments_for_post(
        &self,
        post_id: PostId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, StoreError>;

    async fn count_root_comments(&self, post_id: PostId) -> Result<u64, StoreError>;
}
