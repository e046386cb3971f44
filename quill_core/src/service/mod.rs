pub mod comments;
pub mod posts;

pub use comments::{CommentsService, CommentsServiceError};
pub use posts::{PostsService, PostsServiceError};
