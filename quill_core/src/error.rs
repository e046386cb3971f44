use sea_orm::DbErr;
use thiserror::Error;

/// Coarse classification shared by every error the core returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    PermissionDenied,
    Persistence,
}

/// Rejected caller input. Raised before any storage access happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("text cannot be empty")]
    EmptyText,
    #[error("text exceeds {max} characters")]
    TextTooLong { max: usize },
    #[error("invalid id format")]
    InvalidId(#[from] uuid::Error),
    #[error("page must be greater than 0")]
    InvalidPage,
    #[error("limit must be greater than 0")]
    InvalidLimit,
}

/// Failures reported by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("post not found")]
    PostNotFound,
    #[error("parent comment not found")]
    ParentNotFound,
    #[error("parent comment belongs to another post")]
    ParentOnAnotherPost,
    #[error("comments are disabled for this post")]
    CommentsDisabled,
    #[error("replies cannot nest deeper than {max} levels")]
    ReplyTooDeep { max: usize },
    #[error("database error")]
    Database(#[from] DbErr),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::PostNotFound | StoreError::ParentNotFound => ErrorKind::NotFound,
            StoreError::ParentOnAnotherPost | StoreError::ReplyTooDeep { .. } => {
                ErrorKind::Validation
            }
            StoreError::CommentsDisabled => ErrorKind::PermissionDenied,
            StoreError::Database(_) => ErrorKind::Persistence,
        }
    }
}

/// Errors raised while bringing up a [`crate::QuillCore`].
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to load config")]
    Config(#[from] crate::config::ConfigError),
    #[error("failed to open database")]
    Database(#[from] DbErr),
}
