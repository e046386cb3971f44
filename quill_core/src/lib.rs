use std::sync::Arc;

use crate::{
    config::{QuillConfig, StorageKind},
    error::CoreError,
    repository::{MemoryRepository, RelationalRepository, Repository},
    service::{CommentsService, PostsService},
};

pub mod config;
pub mod domain;
pub mod entity;
pub mod error;
pub mod ids;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod service;
pub mod tree;

#[cfg(test)]
pub mod test_utils;

/// Main runtime handle for Quill.
///
/// Both services share one repository, chosen from `config.storage` when the
/// core starts.
pub struct QuillCore {
    pub config: QuillConfig,

    pub posts: PostsService,
    pub comments: CommentsService,
}

impl QuillCore {
    pub async fn start(config: QuillConfig) -> Result<Self, CoreError> {
        let repo: Arc<dyn Repository> = match config.storage {
            StorageKind::Memory => Arc::new(MemoryRepository::new()),
            StorageKind::Relational => {
                // DB + migrations
                let db = models::open_db(&config.database_url).await?;
                models::migrate_up(&db).await?;
                Arc::new(RelationalRepository::new(db))
            }
        };

        tracing::info!(storage = %config.storage, "quill core started");

        Ok(Self {
            posts: PostsService::new(repo.clone()),
            comments: CommentsService::new(repo),
            config,
        })
    }

    /// Starts from the config in the platform data directory.
    pub async fn start_default() -> Result<Self, CoreError> {
        let config = config::get_or_init().await?;
        Self::start(config).await
    }
}

pub mod prelude {
    pub use super::config::{QuillConfig, StorageKind};
    pub use super::domain::{Comment, Post};
    pub use super::error::{CoreError, ErrorKind};
    pub use super::ids::{CommentId, PostId};
    pub use super::service::{
        CommentsService, CommentsServiceError, PostsService, PostsServiceError,
    };
    pub use super::QuillCore;
}
