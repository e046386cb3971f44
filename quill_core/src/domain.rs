use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    ids::{CommentId, PostId},
};

pub const MAX_POST_TEXT: usize = 10_000;
pub const MAX_COMMENT_TEXT: usize = 2_000;
/// Deepest allowed reply. Root comments sit at depth 0.
pub const MAX_REPLY_DEPTH: usize = 256;

/// Timestamps are kept at microsecond precision, the finest every backend
/// can store.
fn stamp(at: Option<DateTime<Utc>>) -> DateTime<Utc> {
    at.unwrap_or_else(Utc::now).trunc_subsecs(6)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub allow_comments: bool,
    pub created_at: DateTime<Utc>,
    /// Root comments for the requested page, filled in at read time.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub post_id: PostId,
    /// `None` for a root comment.
    pub parent_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub children: Vec<Comment>,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

// Threads are torn down level by level so dropping a deep chain never recurses.
impl Drop for Comment {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

/// Input for [`crate::repository::Repository::create_post`].
///
/// Backends fill in `id` and `created_at` when absent and default
/// `allow_comments` to `true`.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub id: Option<PostId>,
    pub text: String,
    pub allow_comments: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewPost {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn allow_comments(mut self, allow: bool) -> Self {
        self.allow_comments = Some(allow);
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub(crate) fn into_post(self) -> Post {
        Post {
            id: self.id.unwrap_or_default(),
            text: self.text,
            allow_comments: self.allow_comments.unwrap_or(true),
            created_at: stamp(self.created_at),
            comments: Vec::new(),
        }
    }
}

/// Input for [`crate::repository::Repository::create_comment`]. The id is
/// always assigned by the backend.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewComment {
    pub fn root(post_id: PostId, text: impl Into<String>) -> Self {
        Self {
            post_id,
            parent_id: None,
            text: text.into(),
            created_at: None,
        }
    }

    pub fn reply(post_id: PostId, parent_id: CommentId, text: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::root(post_id, text)
        }
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub(crate) fn into_comment(self) -> Comment {
        Comment {
            id: CommentId::new(),
            text: self.text,
            post_id: self.post_id,
            parent_id: self.parent_id,
            created_at: stamp(self.created_at),
            children: Vec::new(),
        }
    }
}

/// Checks that `text` is non-empty and at most `max` characters long.
pub fn validate_text(text: &str, max: usize) -> Result<(), ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::EmptyText);
    }
    if text.chars().count() > max {
        return Err(ValidationError::TextTooLong { max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_post_defaults_to_allowing_comments() {
        let post = NewPost::new("hello").into_post();
        assert!(post.allow_comments);
        assert!(post.comments.is_empty());

        let locked = NewPost::new("hello").allow_comments(false).into_post();
        assert!(!locked.allow_comments);
    }

    #[test]
    fn new_post_keeps_a_pinned_id() {
        let id = PostId::new();
        let post = NewPost {
            id: Some(id),
            ..NewPost::new("pinned")
        }
        .into_post();
        assert_eq!(post.id, id);
    }

    #[test]
    fn text_limits_count_characters() {
        assert!(validate_text("ok", 2).is_ok());
        assert!(matches!(validate_text("", 2), Err(ValidationError::EmptyText)));
        assert!(matches!(
            validate_text("abc", 2),
            Err(ValidationError::TextTooLong { max: 2 })
        ));
        // two chars, six bytes
        assert!(validate_text("日本", 2).is_ok());
    }

    #[test]
    fn comment_limit_boundary() {
        let exact = "a".repeat(MAX_COMMENT_TEXT);
        assert!(validate_text(&exact, MAX_COMMENT_TEXT).is_ok());
        let over = "a".repeat(MAX_COMMENT_TEXT + 1);
        assert!(validate_text(&over, MAX_COMMENT_TEXT).is_err());
    }

    #[test]
    fn dropping_a_deep_thread_does_not_recurse() {
        let post_id = PostId::new();
        let mut node = NewComment::root(post_id, "leaf").into_comment();
        for _ in 0..100_000 {
            let mut parent = NewComment::root(post_id, "link").into_comment();
            parent.children.push(node);
            node = parent;
        }
        drop(node);
    }
}
