//! Assembly of flat comment rows into ordered reply trees.
//!
//! Both storage backends hand their rows to these functions so the shape and
//! ordering of a thread never depend on where it was stored.

use std::{cmp::Ordering, collections::HashMap};

use crate::{
    domain::Comment,
    ids::{CommentId, PostId},
    pagination::PageRequest,
};

/// Ordering for siblings at any depth: oldest first, then by id.
///
/// Comparing the raw UUIDs gives the same result as comparing their
/// lowercase hyphenated string forms.
pub fn sibling_order(a: &Comment, b: &Comment) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
}

struct ReplyIndex<'a> {
    roots: Vec<&'a Comment>,
    replies: HashMap<CommentId, Vec<&'a Comment>>,
    reply_count: usize,
}

/// A node whose replies are still being assembled.
struct Frame<'a> {
    comment: &'a Comment,
    next: usize,
    children: Vec<Comment>,
}

impl<'a> Frame<'a> {
    fn new(comment: &'a Comment) -> Self {
        Self {
            comment,
            next: 0,
            children: Vec::new(),
        }
    }

    fn finish(&mut self) -> Comment {
        Comment {
            id: self.comment.id,
            text: self.comment.text.clone(),
            post_id: self.comment.post_id,
            parent_id: self.comment.parent_id,
            created_at: self.comment.created_at,
            children: std::mem::take(&mut self.children),
        }
    }
}

impl<'a> ReplyIndex<'a> {
    fn new(comments: &'a [Comment], post_id: PostId) -> Self {
        let mut roots = Vec::new();
        let mut replies: HashMap<CommentId, Vec<&Comment>> = HashMap::new();
        let mut reply_count = 0;

        for comment in comments.iter().filter(|c| c.post_id == post_id) {
            match comment.parent_id {
                None => roots.push(comment),
                Some(parent_id) => {
                    replies.entry(parent_id).or_default().push(comment);
                    reply_count += 1;
                }
            }
        }

        roots.sort_by(|a, b| sibling_order(a, b));
        for siblings in replies.values_mut() {
            siblings.sort_by(|a, b| sibling_order(a, b));
        }

        Self {
            roots,
            replies,
            reply_count,
        }
    }

    fn replies_to(&self, comment: &Comment) -> &[&'a Comment] {
        self.replies
            .get(&comment.id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Copies `roots` and every reply reachable from them into fresh nodes.
    ///
    /// Walks with an explicit stack, so thread depth is bounded by memory
    /// rather than by the call stack.
    fn assemble(&self, roots: &[&'a Comment]) -> Vec<Comment> {
        let mut forest = Vec::with_capacity(roots.len());

        for &root in roots {
            let mut stack = vec![Frame::new(root)];
            while let Some(frame) = stack.last_mut() {
                if let Some(&child) = self.replies_to(frame.comment).get(frame.next) {
                    frame.next += 1;
                    stack.push(Frame::new(child));
                    continue;
                }

                let node = frame.finish();
                stack.pop();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => forest.push(node),
                }
            }
        }

        forest
    }

    /// Replies that no root reaches, counted over the whole index.
    fn detached(&self) -> usize {
        let mut pending: Vec<&Comment> = self.roots.clone();
        let mut attached = 0;
        while let Some(comment) = pending.pop() {
            let replies = self.replies_to(comment);
            attached += replies.len();
            pending.extend_from_slice(replies);
        }
        self.reply_count.saturating_sub(attached)
    }

    fn log_detached(&self, post_id: PostId) {
        let detached = self.detached();
        if detached > 0 {
            tracing::debug!(
                post_id = %post_id,
                detached,
                "replies without a reachable parent were left out of the thread"
            );
        }
    }
}

/// Builds the ordered forest of root comments for `post_id`.
///
/// Comments of other posts are ignored. A reply whose parent is not in
/// `comments` is left out of the forest rather than promoted to a root.
pub fn build_forest(comments: &[Comment], post_id: PostId) -> Vec<Comment> {
    let index = ReplyIndex::new(comments, post_id);
    index.log_detached(post_id);
    index.assemble(&index.roots)
}

/// Builds the forest for `post_id` and keeps only the roots on `page`.
/// Descendants of the selected roots are always returned in full.
pub fn paginate_forest(comments: &[Comment], post_id: PostId, page: PageRequest) -> Vec<Comment> {
    let index = ReplyIndex::new(comments, post_id);
    index.log_detached(post_id);
    index.assemble(page.slice(&index.roots))
}

/// Total number of comments in `forest`, counting every nested reply.
pub fn count_nodes(forest: &[Comment]) -> usize {
    let mut pending: Vec<&Comment> = forest.iter().collect();
    let mut count = 0;
    while let Some(comment) = pending.pop() {
        count += 1;
        pending.extend(comment.children.iter());
    }
    count
}

/// Number of levels in `forest`; a lone root has depth 1.
pub fn depth(forest: &[Comment]) -> usize {
    let mut pending: Vec<(&Comment, usize)> = forest.iter().map(|c| (c, 1)).collect();
    let mut deepest = 0;
    while let Some((comment, level)) = pending.pop() {
        deepest = deepest.max(level);
        pending.extend(comment.children.iter().map(|c| (c, level + 1)));
    }
    deepest
}
