use shared::{
    domain::{CommentId, PostId},
    protocol::CommentResponse,
};
use tracing::info;

use crate::{
    error::MutationError,
    mutation::{MutationKey, Observer, OptimisticCell, Removed, Settlement},
    transport::MutationRequest,
    view::ViewContext,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CommentThreadState {
    pub comments: Vec<CommentResponse>,
    pub comment_count: u64,
    /// Display order, still holding comments whose delete is unconfirmed.
    order: Vec<CommentId>,
}

impl CommentThreadState {
    pub fn new(comments: Vec<CommentResponse>) -> Self {
        let comment_count = comments.len() as u64;
        Self::with_count(comments, comment_count)
    }

    /// Keeps a server-reported count that may differ from the loaded list.
    pub fn with_count(comments: Vec<CommentResponse>, comment_count: u64) -> Self {
        let order = comments.iter().map(comment_key).collect();
        Self {
            comments,
            comment_count,
            order,
        }
    }

    pub fn ids(&self) -> Vec<CommentId> {
        self.comments.iter().map(comment_key).collect()
    }
}

/// Comment section under a post.
pub struct CommentThread {
    post_id: PostId,
    cell: OptimisticCell<CommentThreadState>,
    ctx: ViewContext,
}

impl CommentThread {
    pub fn new(ctx: ViewContext, post_id: PostId, comments: Vec<CommentResponse>) -> Self {
        Self::with_state(ctx, post_id, CommentThreadState::new(comments))
    }

    pub fn with_state(ctx: ViewContext, post_id: PostId, state: CommentThreadState) -> Self {
        Self {
            post_id,
            cell: OptimisticCell::new(state),
            ctx,
        }
    }

    pub fn on_settled(mut self, observer: Observer<CommentThreadState>) -> Self {
        self.cell.set_observer(observer);
        self
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn state(&self) -> CommentThreadState {
        self.cell.snapshot()
    }

    pub fn is_deleting(&self, comment_id: CommentId) -> bool {
        self.cell.is_pending(MutationKey::DeleteComment(self.post_id, comment_id))
    }

    /// Whether the viewer may delete this comment.
    pub fn can_delete(&self, comment_id: CommentId) -> bool {
        let Some(viewer_id) = self.ctx.session().viewer_id() else {
            return false;
        };
        self.cell
            .snapshot()
            .comments
            .iter()
            .any(|comment| comment.id == comment_id && comment.author_id == viewer_id)
    }

    pub async fn delete(&self, comment_id: CommentId) -> Result<Settlement, MutationError> {
        self.ctx.session().token()?;
        if !self.can_delete(comment_id) {
            return Err(MutationError::not_eligible(
                "only the author can delete this comment",
            ));
        }

        let post_id = self.post_id;
        let settlement = self
            .cell
            .run(
                &self.ctx,
                MutationKey::DeleteComment(post_id, comment_id),
                |state| {
                    let removed = Removed::take(
                        &mut state.comments,
                        &state.order,
                        comment_key,
                        &comment_id,
                    )?;
                    let decremented = state.comment_count > 0;
                    state.comment_count = state.comment_count.saturating_sub(1);
                    Some((removed, decremented))
                },
                |_| MutationRequest::DeleteComment {
                    post_id,
                    comment_id,
                },
                |state, (removed, decremented)| {
                    removed.restore(&mut state.comments, &state.order, comment_key);
                    if decremented {
                        state.comment_count += 1;
                    }
                },
            )
            .await;
        Ok(settlement)
    }

    /// Posts a new comment and appends what the server returns.
    pub async fn add(&self, content: &str) -> Result<CommentResponse, MutationError> {
        self.ctx.session().token()?;
        let content = content.trim();
        if content.is_empty() {
            return Err(MutationError::not_eligible("comment must not be empty"));
        }

        let created = self
            .ctx
            .transport()
            .create_comment(self.ctx.session(), self.post_id, content)
            .await?;
        if self.ctx.scope().is_closed() {
            return Ok(created);
        }
        info!(
            post_id = self.post_id.0,
            comment_id = created.id.0,
            "comment created"
        );
        let appended = created.clone();
        self.cell.update(move |state| {
            state.order.push(appended.id);
            state.comments.push(appended);
            state.comment_count += 1;
        });
        Ok(created)
    }

    /// Replaces the list with a refetch unless a delete is still pending.
    pub fn sync_from_server(&self, comments: Vec<CommentResponse>) -> bool {
        self.cell.sync(
            |key| matches!(key, MutationKey::DeleteComment(..)),
            |state| {
                *state = CommentThreadState::new(comments);
                true
            },
        )
    }
}

fn comment_key(comment: &CommentResponse) -> CommentId {
    comment.id
}

#[cfg(test)]
#[path = "tests/comments_tests.rs"]
mod tests;
