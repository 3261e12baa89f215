use shared::{domain::PostId, protocol::PostResponse};

use crate::{
    error::MutationError,
    mutation::{MutationKey, Observer, OptimisticCell, Removed, Settlement},
    transport::MutationRequest,
    view::ViewContext,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FeedListState {
    pub posts: Vec<PostResponse>,
    order: Vec<PostId>,
}

impl FeedListState {
    pub fn new(posts: Vec<PostResponse>) -> Self {
        let order = posts.iter().map(post_key).collect();
        Self { posts, order }
    }

    pub fn ids(&self) -> Vec<PostId> {
        self.posts.iter().map(post_key).collect()
    }
}

/// The post list of one feed page. Deleting a post removes its card right
/// away and puts it back in place if the server refuses.
pub struct FeedList {
    cell: OptimisticCell<FeedListState>,
    ctx: ViewContext,
}

impl FeedList {
    pub fn new(ctx: ViewContext, posts: Vec<PostResponse>) -> Self {
        Self {
            cell: OptimisticCell::new(FeedListState::new(posts)),
            ctx,
        }
    }

    pub fn on_settled(mut self, observer: Observer<FeedListState>) -> Self {
        self.cell.set_observer(observer);
        self
    }

    pub fn state(&self) -> FeedListState {
        self.cell.snapshot()
    }

    pub fn is_deleting(&self, post_id: PostId) -> bool {
        self.cell.is_pending(MutationKey::DeletePost(post_id))
    }

    /// Only the author sees the delete action on a post.
    pub fn can_delete(&self, post_id: PostId) -> bool {
        let Some(viewer_id) = self.ctx.session().viewer_id() else {
            return false;
        };
        self.cell
            .snapshot()
            .posts
            .iter()
            .any(|post| post.id == post_id && post.author_id == viewer_id)
    }

    pub async fn delete(&self, post_id: PostId) -> Result<Settlement, MutationError> {
        self.ctx.session().token()?;
        if !self.can_delete(post_id) {
            return Err(MutationError::not_eligible(
                "only the author can delete this post",
            ));
        }

        let settlement = self
            .cell
            .run(
                &self.ctx,
                MutationKey::DeletePost(post_id),
                |state| Removed::take(&mut state.posts, &state.order, post_key, &post_id),
                |_| MutationRequest::DeletePost(post_id),
                |state, removed| removed.restore(&mut state.posts, &state.order, post_key),
            )
            .await;
        Ok(settlement)
    }

    /// Replaces the list with a refetch unless a delete is still pending.
    pub fn sync_from_server(&self, posts: Vec<PostResponse>) -> bool {
        self.cell.sync(
            |key| matches!(key, MutationKey::DeletePost(_)),
            |state| {
                *state = FeedListState::new(posts);
                true
            },
        )
    }
}

fn post_key(post: &PostResponse) -> PostId {
    post.id
}

#[cfg(test)]
#[path = "tests/posts_tests.rs"]
mod tests;
