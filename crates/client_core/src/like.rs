use shared::{domain::PostId, protocol::PostResponse};

use crate::{
    error::MutationError,
    mutation::{MutationKey, Observer, OptimisticCell, Settlement},
    transport::MutationRequest,
    view::ViewContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: u64,
}

impl LikeState {
    pub fn new(liked: bool, like_count: u64) -> Self {
        Self { liked, like_count }
    }

    pub fn from_post(post: &PostResponse) -> Self {
        Self::new(post.liked_by_current_user(), post.like_count())
    }

    pub fn toggled(self) -> Self {
        if self.liked {
            Self::new(false, self.like_count.saturating_sub(1))
        } else {
            Self::new(true, self.like_count + 1)
        }
    }
}

/// Like button of one post card.
pub struct LikeToggle {
    post_id: PostId,
    cell: OptimisticCell<LikeState>,
    ctx: ViewContext,
}

impl LikeToggle {
    pub fn new(ctx: ViewContext, post: &PostResponse) -> Self {
        Self::with_state(ctx, post.id, LikeState::from_post(post))
    }

    pub fn with_state(ctx: ViewContext, post_id: PostId, state: LikeState) -> Self {
        Self {
            post_id,
            cell: OptimisticCell::new(state),
            ctx,
        }
    }

    pub fn on_settled(mut self, observer: Observer<LikeState>) -> Self {
        self.cell.set_observer(observer);
        self
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn state(&self) -> LikeState {
        self.cell.snapshot()
    }

    pub fn is_pending(&self) -> bool {
        self.cell.is_pending(MutationKey::Like(self.post_id))
    }

    pub async fn toggle(&self) -> Result<Settlement, MutationError> {
        self.ctx.session().token()?;
        let post_id = self.post_id;
        let settlement = self
            .cell
            .run(
                &self.ctx,
                MutationKey::Like(post_id),
                |state| {
                    let previous = *state;
                    *state = previous.toggled();
                    Some(previous)
                },
                |state| {
                    if state.liked {
                        MutationRequest::Like(post_id)
                    } else {
                        MutationRequest::Unlike(post_id)
                    }
                },
                |state, previous| *state = previous,
            )
            .await;
        Ok(settlement)
    }

    /// Takes the counters of a refetched post; ignored while a toggle is pending.
    pub fn sync_from_server(&self, post: &PostResponse) -> bool {
        let fresh = LikeState::from_post(post);
        self.cell.sync(
            |key| *key == MutationKey::Like(self.post_id),
            |state| {
                *state = fresh;
                true
            },
        )
    }
}

#[cfg(test)]
#[path = "tests/like_tests.rs"]
mod tests;
