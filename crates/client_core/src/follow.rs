use shared::{
    domain::{AccountType, UserId},
    protocol::PostResponse,
};

use crate::{
    error::MutationError,
    mutation::{MutationKey, Observer, OptimisticCell, Settlement},
    session::Session,
    transport::MutationRequest,
    view::ViewContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowState {
    pub following: bool,
    /// Set once the viewer toggles; server re-syncs no longer override it.
    pub touched: bool,
}

impl FollowState {
    pub fn new(following: bool) -> Self {
        Self {
            following,
            touched: false,
        }
    }
}

/// Only students may follow, only teachers can be followed, never oneself.
pub fn check_follow_eligibility(
    session: &Session,
    author_id: UserId,
    author_role: AccountType,
) -> Result<(), MutationError> {
    let viewer = session
        .current_user()
        .ok_or_else(|| MutationError::not_eligible("viewer profile is not loaded"))?;
    if viewer.account_type != AccountType::Student {
        return Err(MutationError::not_eligible("only students can follow"));
    }
    if author_role != AccountType::Teacher {
        return Err(MutationError::not_eligible("only teachers can be followed"));
    }
    if viewer.id == author_id {
        return Err(MutationError::not_eligible("cannot follow yourself"));
    }
    Ok(())
}

/// Follow button next to a post's author.
pub struct FollowToggle {
    author_id: UserId,
    author_role: AccountType,
    cell: OptimisticCell<FollowState>,
    ctx: ViewContext,
}

impl FollowToggle {
    pub fn new(ctx: ViewContext, post: &PostResponse) -> Self {
        Self::with_state(
            ctx,
            post.author_id,
            post.author_role,
            FollowState::new(post.following_author()),
        )
    }

    pub fn with_state(
        ctx: ViewContext,
        author_id: UserId,
        author_role: AccountType,
        state: FollowState,
    ) -> Self {
        Self {
            author_id,
            author_role,
            cell: OptimisticCell::new(state),
            ctx,
        }
    }

    pub fn on_settled(mut self, observer: Observer<FollowState>) -> Self {
        self.cell.set_observer(observer);
        self
    }

    pub fn author_id(&self) -> UserId {
        self.author_id
    }

    /// Whether the button should be offered to this viewer at all.
    pub fn is_available(&self) -> bool {
        check_follow_eligibility(self.ctx.session(), self.author_id, self.author_role).is_ok()
    }

    pub fn state(&self) -> FollowState {
        self.cell.snapshot()
    }

    pub fn is_pending(&self) -> bool {
        self.cell.is_pending(MutationKey::Follow(self.author_id))
    }

    pub async fn toggle(&self) -> Result<Settlement, MutationError> {
        self.ctx.session().token()?;
        check_follow_eligibility(self.ctx.session(), self.author_id, self.author_role)?;
        let author_id = self.author_id;
        let settlement = self
            .cell
            .run(
                &self.ctx,
                MutationKey::Follow(author_id),
                |state| {
                    let previous = *state;
                    state.following = !previous.following;
                    state.touched = true;
                    Some(previous)
                },
                |state| {
                    if state.following {
                        MutationRequest::Follow(author_id)
                    } else {
                        MutationRequest::Unfollow(author_id)
                    }
                },
                |state, previous| *state = previous,
            )
            .await;
        Ok(settlement)
    }

    pub fn sync_from_server(&self, post: &PostResponse) -> bool {
        if post.author_id != self.author_id {
            return false;
        }
        let following = post.following_author();
        self.cell.sync(
            |key| *key == MutationKey::Follow(self.author_id),
            |state| {
                if state.touched {
                    return false;
                }
                state.following = following;
                true
            },
        )
    }
}

#[cfg(test)]
#[path = "tests/follow_tests.rs"]
mod tests;
