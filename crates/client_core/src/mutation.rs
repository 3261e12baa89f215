//! Optimistic apply / dispatch / reconcile, shared by every toggle-style
//! action in the feed.

use std::{
    collections::HashSet,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::{CommentId, PostId, UserId};
use tracing::{debug, info, warn};

use crate::{error::MutationError, transport::MutationRequest, view::ViewContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Like,
    Follow,
    DeleteComment,
    DeletePost,
}

/// Entity-action pair; at most one request per key is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKey {
    Like(PostId),
    Follow(UserId),
    DeleteComment(PostId, CommentId),
    DeletePost(PostId),
}

impl MutationKey {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Like(_) => MutationKind::Like,
            Self::Follow(_) => MutationKind::Follow,
            Self::DeleteComment(..) => MutationKind::DeleteComment,
            Self::DeletePost(_) => MutationKind::DeletePost,
        }
    }
}

impl fmt::Display for MutationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Like(post_id) => write!(f, "like:{post_id}"),
            Self::Follow(author_id) => write!(f, "follow:{author_id}"),
            Self::DeleteComment(post_id, comment_id) => {
                write!(f, "delete-comment:{post_id}/{comment_id}")
            }
            Self::DeletePost(post_id) => write!(f, "delete-post:{post_id}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Settlement {
    /// Server accepted; the optimistic value stays.
    Confirmed,
    /// Server refused or the request failed; the value was rolled back.
    Reverted(MutationError),
    /// Same key already pending, or nothing to apply. No request was sent.
    Skipped,
    /// View closed before the response arrived; nothing was reconciled.
    Dropped,
}

impl Settlement {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }

    pub fn is_reverted(&self) -> bool {
        matches!(self, Self::Reverted(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped)
    }
}

pub type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct CellState<T> {
    value: T,
    pending: HashSet<MutationKey>,
}

fn lock<T>(inner: &Mutex<T>) -> MutexGuard<'_, T> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Pending key plus the undo for one dispatched mutation. Dropping it
/// unsettled (the caller's future was cancelled) clears the key and reverts.
struct InFlight<'a, T, U, V>
where
    V: FnOnce(&mut T, U),
{
    inner: &'a Mutex<CellState<T>>,
    key: MutationKey,
    undo: Option<(U, V)>,
}

impl<T, U, V> InFlight<'_, T, U, V>
where
    T: Clone,
    V: FnOnce(&mut T, U),
{
    /// Clears the key and applies the outcome. `None` when the view closed.
    fn settle(
        mut self,
        result: Result<(), MutationError>,
        view_closed: bool,
    ) -> Option<(Settlement, T)> {
        let undo = self.undo.take();
        let mut state = lock(self.inner);
        state.pending.remove(&self.key);
        if view_closed {
            return None;
        }
        match result {
            Ok(()) => Some((Settlement::Confirmed, state.value.clone())),
            Err(err) => {
                if let Some((undo, revert)) = undo {
                    revert(&mut state.value, undo);
                }
                Some((Settlement::Reverted(err), state.value.clone()))
            }
        }
    }
}

impl<T, U, V> Drop for InFlight<'_, T, U, V>
where
    V: FnOnce(&mut T, U),
{
    fn drop(&mut self) {
        let Some((undo, revert)) = self.undo.take() else {
            return;
        };
        let mut state = lock(self.inner);
        state.pending.remove(&self.key);
        revert(&mut state.value, undo);
        warn!(key = %self.key, "mutation abandoned before it settled; reverted");
    }
}

/// Locally owned copy of server state that mutates optimistically.
///
/// The lock is only held for synchronous edits, never across a request.
pub struct OptimisticCell<T> {
    inner: Mutex<CellState<T>>,
    on_settled: Option<Observer<T>>,
}

impl<T> OptimisticCell<T>
where
    T: Clone + Send,
{
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(CellState {
                value,
                pending: HashSet::new(),
            }),
            on_settled: None,
        }
    }

    /// Called with the final value after every confirm or revert, so a
    /// sibling view can update its own copy.
    pub fn with_observer(mut self, observer: Observer<T>) -> Self {
        self.on_settled = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Observer<T>) {
        self.on_settled = Some(observer);
    }

    pub fn snapshot(&self) -> T {
        lock(&self.inner).value.clone()
    }

    pub fn is_pending(&self, key: MutationKey) -> bool {
        lock(&self.inner).pending.contains(&key)
    }

    /// Non-optimistic local write, e.g. appending a server-created item.
    pub fn update<F>(&self, update: F)
    where
        F: FnOnce(&mut T),
    {
        update(&mut lock(&self.inner).value);
    }

    /// Adopts refetched server state unless a matching request is pending.
    /// `update` may itself decline by returning `false`.
    pub fn sync<F>(&self, guard: impl Fn(&MutationKey) -> bool, update: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let mut state = lock(&self.inner);
        if state.pending.iter().any(guard) {
            return false;
        }
        update(&mut state.value)
    }

    /// Runs one optimistic mutation.
    ///
    /// `apply` edits the value in place and returns what `revert` needs to
    /// undo it (or `None` to decline). `request` picks the network call from
    /// the optimistic value. If the returned future is dropped mid-request
    /// the key is released and the value reverted.
    pub async fn run<U, A, R, V>(
        &self,
        ctx: &ViewContext,
        key: MutationKey,
        apply: A,
        request: R,
        revert: V,
    ) -> Settlement
    where
        U: Send,
        A: FnOnce(&mut T) -> Option<U> + Send,
        R: FnOnce(&T) -> MutationRequest + Send,
        V: FnOnce(&mut T, U) + Send,
    {
        let (in_flight, outbound) = {
            let mut state = lock(&self.inner);
            if state.pending.contains(&key) {
                debug!(%key, "mutation already in flight; ignoring trigger");
                return Settlement::Skipped;
            }
            let Some(undo) = apply(&mut state.value) else {
                debug!(%key, "mutation declined by local state");
                return Settlement::Skipped;
            };
            state.pending.insert(key);
            let outbound = request(&state.value);
            let in_flight = InFlight {
                inner: &self.inner,
                key,
                undo: Some((undo, revert)),
            };
            (in_flight, outbound)
        };

        debug!(
            %key,
            method = %outbound.method(),
            path = %outbound.path(),
            "dispatching mutation"
        );
        let result = ctx.transport().execute(ctx.session(), outbound).await;

        let view_closed = ctx.scope().is_closed();
        let Some((settlement, settled_value)) = in_flight.settle(result, view_closed) else {
            info!(%key, "view closed before mutation settled; dropping result");
            return Settlement::Dropped;
        };

        match &settlement {
            Settlement::Reverted(err) => {
                warn!(%key, "mutation reverted: {err}");
                ctx.events().failed(key, err);
            }
            _ => {
                debug!(%key, "mutation confirmed");
                ctx.events().confirmed(key);
            }
        }
        if let Some(observer) = &self.on_settled {
            observer(&settled_value);
        }

        settlement
    }
}

/// An item taken out of an ordered list, with its rank in `order`: the
/// list's order including items whose removal is still pending.
pub(crate) struct Removed<T> {
    item: T,
    rank: usize,
}

impl<T> Removed<T> {
    pub(crate) fn take<K: PartialEq>(
        items: &mut Vec<T>,
        order: &[K],
        id: impl Fn(&T) -> K,
        target: &K,
    ) -> Option<Self> {
        let index = items.iter().position(|item| id(item) == *target)?;
        let rank = order
            .iter()
            .position(|key| key == target)
            .unwrap_or(order.len());
        Some(Self {
            item: items.remove(index),
            rank,
        })
    }

    /// Reinserts before the first remaining item that ranks after it.
    pub(crate) fn restore<K: PartialEq>(
        self,
        items: &mut Vec<T>,
        order: &[K],
        id: impl Fn(&T) -> K,
    ) {
        let rank_of = |item: &T| {
            let key = id(item);
            order
                .iter()
                .position(|candidate| *candidate == key)
                .unwrap_or(usize::MAX)
        };
        let index = items
            .iter()
            .position(|item| rank_of(item) > self.rank)
            .unwrap_or(items.len());
        items.insert(index, self.item);
    }
}

#[cfg(test)]
#[path = "tests/mutation_tests.rs"]
mod tests;
