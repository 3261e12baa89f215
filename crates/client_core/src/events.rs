use tokio::sync::broadcast;

use crate::{
    error::MutationError,
    mutation::{MutationKey, MutationKind},
};

const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone)]
pub enum FeedEvent {
    MutationConfirmed {
        key: MutationKey,
    },
    /// Transient failure notice; every mutation kind reports the same way.
    MutationFailed {
        key: MutationKey,
        message: String,
        detail: String,
    },
}

#[derive(Debug, Clone)]
pub struct FeedEvents {
    tx: broadcast::Sender<FeedEvent>,
}

impl Default for FeedEvents {
    fn default() -> Self {
        Self::new(EVENT_BUFFER)
    }
}

impl FeedEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn confirmed(&self, key: MutationKey) {
        let _ = self.tx.send(FeedEvent::MutationConfirmed { key });
    }

    pub(crate) fn failed(&self, key: MutationKey, err: &MutationError) {
        let _ = self.tx.send(FeedEvent::MutationFailed {
            key,
            message: failure_message(key.kind()).to_string(),
            detail: err.to_string(),
        });
    }
}

pub fn failure_message(kind: MutationKind) -> &'static str {
    match kind {
        MutationKind::Like => "Could not update like. Please try again.",
        MutationKind::Follow => "Could not update follow. Please try again.",
        MutationKind::DeleteComment => "Could not delete comment. Please try again.",
        MutationKind::DeletePost => "Could not delete post. Please try again.",
    }
}
