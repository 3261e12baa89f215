//! Per-view lifetime and the capabilities a view is built with.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{events::FeedEvents, session::Session, transport::FeedTransport};

/// Lifetime of one mounted view. Closing it drops every reconciliation
/// that has not been applied yet.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope that closes with `self` but can also be closed on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Everything a feed view needs to run mutations.
#[derive(Clone)]
pub struct ViewContext {
    session: Session,
    transport: Arc<dyn FeedTransport>,
    events: FeedEvents,
    scope: ViewScope,
}

impl ViewContext {
    pub fn new(
        session: Session,
        transport: Arc<dyn FeedTransport>,
        events: FeedEvents,
        scope: ViewScope,
    ) -> Self {
        Self {
            session,
            transport,
            events,
            scope,
        }
    }

    /// Same capabilities, scoped to a nested view.
    pub fn child(&self) -> Self {
        Self {
            session: self.session.clone(),
            transport: Arc::clone(&self.transport),
            events: self.events.clone(),
            scope: self.scope.child(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &dyn FeedTransport {
        self.transport.as_ref()
    }

    pub fn events(&self) -> &FeedEvents {
        &self.events
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
