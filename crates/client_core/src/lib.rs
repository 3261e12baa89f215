use std::sync::Arc;

use anyhow::{Context, Result};
use shared::{
    domain::{FollowListKind, PostId, UserId},
    protocol::{CommentResponse, PostResponse, UserProfile},
};
use tokio::sync::broadcast;
use tracing::info;

pub mod comments;
pub mod config;
pub mod error;
pub mod events;
pub mod follow;
pub mod like;
pub mod mutation;
pub mod posts;
pub mod session;
pub mod transport;
pub mod view;

pub use comments::{CommentThread, CommentThreadState};
pub use config::{load_settings, ClientSettings};
pub use error::MutationError;
pub use events::{FeedEvent, FeedEvents};
pub use follow::{FollowState, FollowToggle};
pub use like::{LikeState, LikeToggle};
pub use mutation::{MutationKey, MutationKind, OptimisticCell, Settlement};
pub use posts::{FeedList, FeedListState};
pub use session::Session;
pub use transport::{FeedTransport, HttpTransport, MutationRequest};
pub use view::{ViewContext, ViewScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    All,
    Following,
}

impl FeedSource {
    fn path(self) -> &'static str {
        match self {
            Self::All => "/feed/all",
            Self::Following => "/feed/following",
        }
    }
}

/// Entry point for feed screens: reads entities and hands out view
/// contexts that mutate them.
pub struct FeedClient {
    transport: Arc<HttpTransport>,
    session: Session,
    events: FeedEvents,
}

impl FeedClient {
    pub fn new(transport: Arc<HttpTransport>, session: Session, events: FeedEvents) -> Self {
        Self {
            transport,
            session,
            events,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let transport = HttpTransport::new(&settings.api_base_url, settings.request_timeout())?;
        let session = settings
            .token
            .as_deref()
            .map(Session::with_token)
            .unwrap_or_default();
        Ok(Self::new(
            Arc::new(transport),
            session,
            FeedEvents::new(settings.event_buffer),
        ))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    /// Context for a view living inside `scope`.
    pub fn view(&self, scope: ViewScope) -> ViewContext {
        ViewContext::new(
            self.session.clone(),
            Arc::clone(&self.transport) as Arc<dyn FeedTransport>,
            self.events.clone(),
            scope,
        )
    }

    /// Fetches `/user/me` and records it as the session's viewer.
    pub async fn load_current_user(&mut self) -> Result<UserProfile> {
        let me: UserProfile = self
            .transport
            .get_json(&self.session, "/user/me")
            .await
            .context("failed to load current user")?;
        info!(user_id = me.id.0, account_type = ?me.account_type, "session user loaded");
        self.session.set_current_user(me.clone());
        Ok(me)
    }

    pub async fn fetch_feed(&self, source: FeedSource) -> Result<Vec<PostResponse>> {
        let posts: Vec<PostResponse> = self
            .transport
            .get_json(&self.session, source.path())
            .await
            .with_context(|| format!("failed to load feed {source:?}"))?;
        Ok(posts)
    }

    pub async fn fetch_post(&self, post_id: PostId) -> Result<PostResponse> {
        let post = self
            .transport
            .get_json(&self.session, &format!("/posts/{post_id}"))
            .await
            .with_context(|| format!("failed to load post {post_id}"))?;
        Ok(post)
    }

    pub async fn fetch_comments(&self, post_id: PostId) -> Result<Vec<CommentResponse>> {
        let comments = self
            .transport
            .get_json(&self.session, &format!("/posts/{post_id}/comments"))
            .await
            .with_context(|| format!("failed to load comments for post {post_id}"))?;
        Ok(comments)
    }

    pub async fn fetch_follow_list(
        &self,
        user_id: UserId,
        kind: FollowListKind,
    ) -> Result<Vec<UserProfile>> {
        let endpoint = kind.config().endpoint;
        let users = self
            .transport
            .get_json(&self.session, &format!("/follow/{user_id}/{endpoint}"))
            .await
            .with_context(|| format!("failed to load {endpoint} of user {user_id}"))?;
        Ok(users)
    }

    /// Fetches a feed page and wraps it in a list bound to `ctx`.
    pub async fn open_feed(&self, ctx: ViewContext, source: FeedSource) -> Result<FeedList> {
        let posts = self.fetch_feed(source).await?;
        Ok(FeedList::new(ctx, posts))
    }

    /// Fetches a post's comments and wraps them in a thread bound to `ctx`.
    pub async fn open_comments(&self, ctx: ViewContext, post_id: PostId) -> Result<CommentThread> {
        let comments = self.fetch_comments(post_id).await?;
        Ok(CommentThread::new(ctx, post_id, comments))
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
