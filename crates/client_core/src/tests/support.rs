use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use shared::{
    domain::{AccountType, CommentId, PostCategory, PostId, UserId},
    error::ApiException,
    protocol::{CommentResponse, PostResponse, UserProfile},
};
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::{
    error::MutationError,
    events::FeedEvents,
    session::Session,
    transport::{FeedTransport, MutationRequest},
    view::{ViewContext, ViewScope},
};

pub(crate) type Reply = oneshot::Sender<Result<(), MutationError>>;

/// Parks every request until the test answers it.
pub(crate) struct GatedTransport {
    requests: mpsc::UnboundedSender<(MutationRequest, Reply)>,
}

pub(crate) fn gated_transport() -> (
    Arc<GatedTransport>,
    mpsc::UnboundedReceiver<(MutationRequest, Reply)>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(GatedTransport { requests: tx }), rx)
}

#[async_trait]
impl FeedTransport for GatedTransport {
    async fn execute(
        &self,
        _session: &Session,
        request: MutationRequest,
    ) -> Result<(), MutationError> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send((request, tx))
            .map_err(|_| MutationError::Transport("test harness gone".into()))?;
        rx.await
            .unwrap_or_else(|_| Err(MutationError::Transport("reply dropped".into())))
    }

    async fn create_comment(
        &self,
        session: &Session,
        post_id: PostId,
        content: &str,
    ) -> Result<CommentResponse, MutationError> {
        let author = session.viewer_id().unwrap_or(UserId(0));
        let mut created = comment(100, post_id.0, author.0);
        created.content = content.to_string();
        Ok(created)
    }
}

/// Answers requests in order from a script and records them.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<(), MutationError>>>,
    calls: Mutex<Vec<MutationRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<Result<(), MutationError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) async fn calls(&self) -> Vec<MutationRequest> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl FeedTransport for ScriptedTransport {
    async fn execute(
        &self,
        _session: &Session,
        request: MutationRequest,
    ) -> Result<(), MutationError> {
        self.calls.lock().await.push(request);
        self.responses.lock().await.pop_front().unwrap_or(Ok(()))
    }

    async fn create_comment(
        &self,
        _session: &Session,
        post_id: PostId,
        _content: &str,
    ) -> Result<CommentResponse, MutationError> {
        Err(MutationError::Status(ApiException::new(
            500,
            format!("comments disabled for post {post_id}"),
        )))
    }
}

pub(crate) fn http_error(status: u16) -> MutationError {
    MutationError::Status(ApiException::new(status, "scripted failure"))
}

pub(crate) fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 2, 3)
        .and_then(|date| date.and_hms_opt(9, 30, 0))
        .expect("valid timestamp")
}

pub(crate) fn profile(id: i64, account_type: AccountType) -> UserProfile {
    UserProfile {
        id: UserId(id),
        first_name: format!("User{id}"),
        last_name: "Test".into(),
        email: format!("user{id}@college.edu"),
        account_type,
        role: Some("USER".into()),
        verified: account_type == AccountType::Teacher,
        profile_image_url: None,
        follower_count: 0,
        following_count: 0,
    }
}

pub(crate) fn post(id: i64, author: &UserProfile, liked: bool, like_count: u64) -> PostResponse {
    PostResponse {
        id: PostId(id),
        title: format!("Post {id}"),
        content: "Lab timings moved to Friday".into(),
        image_url: None,
        category: PostCategory::Notice,
        author_name: author.display_name(),
        author_role: author.account_type,
        author_verified: author.verified,
        author_image_url: None,
        author_id: author.id,
        following_author: Some(false),
        like_count: Some(like_count),
        liked_by_current_user: Some(liked),
        comment_count: Some(0),
        created_at: timestamp(),
        updated_at: None,
    }
}

pub(crate) fn comment(id: i64, post_id: i64, author_id: i64) -> CommentResponse {
    CommentResponse {
        id: CommentId(id),
        content: format!("comment {id}"),
        post_id: PostId(post_id),
        author_id: UserId(author_id),
        author_name: format!("User{author_id}"),
        author_role: AccountType::Student,
        author_verified: false,
        created_at: timestamp(),
        author_image_url: None,
    }
}

pub(crate) fn student_session(id: i64) -> Session {
    Session::authenticated("student-token", profile(id, AccountType::Student))
}

pub(crate) fn context(transport: Arc<dyn FeedTransport>, session: Session) -> ViewContext {
    ViewContext::new(session, transport, FeedEvents::default(), ViewScope::new())
}
