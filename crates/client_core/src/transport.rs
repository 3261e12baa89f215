//! REST plumbing between feed views and the backend.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{CommentId, PostId, UserId},
    error::ApiException,
    protocol::{CommentResponse, CreateCommentRequest},
};
use tracing::{debug, warn};
use url::Url;

use crate::{error::MutationError, mutation::MutationKind, session::Session};

/// One network request representing a user intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationRequest {
    Like(PostId),
    Unlike(PostId),
    Follow(UserId),
    Unfollow(UserId),
    DeleteComment {
        post_id: PostId,
        comment_id: CommentId,
    },
    DeletePost(PostId),
}

impl MutationRequest {
    pub fn method(&self) -> Method {
        match self {
            Self::Like(_) | Self::Follow(_) => Method::POST,
            Self::Unlike(_)
            | Self::Unfollow(_)
            | Self::DeleteComment { .. }
            | Self::DeletePost(_) => Method::DELETE,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Like(post_id) | Self::Unlike(post_id) => format!("/posts/{post_id}/likes"),
            Self::Follow(author_id) | Self::Unfollow(author_id) => format!("/follow/{author_id}"),
            Self::DeleteComment {
                post_id,
                comment_id,
            } => format!("/posts/{post_id}/comments/{comment_id}"),
            Self::DeletePost(post_id) => format!("/posts/{post_id}"),
        }
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Like(_) | Self::Unlike(_) => MutationKind::Like,
            Self::Follow(_) | Self::Unfollow(_) => MutationKind::Follow,
            Self::DeleteComment { .. } => MutationKind::DeleteComment,
            Self::DeletePost(_) => MutationKind::DeletePost,
        }
    }
}

#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Issues the request; only the success/failure signal is meaningful.
    async fn execute(&self, session: &Session, request: MutationRequest)
        -> Result<(), MutationError>;

    async fn create_comment(
        &self,
        session: &Session,
        post_id: PostId,
        content: &str,
    ) -> Result<CommentResponse, MutationError>;
}

pub struct MissingFeedTransport;

#[async_trait]
impl FeedTransport for MissingFeedTransport {
    async fn execute(
        &self,
        _session: &Session,
        request: MutationRequest,
    ) -> Result<(), MutationError> {
        Err(MutationError::Transport(format!(
            "feed backend unavailable for {} {}",
            request.method(),
            request.path()
        )))
    }

    async fn create_comment(
        &self,
        _session: &Session,
        post_id: PostId,
        _content: &str,
    ) -> Result<CommentResponse, MutationError> {
        Err(MutationError::Transport(format!(
            "feed backend unavailable for comments on post {post_id}"
        )))
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("invalid API base URL {base_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("unsupported API base URL scheme {}", parsed.scheme());
        }
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(
        &self,
        session: &Session,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, MutationError> {
        let token = session.token()?;
        Ok(self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token))
    }

    async fn send(builder: RequestBuilder) -> Result<Response, MutationError> {
        let res = builder.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body
        };
        Err(ApiException::new(status.as_u16(), message).into())
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
    ) -> Result<T, MutationError> {
        let res = Self::send(self.request(session, Method::GET, path)?).await?;
        let body = res.json::<T>().await?;
        Ok(body)
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn execute(
        &self,
        session: &Session,
        request: MutationRequest,
    ) -> Result<(), MutationError> {
        let path = request.path();
        let builder = self.request(session, request.method(), &path)?;
        match Self::send(builder).await {
            Ok(_) => {
                debug!(method = %request.method(), path = %path, "feed mutation accepted");
                Ok(())
            }
            Err(err) => {
                warn!(
                    kind = ?request.kind(),
                    method = %request.method(),
                    path = %path,
                    "feed mutation failed: {err}"
                );
                Err(err)
            }
        }
    }

    async fn create_comment(
        &self,
        session: &Session,
        post_id: PostId,
        content: &str,
    ) -> Result<CommentResponse, MutationError> {
        let builder = self
            .request(session, Method::POST, &format!("/posts/{post_id}/comments"))?
            .json(&CreateCommentRequest {
                content: content.to_string(),
            });
        let res = Self::send(builder).await?;
        let comment = res.json::<CommentResponse>().await?;
        Ok(comment)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
