use shared::error::ApiException;
use thiserror::Error;

/// Why a feed mutation did not go through.
///
/// `Transport` and `Status` are reconciliation failures: the optimistic
/// value has already been applied and is rolled back. The other variants
/// are raised before any local state changes.
#[derive(Debug, Clone, Error)]
pub enum MutationError {
    #[error("not signed in")]
    NotAuthenticated,
    #[error("action not permitted: {0}")]
    NotEligible(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server rejected request: {0}")]
    Status(#[from] ApiException),
}

impl MutationError {
    pub fn not_eligible(reason: impl Into<String>) -> Self {
        Self::NotEligible(reason.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(err) => Some(err.status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MutationError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Self::Status(ApiException::new(status.as_u16(), value.to_string())),
            None => Self::Transport(value.to_string()),
        }
    }
}
