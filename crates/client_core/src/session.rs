use std::fmt;

use shared::{
    domain::{AccountType, UserId},
    protocol::UserProfile,
};

use crate::error::MutationError;

/// Identity of the signed-in viewer, handed to every view explicitly.
#[derive(Clone, Default)]
pub struct Session {
    token: Option<String>,
    current_user: Option<UserProfile>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            current_user: None,
        }
    }

    pub fn authenticated(token: impl Into<String>, current_user: UserProfile) -> Self {
        Self {
            token: Some(token.into()),
            current_user: Some(current_user),
        }
    }

    pub fn set_current_user(&mut self, current_user: UserProfile) {
        self.current_user = Some(current_user);
    }

    pub fn token(&self) -> Result<&str, MutationError> {
        self.token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or(MutationError::NotAuthenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_ok()
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current_user.as_ref()
    }

    pub fn viewer_id(&self) -> Option<UserId> {
        self.current_user.as_ref().map(|user| user.id)
    }

    pub fn viewer_account_type(&self) -> Option<AccountType> {
        self.current_user.as_ref().map(|user| user.account_type)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("viewer_id", &self.viewer_id())
            .finish()
    }
}
