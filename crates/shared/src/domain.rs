use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(PostId);
id_newtype!(CommentId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Student,
    Teacher,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostCategory {
    Notice,
    Placement,
    Doubt,
    #[default]
    #[serde(other)]
    General,
}

/// Which side of a follow relationship a list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowListKind {
    Followers,
    Following,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowListConfig {
    pub endpoint: &'static str,
    pub title: &'static str,
    pub empty_message: &'static str,
}

impl FollowListKind {
    pub const fn config(self) -> FollowListConfig {
        match self {
            Self::Followers => FollowListConfig {
                endpoint: "followers",
                title: "Followers",
                empty_message: "No followers yet.",
            },
            Self::Following => FollowListConfig {
                endpoint: "following",
                title: "Following",
                empty_message: "Not following anyone.",
            },
        }
    }
}
