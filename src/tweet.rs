use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Which unique user attribute a lookup resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupField {
    ProfileId,
    SmartKey,
    Username,
}

impl std::fmt::Display for LookupField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProfileId => write!(f, "profile id"),
            Self::SmartKey => write!(f, "smart key"),
            Self::Username => write!(f, "username"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub profile_id: String,
    pub username: String,
    pub display_name: String,

    /// Opaque encrypted token, never echoed back to callers.
    #[serde(skip_serializing)]
    pub smart_key: String,

    #[serde(default)]
    pub tweets: Vec<Tweet>,
}

impl User {
    pub fn matches(&self, field: LookupField, value: &str) -> bool {
        match field {
            LookupField::ProfileId => self.profile_id == value,
            LookupField::SmartKey => self.smart_key == value,
            LookupField::Username => self.username == value,
        }
    }

    pub fn activity(&self) -> UserActivity {
        UserActivity {
            id: self.id.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            tweets: self.tweets.clone(),
        }
    }
}

/// A tweet with its engagement counters as last ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub user_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub referenced: bool,
    #[serde(default)]
    pub like: u64,
    #[serde(default)]
    pub retweet: u64,
    #[serde(default)]
    pub reply: u64,
    #[serde(default)]
    pub impression: u64,
    #[serde(default)]
    pub quote: u64,
}

/// The slice of a user the leaderboard needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserActivity {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub tweets: Vec<Tweet>,
}
