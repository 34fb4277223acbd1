use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::StoreError;
use crate::tweet::{LookupField, User, UserActivity};
use crate::window::Window;

/// Read-only query capability over users and their tweets.
#[async_trait]
pub trait EngagementStore: Send + Sync {
    /// Every user, with tweets restricted to `window`.
    async fn users_with_tweets_in_range(
        &self,
        window: Window,
    ) -> Result<Vec<UserActivity>, StoreError>;

    /// The user whose `field` equals `value`, with tweets restricted to `window`.
    async fn find_user(
        &self,
        field: LookupField,
        value: &str,
        window: Window,
    ) -> Result<Option<User>, StoreError>;
}

/// Snapshot of users held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: Vec<User>,
}

impl MemoryStore {
    /// Fails when any unique user attribute repeats.
    pub fn new(users: Vec<User>) -> Result<Self, StoreError> {
        validate(&users)?;
        Ok(Self { users })
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let users: Vec<User> =
            serde_json::from_str(json).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Self::new(users)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;
        let store = Self::from_json(&json)?;
        debug!("loaded {} users from {}", store.users.len(), path.display());
        Ok(store)
    }
}

fn validate(users: &[User]) -> Result<(), StoreError> {
    let mut ids = HashSet::new();
    let mut profile_ids = HashSet::new();
    let mut usernames = HashSet::new();
    let mut smart_keys = HashSet::new();

    for user in users {
        let unique = [
            ("id", ids.insert(user.id.as_str())),
            ("profile id", profile_ids.insert(user.profile_id.as_str())),
            ("username", usernames.insert(user.username.as_str())),
            ("smart key", smart_keys.insert(user.smart_key.as_str())),
        ];
        if let Some((field, _)) = unique.iter().find(|(_, fresh)| !fresh) {
            return Err(StoreError::Corrupt(format!(
                "duplicate {field} for user {}",
                user.id
            )));
        }
        if let Some(tweet) = user.tweets.iter().find(|t| t.user_id != user.id) {
            return Err(StoreError::Corrupt(format!(
                "tweet owned by {} listed under user {}",
                tweet.user_id, user.id
            )));
        }
    }

    Ok(())
}

fn restrict(user: &User, window: &Window) -> User {
    User {
        tweets: user
            .tweets
            .iter()
            .filter(|t| window.contains(t.created_at))
            .cloned()
            .collect(),
        ..user.clone()
    }
}

#[async_trait]
impl EngagementStore for MemoryStore {
    async fn users_with_tweets_in_range(
        &self,
        window: Window,
    ) -> Result<Vec<UserActivity>, StoreError> {
        Ok(self
            .users
            .iter()
            .map(|user| restrict(user, &window).activity())
            .collect())
    }

    async fn find_user(
        &self,
        field: LookupField,
        value: &str,
        window: Window,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|user| user.matches(field, value))
            .map(|user| restrict(user, &window)))
    }
}
