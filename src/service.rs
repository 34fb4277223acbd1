use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

use crate::error::{EngagementError, StoreError};
use crate::leaderboard::{self, LeaderboardEntry};
use crate::score::EngagementMetadata;
use crate::smart_key::SmartKeyVerifier;
use crate::store::EngagementStore;
use crate::tweet::{LookupField, User};
use crate::window::{Window, WindowPolicy};

/// A user's own numbers next to their place on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub user: User,
    pub metadata: EngagementMetadata,
    pub rank: Option<usize>,
}

#[derive(TypedBuilder)]
pub struct EngagementService<S> {
    store: S,

    verifier: SmartKeyVerifier,

    #[builder(default)]
    window_policy: WindowPolicy,

    /// Deadline for each store read. Reads past it fail instead of yielding partial data.
    #[builder(setter(strip_option), default)]
    read_timeout: Option<Duration>,
}

impl<S: EngagementStore> EngagementService<S> {
    pub fn window_at(&self, now: OffsetDateTime) -> Window {
        self.window_policy.active_window(now)
    }

    async fn read<T>(
        &self,
        query: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, query)
                .await
                .map_err(|_| StoreError::TimedOut(limit))?,
            None => query.await,
        }
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, EngagementError> {
        self.leaderboard_at(OffsetDateTime::now_utc()).await
    }

    pub async fn leaderboard_at(
        &self,
        now: OffsetDateTime,
    ) -> Result<Vec<LeaderboardEntry>, EngagementError> {
        let window = self.window_at(now);
        let users = self
            .read(self.store.users_with_tweets_in_range(window))
            .await?;
        let board = leaderboard::build(&users, &window);
        info!("leaderboard ranked {} of {} users", board.len(), users.len());
        Ok(board)
    }

    /// Resolve a user by `field` and report their metrics and rank.
    pub async fn info_at(
        &self,
        field: LookupField,
        value: &str,
        now: OffsetDateTime,
    ) -> Result<Dashboard, EngagementError> {
        let window = self.window_at(now);
        let (user, users) = futures_util::try_join!(
            self.read(self.store.find_user(field, value, window)),
            self.read(self.store.users_with_tweets_in_range(window)),
        )?;

        let user = user.ok_or_else(|| EngagementError::NotFound {
            field,
            value: value.to_owned(),
        })?;
        let metadata = EngagementMetadata::collect(&user.tweets, &window);
        let board = leaderboard::build(&users, &window);
        let rank = leaderboard::rank_of(&user.id, &board);
        debug!("user {} holds rank {:?} of {}", user.id, rank, board.len());

        Ok(Dashboard {
            user,
            metadata,
            rank,
        })
    }

    pub async fn dashboard(&self, profile_id: &str) -> Result<Dashboard, EngagementError> {
        self.dashboard_at(profile_id, OffsetDateTime::now_utc())
            .await
    }

    pub async fn dashboard_at(
        &self,
        profile_id: &str,
        now: OffsetDateTime,
    ) -> Result<Dashboard, EngagementError> {
        self.info_at(LookupField::ProfileId, profile_id, now).await
    }

    /// Mint a smart key for `username`, salted with their profile id.
    pub async fn issue_smart_key(
        &self,
        username: &str,
        plaintext: &str,
    ) -> Result<String, EngagementError> {
        let window = self.window_at(OffsetDateTime::now_utc());
        let user = self.find_by_username(username, window).await?;
        Ok(self.verifier.issue(plaintext.as_bytes(), &user.profile_id)?)
    }

    async fn find_by_username(
        &self,
        username: &str,
        window: Window,
    ) -> Result<User, EngagementError> {
        self.read(self.store.find_user(LookupField::Username, username, window))
            .await?
            .ok_or_else(|| EngagementError::NotFound {
                field: LookupField::Username,
                value: username.to_owned(),
            })
    }

    pub async fn verify_smart_key(
        &self,
        username: &str,
        key: &str,
    ) -> Result<Dashboard, EngagementError> {
        self.verify_smart_key_at(username, key, OffsetDateTime::now_utc())
            .await
    }

    /// Dashboard for `username`, gated on `key` opening to the same value as
    /// the user's stored smart key.
    pub async fn verify_smart_key_at(
        &self,
        username: &str,
        key: &str,
        now: OffsetDateTime,
    ) -> Result<Dashboard, EngagementError> {
        let window = self.window_at(now);
        let user = self.find_by_username(username, window).await?;

        match self.verifier.check(key, &user.smart_key, &user.profile_id) {
            Ok(true) => {}
            Ok(false) => {
                warn!("smart key mismatch for {}", username);
                return Err(EngagementError::Unauthorized("invalid smart key".into()));
            }
            Err(e) => {
                warn!("smart key for {} failed to decrypt: {}", username, e);
                return Err(e.into());
            }
        }

        self.info_at(LookupField::SmartKey, &user.smart_key, now)
            .await
    }
}
