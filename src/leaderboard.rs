use std::cmp::Reverse;

use serde::Serialize;

use crate::score::score;
use crate::tweet::UserActivity;
use crate::window::Window;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(skip_serializing)]
    pub id: String,
    pub username: String,
    pub display_name: String,
    /// Every tweet inside the window, scored or not.
    #[serde(rename = "tweets")]
    pub tweet_count: usize,
    pub impressions: u64,
}

/// Rank users with positive impact inside `window`.
///
/// Ordered by descending impressions; ties fall back to ascending user id so
/// the ordering is total.
pub fn build<'a>(
    users: impl IntoIterator<Item = &'a UserActivity>,
    window: &Window,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<_> = users
        .into_iter()
        .filter_map(|user| {
            let mut tweet_count = 0;
            let mut impressions = 0;
            for tweet in user.tweets.iter().filter(|t| window.contains(t.created_at)) {
                tweet_count += 1;
                impressions = score(tweet).saturating_add(impressions);
            }

            (impressions > 0).then(|| LeaderboardEntry {
                id: user.id.clone(),
                username: user.username.clone(),
                display_name: user.display_name.clone(),
                tweet_count,
                impressions,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        Reverse(a.impressions)
            .cmp(&Reverse(b.impressions))
            .then_with(|| a.id.cmp(&b.id))
    });
    entries
}

/// 1-based position of `user_id`, or `None` when the user has no impact.
pub fn rank_of(user_id: &str, leaderboard: &[LeaderboardEntry]) -> Option<usize> {
    leaderboard
        .iter()
        .position(|entry| entry.id == user_id)
        .map(|index| index + 1)
}
