use serde::Serialize;

use crate::tweet::Tweet;
use crate::window::Window;

/// Impact of a single tweet. Only referenced tweets count toward the campaign.
pub fn score(tweet: &Tweet) -> u64 {
    if !tweet.referenced {
        return 0;
    }
    [tweet.retweet, tweet.reply, tweet.impression, tweet.quote]
        .into_iter()
        .fold(tweet.like, u64::saturating_add)
}

/// Per-metric breakdown of a user's referenced tweets inside a window.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngagementMetadata {
    pub likes: u64,
    pub quotes: u64,
    pub replies: u64,
    pub views: u64,
    pub retweets: u64,
}

impl EngagementMetadata {
    pub fn collect<'a>(tweets: impl IntoIterator<Item = &'a Tweet>, window: &Window) -> Self {
        tweets
            .into_iter()
            .filter(|t| t.referenced && window.contains(t.created_at))
            .fold(Self::default(), |mut acc, t| {
                acc.likes = acc.likes.saturating_add(t.like);
                acc.quotes = acc.quotes.saturating_add(t.quote);
                acc.replies = acc.replies.saturating_add(t.reply);
                acc.views = acc.views.saturating_add(t.impression);
                acc.retweets = acc.retweets.saturating_add(t.retweet);
                acc
            })
    }
}
