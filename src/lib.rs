mod error;
mod leaderboard;
mod score;
mod service;
mod smart_key;
mod store;
mod tweet;
mod window;

pub use error::{EngagementError, SmartKeyError, StoreError};
pub use leaderboard::{build as build_leaderboard, rank_of, LeaderboardEntry};
pub use score::{score, EngagementMetadata};
pub use service::{Dashboard, EngagementService};
pub use smart_key::SmartKeyVerifier;
pub use store::{EngagementStore, MemoryStore};
pub use tweet::{LookupField, Tweet, User, UserActivity};
pub use window::{active_window, Window, WindowPolicy, WINDOW_LENGTH};
