use time::{Duration, OffsetDateTime};

/// Length of an aggregation window.
pub const WINDOW_LENGTH: Duration = Duration::days(7);

/// Inclusive `[start, end]` range of tweet timestamps admitted into aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl Window {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: OffsetDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

/// How the active window is positioned relative to the current time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum WindowPolicy {
    /// `[now, now + 7d]`, the campaign's historical behavior.
    #[default]
    Forward,
    /// `[now - 7d, now]`, the last seven days.
    Trailing,
}

impl WindowPolicy {
    pub fn active_window(self, now: OffsetDateTime) -> Window {
        match self {
            Self::Forward => Window::new(now, now.saturating_add(WINDOW_LENGTH)),
            Self::Trailing => Window::new(now.saturating_sub(WINDOW_LENGTH), now),
        }
    }
}

/// Active window under the default policy.
pub fn active_window(now: OffsetDateTime) -> Window {
    WindowPolicy::default().active_window(now)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use time::PrimitiveDateTime;

    use super::*;

    // The forward window admits future timestamps and excludes the past week.
    // Kept as-is until the campaign decides to switch to the trailing policy.
    #[test]
    fn test_forward_window_starts_now() {
        let now = datetime!(2024-03-10 09:30 UTC);
        let window = active_window(now);

        assert_eq!(window.start, now);
        assert_eq!(window.end, datetime!(2024-03-17 09:30 UTC));
        assert!(window.contains(now));
        assert!(window.contains(window.end));
        assert!(!window.contains(now - Duration::seconds(1)));
    }

    #[test]
    fn test_trailing_window_ends_now() {
        let now = datetime!(2024-03-10 09:30 UTC);
        let window = WindowPolicy::Trailing.active_window(now);

        assert_eq!(window.start, datetime!(2024-03-03 09:30 UTC));
        assert_eq!(window.end, now);
        assert!(window.contains(now - Duration::days(3)));
        assert!(!window.contains(now + Duration::seconds(1)));
    }

    #[test]
    fn test_window_clamps_at_time_limits() {
        let latest = PrimitiveDateTime::MAX.assume_utc();
        let forward = active_window(latest);
        assert_eq!(forward.end, latest);
        assert!(forward.contains(latest));

        let earliest = PrimitiveDateTime::MIN.assume_utc();
        let trailing = WindowPolicy::Trailing.active_window(earliest);
        assert_eq!(trailing.start, earliest);
    }
}
