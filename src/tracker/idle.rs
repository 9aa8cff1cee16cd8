use chrono::Duration;

/// Decides whether the user has gone idle. Time only accrues while the last
/// qualifying input event is strictly inside the threshold window; there is
/// no hysteresis beyond the window itself.
pub struct IdleDetector {
    threshold: Duration,
}

impl IdleDetector {
    pub fn from_secs(threshold_s: i64) -> Self {
        Self {
            threshold: Duration::seconds(threshold_s),
        }
    }

    pub fn is_idle(&self, since_last_activity: Duration) -> bool {
        since_last_activity >= self.threshold
    }
}
