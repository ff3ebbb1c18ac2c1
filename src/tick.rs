use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset, Utc};

use crate::timing::display_zone;

/// Decides when the caller should re-read the wall clock and re-evaluate.
/// Fires on the first check, then once per interval.
#[derive(Debug, Clone)]
pub struct RefreshTicker {
    interval: Duration,
    last: Option<Instant>,
}

impl RefreshTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn due(&mut self, at: Instant) -> bool {
        let fire = match self.last {
            None => true,
            Some(last) => at.saturating_duration_since(last) >= self.interval,
        };
        if fire {
            self.last = Some(at);
        }
        fire
    }

    /// Make the next `due` fire regardless of the interval.
    pub fn force(&mut self) {
        self.last = None;
    }
}

pub fn wall_clock() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&display_zone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_first_then_per_interval() {
        let mut ticker = RefreshTicker::new(Duration::from_secs(30));
        let t0 = Instant::now();
        assert!(ticker.due(t0));
        assert!(!ticker.due(t0 + Duration::from_secs(29)));
        assert!(ticker.due(t0 + Duration::from_secs(30)));
        assert!(!ticker.due(t0 + Duration::from_secs(31)));
    }

    #[test]
    fn force_fires_immediately() {
        let mut ticker = RefreshTicker::new(Duration::from_secs(30));
        let t0 = Instant::now();
        assert!(ticker.due(t0));
        ticker.force();
        assert!(ticker.due(t0 + Duration::from_secs(1)));
    }
}
