use chrono::Duration;

use crate::error::StatusError;

pub const DEFAULT_BASE_MINUTES: i64 = 80;
pub const DEFAULT_HALFTIME_MINUTES: i64 = 10;
// Stoppages, reviews, set rests, presentations.
pub const DEFAULT_PADDING_MINUTES: i64 = 20;
/// Upper bound on the whole window. Nothing longer than a week is a match.
pub const MAX_TOTAL_MINUTES: i64 = 7 * 24 * 60;

/// Match window used to estimate when a fixture should be over.
///
/// Built once (usually from the environment) and passed by value into the
/// estimator and classifier. The total always lies in `1..=MAX_TOTAL_MINUTES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPolicy {
    base_minutes: i64,
    halftime_minutes: i64,
    padding_minutes: i64,
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            base_minutes: DEFAULT_BASE_MINUTES,
            halftime_minutes: DEFAULT_HALFTIME_MINUTES,
            padding_minutes: DEFAULT_PADDING_MINUTES,
        }
    }
}

impl DurationPolicy {
    pub fn from_components(
        base_minutes: i64,
        halftime_minutes: i64,
        padding_minutes: i64,
    ) -> Result<Self, StatusError> {
        let total = base_minutes
            .checked_add(halftime_minutes)
            .and_then(|t| t.checked_add(padding_minutes));
        match total {
            Some(total) if (1..=MAX_TOTAL_MINUTES).contains(&total) => Ok(Self {
                base_minutes,
                halftime_minutes,
                padding_minutes,
            }),
            Some(total) => Err(StatusError::InvalidDurationPolicy {
                total_minutes: total,
            }),
            None => Err(StatusError::InvalidDurationPolicy {
                total_minutes: base_minutes
                    .saturating_add(halftime_minutes)
                    .saturating_add(padding_minutes),
            }),
        }
    }

    /// Single-knob override: the whole window counts as play time.
    pub fn from_total_minutes(total_minutes: i64) -> Result<Self, StatusError> {
        Self::from_components(total_minutes, 0, 0)
    }

    pub fn base_minutes(&self) -> i64 {
        self.base_minutes
    }

    pub fn halftime_minutes(&self) -> i64 {
        self.halftime_minutes
    }

    pub fn padding_minutes(&self) -> i64 {
        self.padding_minutes
    }

    pub fn total_minutes(&self) -> i64 {
        self.base_minutes + self.halftime_minutes + self.padding_minutes
    }

    pub fn total(&self) -> Duration {
        Duration::minutes(self.total_minutes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_110_minutes() {
        let policy = DurationPolicy::default();
        assert_eq!(policy.total_minutes(), 110);
        assert_eq!(policy.total(), Duration::minutes(110));
    }

    #[test]
    fn total_override_keeps_single_component() {
        let policy = DurationPolicy::from_total_minutes(100).unwrap();
        assert_eq!(policy.base_minutes(), 100);
        assert_eq!(policy.halftime_minutes(), 0);
        assert_eq!(policy.padding_minutes(), 0);
    }

    #[test]
    fn rejects_non_positive_totals() {
        assert_eq!(
            DurationPolicy::from_total_minutes(0),
            Err(StatusError::InvalidDurationPolicy { total_minutes: 0 })
        );
        assert_eq!(
            DurationPolicy::from_components(40, -10, -40),
            Err(StatusError::InvalidDurationPolicy { total_minutes: -10 })
        );
    }

    #[test]
    fn rejects_windows_past_the_ceiling() {
        assert!(DurationPolicy::from_total_minutes(MAX_TOTAL_MINUTES).is_ok());
        assert_eq!(
            DurationPolicy::from_total_minutes(MAX_TOTAL_MINUTES + 1),
            Err(StatusError::InvalidDurationPolicy {
                total_minutes: MAX_TOTAL_MINUTES + 1
            })
        );
        assert_eq!(
            DurationPolicy::from_total_minutes(100_000_000_000_000),
            Err(StatusError::InvalidDurationPolicy {
                total_minutes: 100_000_000_000_000
            })
        );
    }

    #[test]
    fn overflowing_components_report_saturated_total() {
        assert_eq!(
            DurationPolicy::from_components(i64::MAX, 10, 20),
            Err(StatusError::InvalidDurationPolicy {
                total_minutes: i64::MAX
            })
        );
        assert_eq!(
            DurationPolicy::from_components(i64::MIN, -10, 0),
            Err(StatusError::InvalidDurationPolicy {
                total_minutes: i64::MIN
            })
        );
    }

    #[test]
    fn negative_component_allowed_when_sum_positive() {
        let policy = DurationPolicy::from_components(80, 10, -5).unwrap();
        assert_eq!(policy.total_minutes(), 85);
    }
}
