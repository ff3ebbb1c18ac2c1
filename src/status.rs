use chrono::{DateTime, FixedOffset};

use crate::error::StatusError;
use crate::fixture::Fixture;
use crate::interval::diff_human;
use crate::policy::DurationPolicy;
use crate::timing::estimate_finish;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchState {
    Upcoming,
    Live,
    AwaitingFinal,
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusDetail {
    /// Time until kickoff, e.g. `"45m from now"`.
    Countdown(String),
    EstimatedFinish(DateTime<FixedOffset>),
}

/// Derived view of a fixture at one instant. Never stored; recompute it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchStatus {
    pub state: MatchState,
    /// Percentage of the estimated window elapsed, always within 0..=100.
    pub progress: u8,
    pub detail: Option<StatusDetail>,
}

impl MatchStatus {
    pub fn countdown(&self) -> Option<&str> {
        match &self.detail {
            Some(StatusDetail::Countdown(text)) => Some(text),
            _ => None,
        }
    }

    pub fn estimated_finish(&self) -> Option<DateTime<FixedOffset>> {
        match &self.detail {
            Some(StatusDetail::EstimatedFinish(end)) => Some(*end),
            _ => None,
        }
    }
}

pub fn compute_status(
    policy: &DurationPolicy,
    kickoff: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
    is_final: bool,
) -> Result<MatchStatus, StatusError> {
    let end = estimate_finish(policy, kickoff)?;

    // Checked first so `now == end` lands here rather than Live at 100%.
    if is_final || now >= end {
        let state = if is_final {
            MatchState::Final
        } else {
            MatchState::AwaitingFinal
        };
        return Ok(MatchStatus {
            state,
            progress: 100,
            detail: None,
        });
    }

    if now < kickoff {
        return Ok(MatchStatus {
            state: MatchState::Upcoming,
            progress: 0,
            detail: Some(StatusDetail::Countdown(diff_human(kickoff, now))),
        });
    }

    Ok(MatchStatus {
        state: MatchState::Live,
        progress: live_progress(kickoff, end, now),
        detail: Some(StatusDetail::EstimatedFinish(end)),
    })
}

fn live_progress(
    kickoff: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
) -> u8 {
    let total = (end - kickoff).num_milliseconds();
    if total <= 0 {
        return 100;
    }
    let elapsed = (now - kickoff).num_milliseconds().clamp(0, total);
    let pct = (elapsed as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

pub fn evaluate_fixture(
    policy: &DurationPolicy,
    fixture: &Fixture,
    now: DateTime<FixedOffset>,
) -> Result<MatchStatus, StatusError> {
    let kickoff = fixture.kickoff_at()?;
    compute_status(policy, kickoff, now, fixture.has_final())
}

/// One result per fixture, in input order. A bad kickoff only fails its own slot.
pub fn evaluate_all(
    policy: &DurationPolicy,
    fixtures: &[Fixture],
    now: DateTime<FixedOffset>,
) -> Vec<Result<MatchStatus, StatusError>> {
    fixtures
        .iter()
        .map(|f| evaluate_fixture(policy, f, now))
        .collect()
}

pub fn status_label(state: MatchState) -> &'static str {
    match state {
        MatchState::Upcoming => "Upcoming",
        MatchState::Live => "Live",
        MatchState::AwaitingFinal => "Awaiting final",
        MatchState::Final => "Final",
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::timing::parse_kickoff;

    fn ko() -> DateTime<FixedOffset> {
        parse_kickoff("2025-03-06T19:50:00+10:00").unwrap()
    }

    fn at(minutes: i64) -> DateTime<FixedOffset> {
        ko() + Duration::minutes(minutes)
    }

    #[test]
    fn kickoff_instant_is_live_at_zero() {
        let s = compute_status(&DurationPolicy::default(), ko(), ko(), false).unwrap();
        assert_eq!(s.state, MatchState::Live);
        assert_eq!(s.progress, 0);
        assert_eq!(s.estimated_finish(), Some(at(110)));
    }

    #[test]
    fn estimated_end_boundary_is_elapsed() {
        let policy = DurationPolicy::default();
        let s = compute_status(&policy, ko(), at(110), false).unwrap();
        assert_eq!(s.state, MatchState::AwaitingFinal);
        assert_eq!(s.progress, 100);
        assert_eq!(s.detail, None);

        let just_before = at(110) - Duration::milliseconds(1);
        let s = compute_status(&policy, ko(), just_before, false).unwrap();
        assert_eq!(s.state, MatchState::Live);
        assert_eq!(s.progress, 100);
    }

    #[test]
    fn progress_rounds_to_nearest() {
        let policy = DurationPolicy::from_total_minutes(3).unwrap();
        // 1 of 3 minutes = 33.3%, 2 of 3 = 66.7%.
        assert_eq!(compute_status(&policy, ko(), at(1), false).unwrap().progress, 33);
        assert_eq!(compute_status(&policy, ko(), at(2), false).unwrap().progress, 67);
    }

    #[test]
    fn final_wins_before_kickoff() {
        let s = compute_status(&DurationPolicy::default(), ko(), at(-30), true).unwrap();
        assert_eq!(s.state, MatchState::Final);
        assert_eq!(s.progress, 100);
    }

    #[test]
    fn upcoming_carries_countdown() {
        let s = compute_status(&DurationPolicy::default(), ko(), at(-125), false).unwrap();
        assert_eq!(s.state, MatchState::Upcoming);
        assert_eq!(s.countdown(), Some("2h 5m from now"));
        assert_eq!(s.estimated_finish(), None);
    }

    #[test]
    fn evaluate_all_isolates_bad_kickoffs() {
        let fixture = |id: &str, kickoff: &str| {
            Fixture::new(id, 1, kickoff, "Suncorp Stadium", "Broncos", "Cowboys")
        };
        let fixtures = [
            fixture("R01-001", "2025-03-06T19:50:00+10:00"),
            fixture("R01-002", "2025-03-06T19:50:00"),
            fixture("R01-003", "2025-03-06T09:50:00Z"),
        ];
        let results = evaluate_all(&DurationPolicy::default(), &fixtures, at(55));
        assert_eq!(results.len(), 3);
        for idx in [0, 2] {
            let status = results[idx].as_ref().unwrap();
            assert_eq!(status.state, MatchState::Live);
            assert_eq!(status.progress, 50);
        }
        assert_eq!(
            results[1],
            Err(StatusError::InvalidTimestamp {
                raw: "2025-03-06T19:50:00".to_string()
            })
        );
    }

    #[test]
    fn labels() {
        assert_eq!(status_label(MatchState::AwaitingFinal), "Awaiting final");
        assert_eq!(status_label(MatchState::Final), "Final");
    }
}
