use chrono::{DateTime, FixedOffset};

use crate::fixture::Fixture;
use crate::insight::INSIGHT_LOADING;
use crate::interval::diff_human;
use crate::policy::DurationPolicy;
use crate::state::AppState;
use crate::status::{MatchState, evaluate_fixture, status_label};
use crate::timing::{DISPLAY_ZONE_LABEL, estimate_finish, fmt_date, fmt_time};

pub const STATUS_UNAVAILABLE: &str = "Status unavailable";

/// Everything the list needs to draw one fixture, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureRow {
    pub id: String,
    pub state: Option<MatchState>,
    pub label: String,
    pub progress: u8,
    pub title: String,
    pub meta: String,
    pub right: String,
    pub insight: String,
}

pub fn build_rows(state: &AppState, now: DateTime<FixedOffset>) -> Vec<FixtureRow> {
    state
        .visible_fixtures()
        .into_iter()
        .map(|f| {
            let mut row = fixture_row(&state.policy, f, now);
            row.insight = state
                .insight_text(&f.id)
                .unwrap_or(INSIGHT_LOADING)
                .to_string();
            row
        })
        .collect()
}

pub fn fixture_row(policy: &DurationPolicy, f: &Fixture, now: DateTime<FixedOffset>) -> FixtureRow {
    let title = format!("{} vs {}", f.home, f.away);
    let (kickoff, status) = match (f.kickoff_at(), evaluate_fixture(policy, f, now)) {
        (Ok(kickoff), Ok(status)) => (kickoff, status),
        (_, Err(err)) | (Err(err), _) => {
            return FixtureRow {
                id: f.id.clone(),
                state: None,
                label: STATUS_UNAVAILABLE.to_string(),
                progress: 0,
                title,
                meta: format!("{} | {err}", f.venue),
                right: "-".to_string(),
                insight: INSIGHT_LOADING.to_string(),
            };
        }
    };

    let mut meta = format!(
        "{} {} {DISPLAY_ZONE_LABEL} | {}",
        fmt_date(&kickoff),
        fmt_time(&kickoff),
        f.venue
    );
    if let Ok(end) = estimate_finish(policy, kickoff) {
        meta.push_str(&format!(" | Est. finish {}", fmt_time(&end)));
    }
    if let Some(hash) = f.hash_id.as_deref() {
        meta.push_str(&format!(" | #{hash}"));
    }

    let right = if let Some((home, away)) = f.final_score() {
        format!("{home}-{away}")
    } else {
        match status.state {
            MatchState::Upcoming => format!("KO {}", status.countdown().unwrap_or_default()),
            MatchState::Live => match status.estimated_finish() {
                Some(end) => format!("Est. {}", diff_human(end, now)),
                None => "Live".to_string(),
            },
            _ => "Final pending".to_string(),
        }
    };

    FixtureRow {
        id: f.id.clone(),
        state: Some(status.state),
        label: status_label(status.state).to_string(),
        progress: status.progress,
        title,
        meta,
        right,
        insight: INSIGHT_LOADING.to_string(),
    }
}
