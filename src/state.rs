use std::collections::{HashMap, HashSet, VecDeque};

use crate::fixture::Fixture;
use crate::insight::{CancelToken, InsightBatch, InsightNote};
use crate::policy::DurationPolicy;

pub const SEASON_ROUNDS: u32 = 27;
const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundFilter {
    All,
    Round(u32),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub policy: DurationPolicy,
    pub fixtures: Vec<Fixture>,
    pub fixtures_loaded: bool,
    pub query: String,
    pub search_active: bool,
    pub round: RoundFilter,
    pub selected: usize,
    pub insights: HashMap<String, InsightNote>,
    pub insight_limit: usize,
    pub insight_generation: u64,
    pub insight_cancel: CancelToken,
    insight_dispatch: Option<InsightBatch>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DurationPolicy::default(), 10)
    }
}

impl AppState {
    pub fn new(policy: DurationPolicy, insight_limit: usize) -> Self {
        Self {
            policy,
            fixtures: Vec::with_capacity(256),
            fixtures_loaded: false,
            query: String::new(),
            search_active: false,
            round: RoundFilter::All,
            selected: 0,
            insights: HashMap::with_capacity(32),
            insight_limit,
            insight_generation: 0,
            insight_cancel: CancelToken::new(),
            insight_dispatch: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    /// Indices into `fixtures` passing the round and text filters, ordered by
    /// kickoff instant. Fixtures whose kickoff won't parse sort last.
    pub fn visible_indices(&self) -> Vec<usize> {
        let needle = self.query.trim();
        let mut keyed: Vec<(usize, Option<i64>)> = self
            .fixtures
            .iter()
            .enumerate()
            .filter(|(_, f)| self.matches_round(f))
            .filter(|(_, f)| needle.is_empty() || contains_ci(&f.search_haystack(), needle))
            .map(|(idx, f)| (idx, f.kickoff_at().ok().map(|k| k.timestamp_millis())))
            .collect();

        keyed.sort_by(|(ia, ka), (ib, kb)| {
            let by_time = match (ka, kb) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            by_time.then_with(|| self.fixtures[*ia].id.cmp(&self.fixtures[*ib].id))
        });
        keyed.into_iter().map(|(idx, _)| idx).collect()
    }

    pub fn visible_fixtures(&self) -> Vec<&Fixture> {
        self.visible_indices()
            .into_iter()
            .filter_map(|idx| self.fixtures.get(idx))
            .collect()
    }

    pub fn visible_ids(&self) -> HashSet<String> {
        self.visible_fixtures()
            .into_iter()
            .map(|f| f.id.clone())
            .collect()
    }

    pub fn selected_fixture(&self) -> Option<&Fixture> {
        self.visible_fixtures().get(self.selected).copied()
    }

    fn matches_round(&self, fixture: &Fixture) -> bool {
        match self.round {
            RoundFilter::All => true,
            RoundFilter::Round(n) => fixture.round == n,
        }
    }

    pub fn select_next(&mut self) {
        let total = self.visible_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(total - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        let total = self.visible_indices().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn cycle_round_next(&mut self) {
        self.round = match self.round {
            RoundFilter::All => RoundFilter::Round(1),
            RoundFilter::Round(n) if n >= SEASON_ROUNDS => RoundFilter::All,
            RoundFilter::Round(n) => RoundFilter::Round(n + 1),
        };
        self.on_filters_changed();
    }

    pub fn cycle_round_prev(&mut self) {
        self.round = match self.round {
            RoundFilter::All => RoundFilter::Round(SEASON_ROUNDS),
            RoundFilter::Round(n) if n <= 1 => RoundFilter::All,
            RoundFilter::Round(n) => RoundFilter::Round(n - 1),
        };
        self.on_filters_changed();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.on_filters_changed();
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
        self.on_filters_changed();
    }

    pub fn pop_query_char(&mut self) {
        if self.query.pop().is_some() {
            self.on_filters_changed();
        }
    }

    pub fn clear_filters(&mut self) {
        self.query.clear();
        self.round = RoundFilter::All;
        self.on_filters_changed();
    }

    fn on_filters_changed(&mut self) {
        self.selected = 0;
        self.refresh_insights();
    }

    /// Stop the running insight batch and forget any batch not yet dispatched.
    pub fn cancel_insights(&mut self) {
        self.insight_generation = self.insight_cancel.advance();
        self.insight_dispatch = None;
    }

    /// Cancel whatever enrichment is in flight and queue a batch for the first
    /// `insight_limit` visible fixtures that have no note yet.
    pub fn refresh_insights(&mut self) {
        self.cancel_insights();
        let fixtures: Vec<Fixture> = self
            .visible_fixtures()
            .into_iter()
            .take(self.insight_limit)
            .filter(|f| !self.insights.contains_key(&f.id))
            .cloned()
            .collect();
        self.insight_dispatch = if fixtures.is_empty() {
            None
        } else {
            Some(InsightBatch {
                generation: self.insight_generation,
                fixtures,
            })
        };
    }

    pub fn take_insight_batch(&mut self) -> Option<InsightBatch> {
        self.insight_dispatch.take()
    }

    pub fn insight_text(&self, id: &str) -> Option<&str> {
        self.insights.get(id).map(InsightNote::text)
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetFixtures(Vec<Fixture>),
    Insight {
        generation: u64,
        id: String,
        note: InsightNote,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    ReloadFixtures,
    FetchInsights(InsightBatch),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetFixtures(fixtures) => {
            let mut seen: HashSet<String> = HashSet::with_capacity(fixtures.len());
            let mut kept = Vec::with_capacity(fixtures.len());
            for fixture in fixtures {
                if !seen.insert(fixture.id.clone()) {
                    state.push_log(format!("[WARN] Duplicate fixture id {} skipped", fixture.id));
                    continue;
                }
                if let Err(err) = fixture.kickoff_at() {
                    state.push_log(format!("[WARN] {}: {err}", fixture.id));
                }
                kept.push(fixture);
            }

            let count = kept.len();
            state.fixtures = kept;
            state.fixtures_loaded = true;
            state.insights.retain(|id, _| seen.contains(id));
            state.clamp_selection();
            state.push_log(format!("[INFO] Loaded {count} fixtures"));
            state.refresh_insights();
        }
        Delta::Insight {
            generation,
            id,
            note,
        } => {
            if generation != state.insight_generation || !state.visible_ids().contains(&id) {
                state.push_log(format!("[INFO] Dropped stale insight for {id}"));
                return;
            }
            state.insights.insert(id, note);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn round_label(round: RoundFilter) -> String {
    match round {
        RoundFilter::All => "All Rounds".to_string(),
        RoundFilter::Round(n) => format!("Round {n}"),
    }
}

/// Case-insensitive substring match (Unicode-aware, allocates).
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_cycle_wraps_through_all() {
        let mut state = AppState::default();
        state.cycle_round_prev();
        assert_eq!(state.round, RoundFilter::Round(SEASON_ROUNDS));
        state.cycle_round_next();
        assert_eq!(state.round, RoundFilter::All);
        state.cycle_round_next();
        assert_eq!(state.round, RoundFilter::Round(1));
        state.cycle_round_prev();
        assert_eq!(state.round, RoundFilter::All);
    }

    #[test]
    fn log_is_bounded() {
        let mut state = AppState::default();
        for i in 0..(MAX_LOGS + 5) {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert_eq!(state.logs.front().map(String::as_str), Some("line 5"));
    }

    #[test]
    fn case_insensitive_search() {
        assert!(contains_ci("Broncos Cowboys Suncorp Stadium", "suncorp"));
        assert!(!contains_ci("Broncos Cowboys", "storm"));
    }
}
