use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::fixture::Fixture;

pub const STUB_INSIGHT: &str = "Insight pending: connect LeagueLogic engine endpoint.";
pub const INSIGHT_LOADING: &str = "Loading model note…";
pub const INSIGHT_UNAVAILABLE: &str = "Model note unavailable";

const INSIGHT_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Source of one-line advisory notes for a fixture.
///
/// Implementations may fail freely; the worker turns any error into
/// [`InsightNote::Unavailable`] before it reaches the board.
pub trait InsightProvider: Send {
    fn insight(&self, fixture: &Fixture) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightNote {
    Ready(String),
    Unavailable,
}

impl InsightNote {
    pub fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(text) if !text.trim().is_empty() => Self::Ready(text.trim().to_string()),
            _ => Self::Unavailable,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Ready(text) => text,
            Self::Unavailable => INSIGHT_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StubInsightProvider;

impl InsightProvider for StubInsightProvider {
    fn insight(&self, _fixture: &Fixture) -> Result<String> {
        Ok(STUB_INSIGHT.to_string())
    }
}

/// Fetches `{endpoint}?fixture={id}` and uses the body as the note.
#[derive(Debug, Clone)]
pub struct HttpInsightProvider {
    endpoint: String,
}

impl HttpInsightProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl InsightProvider for HttpInsightProvider {
    fn insight(&self, fixture: &Fixture) -> Result<String> {
        let client = insight_client()?;
        let resp = client
            .get(&self.endpoint)
            .query(&[("fixture", fixture.id.as_str())])
            .send()
            .context("insight request failed")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("insight endpoint returned {status}"));
        }
        let body = resp.text().context("insight body unreadable")?;
        // One line only.
        Ok(body.lines().next().unwrap_or_default().trim().to_string())
    }
}

fn insight_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(INSIGHT_TIMEOUT_SECS))
            .build()
            .context("failed to build insight http client")
    })
}

pub fn provider_from_endpoint(endpoint: Option<&str>) -> Box<dyn InsightProvider> {
    match endpoint.map(str::trim).filter(|e| !e.is_empty()) {
        Some(endpoint) => Box::new(HttpInsightProvider::new(endpoint)),
        None => Box::new(StubInsightProvider),
    }
}

/// Shared generation counter. Bumping it invalidates every batch dispatched
/// under an older generation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    generation: Arc<AtomicU64>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

/// Fixtures to enrich, tagged with the generation that requested them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightBatch {
    pub generation: u64,
    pub fixtures: Vec<Fixture>,
}

/// Run one batch, stopping as soon as `cancel` moves past its generation.
/// Returns how many fixtures were processed.
pub fn run_batch(
    provider: &dyn InsightProvider,
    cancel: &CancelToken,
    batch: InsightBatch,
    mut emit: impl FnMut(String, InsightNote),
) -> usize {
    let mut done = 0;
    for fixture in batch.fixtures {
        if !cancel.is_current(batch.generation) {
            break;
        }
        let note = InsightNote::from_result(provider.insight(&fixture));
        emit(fixture.id, note);
        done += 1;
    }
    done
}
