use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use anyhow::Result;

use crate::demo_feed::demo_season;
use crate::fixture::{Fixture, load_fixtures};
use crate::insight::{CancelToken, InsightProvider, run_batch};
use crate::state::{Delta, ProviderCommand};
use crate::tick::wall_clock;

/// Where fixtures come from. The board never cares which.
#[derive(Debug, Clone)]
pub enum FixtureSource {
    File(PathBuf),
    Demo,
}

impl FixtureSource {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::File(path),
            None => Self::Demo,
        }
    }

    pub fn load(&self) -> Result<Vec<Fixture>> {
        match self {
            Self::File(path) => load_fixtures(path),
            Self::Demo => Ok(demo_season(wall_clock(), &mut rand::thread_rng())),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Demo => "demo season".to_string(),
        }
    }
}

/// Provider thread: loads fixtures on start and on request, and works
/// through insight batches until the command channel closes.
pub fn spawn_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    source: FixtureSource,
    insights: Box<dyn InsightProvider>,
    cancel: CancelToken,
) -> JoinHandle<()> {
    thread::spawn(move || {
        send_fixtures(&tx, &source);

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::ReloadFixtures => send_fixtures(&tx, &source),
                ProviderCommand::FetchInsights(batch) => {
                    let generation = batch.generation;
                    let requested = batch.fixtures.len();
                    let done = run_batch(insights.as_ref(), &cancel, batch, |id, note| {
                        let _ = tx.send(Delta::Insight {
                            generation,
                            id,
                            note,
                        });
                    });
                    // A batch that went stale before its first call says nothing useful.
                    if done > 0 && done < requested {
                        let _ = tx.send(Delta::Log(format!(
                            "[INFO] Insight batch {generation} cancelled after {done}/{requested}"
                        )));
                    }
                }
            }
        }
    })
}

fn send_fixtures(tx: &Sender<Delta>, source: &FixtureSource) {
    match source.load() {
        Ok(fixtures) => {
            let _ = tx.send(Delta::SetFixtures(fixtures));
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!(
                "[WARN] Fixture load from {} failed: {err:#}",
                source.describe()
            )));
        }
    }
}
