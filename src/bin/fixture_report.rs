use std::path::Path;

use anyhow::{Context, Result};

use nrl25_terminal::config::AppConfig;
use nrl25_terminal::feed::FixtureSource;
use nrl25_terminal::state::{AppState, Delta, apply_delta};
use nrl25_terminal::tick::wall_clock;
use nrl25_terminal::timing::{display_zone, parse_kickoff};
use nrl25_terminal::tips::{load_tips, summarize, summary_lines};
use nrl25_terminal::view::build_rows;

fn main() -> Result<()> {
    if let Some(path) = arg_value("--tips") {
        let tips = load_tips(Path::new(&path))?;
        println!("Prediction log {path}");
        for line in summary_lines(&summarize(&tips)) {
            println!("  {line}");
        }
        return Ok(());
    }

    let mut cfg = AppConfig::load().context("configuration")?;
    if let Some(path) = arg_value("--path") {
        cfg.fixtures_path = Some(path.into());
    }

    let now = match arg_value("--at") {
        Some(raw) => parse_kickoff(&raw)
            .with_context(|| format!("--at {raw}"))?
            .with_timezone(&display_zone()),
        None => wall_clock(),
    };

    let source = FixtureSource::from_path(cfg.fixtures_path.clone());
    let fixtures = source
        .load()
        .with_context(|| format!("load fixtures from {}", source.describe()))?;

    let mut state = AppState::new(cfg.policy, 0);
    apply_delta(&mut state, Delta::SetFixtures(fixtures));

    println!(
        "Fixtures at {} | window {}m | {}",
        now.to_rfc3339(),
        cfg.policy.total_minutes(),
        source.describe()
    );
    for row in build_rows(&state, now) {
        println!(
            "{:<8} {:<15} {:>3}%  {:<28} {}",
            row.id, row.label, row.progress, row.title, row.right
        );
        println!("         {}", row.meta);
    }

    for line in state.logs.iter().filter(|l| l.starts_with("[WARN]")) {
        eprintln!("{line}");
    }
    Ok(())
}

fn arg_value(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
