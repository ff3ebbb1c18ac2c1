use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::policy::{
    DEFAULT_BASE_MINUTES, DEFAULT_HALFTIME_MINUTES, DEFAULT_PADDING_MINUTES, DurationPolicy,
};

pub const DEFAULT_REFRESH_SECS: u64 = 30;
pub const DEFAULT_INSIGHT_LIMIT: usize = 10;
const MIN_REFRESH_SECS: u64 = 5;
const MAX_INSIGHT_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub policy: DurationPolicy,
    pub refresh: Duration,
    pub insight_limit: usize,
    pub insight_endpoint: Option<String>,
    pub fixtures_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            policy: DurationPolicy::default(),
            refresh: Duration::from_secs(DEFAULT_REFRESH_SECS),
            insight_limit: DEFAULT_INSIGHT_LIMIT,
            insight_endpoint: None,
            fixtures_path: None,
        }
    }
}

impl AppConfig {
    /// Loads `.env.local` then `.env` (first one wins per key), then reads the process env.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let policy = policy_from_lookup(&get)?;

        let refresh_secs = get("REFRESH_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_REFRESH_SECS)
            .max(MIN_REFRESH_SECS);
        let insight_limit = get("INSIGHT_LIMIT")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_INSIGHT_LIMIT)
            .min(MAX_INSIGHT_LIMIT);
        let insight_endpoint = get("INSIGHT_ENDPOINT")
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty());
        let fixtures_path = get("FIXTURES_PATH")
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            policy,
            refresh: Duration::from_secs(refresh_secs),
            insight_limit,
            insight_endpoint,
            fixtures_path,
        })
    }
}

fn policy_from_lookup(get: &impl Fn(&str) -> Option<String>) -> Result<DurationPolicy> {
    if let Some(total) = minutes_var(get, "MATCH_TOTAL_MINUTES")? {
        return DurationPolicy::from_total_minutes(total).context("MATCH_TOTAL_MINUTES");
    }
    let base = minutes_var(get, "MATCH_BASE_MINUTES")?.unwrap_or(DEFAULT_BASE_MINUTES);
    let halftime =
        minutes_var(get, "MATCH_HALFTIME_MINUTES")?.unwrap_or(DEFAULT_HALFTIME_MINUTES);
    let padding = minutes_var(get, "MATCH_PADDING_MINUTES")?.unwrap_or(DEFAULT_PADDING_MINUTES);
    DurationPolicy::from_components(base, halftime, padding).context("match duration policy")
}

fn minutes_var(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<i64>> {
    let Some(raw) = get(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| anyhow!("{key} must be a whole number of minutes, got {trimmed:?}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::StatusError;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.policy, DurationPolicy::default());
        assert_eq!(cfg.refresh, Duration::from_secs(30));
        assert_eq!(cfg.insight_limit, 10);
        assert!(cfg.insight_endpoint.is_none());
        assert!(cfg.fixtures_path.is_none());
    }

    #[test]
    fn total_overrides_components() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("MATCH_TOTAL_MINUTES", "100"),
            ("MATCH_BASE_MINUTES", "70"),
        ]))
        .unwrap();
        assert_eq!(cfg.policy.total_minutes(), 100);
    }

    #[test]
    fn components_fill_from_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[("MATCH_PADDING_MINUTES", "30")])).unwrap();
        assert_eq!(cfg.policy.total_minutes(), 120);
    }

    #[test]
    fn bad_policy_is_rejected_at_load() {
        let err = AppConfig::from_lookup(lookup(&[("MATCH_TOTAL_MINUTES", "0")])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StatusError>(),
            Some(&StatusError::InvalidDurationPolicy { total_minutes: 0 })
        );
        assert!(AppConfig::from_lookup(lookup(&[("MATCH_BASE_MINUTES", "eighty")])).is_err());
    }

    #[test]
    fn oversized_window_is_rejected_at_load() {
        let err = AppConfig::from_lookup(lookup(&[("MATCH_TOTAL_MINUTES", "100000000000000")]))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StatusError>(),
            Some(&StatusError::InvalidDurationPolicy {
                total_minutes: 100_000_000_000_000
            })
        );
        let err =
            AppConfig::from_lookup(lookup(&[("MATCH_PADDING_MINUTES", "10080")])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StatusError>(),
            Some(&StatusError::InvalidDurationPolicy {
                total_minutes: 10_170
            })
        );
    }

    #[test]
    fn clamps_refresh_and_limit() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("REFRESH_SECS", "1"),
            ("INSIGHT_LIMIT", "500"),
            ("INSIGHT_ENDPOINT", "  "),
        ]))
        .unwrap();
        assert_eq!(cfg.refresh, Duration::from_secs(5));
        assert_eq!(cfg.insight_limit, 50);
        assert!(cfg.insight_endpoint.is_none());
    }
}
