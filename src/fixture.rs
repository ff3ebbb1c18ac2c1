use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::StatusError;
use crate::timing::parse_kickoff;

/// One scheduled fixture as handed over by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub id: String,
    pub round: u32,
    /// RFC 3339 with offset, e.g. `2025-03-06T19:50:00+10:00`.
    #[serde(rename = "kickoffAEST", alias = "kickoff")]
    pub kickoff: String,
    pub venue: String,
    pub home: String,
    pub away: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_score: Option<u32>,
    #[serde(default, rename = "final", skip_serializing_if = "Option::is_none")]
    pub is_final: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_id: Option<String>,
}

impl Fixture {
    pub fn new(
        id: impl Into<String>,
        round: u32,
        kickoff: impl Into<String>,
        venue: impl Into<String>,
        home: impl Into<String>,
        away: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            round,
            kickoff: kickoff.into(),
            venue: venue.into(),
            home: home.into(),
            away: away.into(),
            home_score: None,
            away_score: None,
            is_final: None,
            hash_id: None,
        }
    }

    /// Official result recorded: the flag alone, or scores alone, don't count.
    pub fn has_final(&self) -> bool {
        self.is_final == Some(true) && self.home_score.is_some() && self.away_score.is_some()
    }

    pub fn final_score(&self) -> Option<(u32, u32)> {
        if !self.has_final() {
            return None;
        }
        Some((self.home_score?, self.away_score?))
    }

    pub fn kickoff_at(&self) -> Result<DateTime<FixedOffset>, StatusError> {
        parse_kickoff(&self.kickoff)
    }

    pub fn search_haystack(&self) -> String {
        format!("{} {} {}", self.home, self.away, self.venue)
    }
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<Fixture>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context("invalid fixtures json")
}

pub fn load_fixtures(path: &Path) -> Result<Vec<Fixture>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read fixtures from {}", path.display()))?;
    parse_fixtures_json(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Fixture {
        Fixture::new(
            "R01-001",
            1,
            "2025-03-06T19:50:00+10:00",
            "Suncorp Stadium",
            "Broncos",
            "Cowboys",
        )
    }

    #[test]
    fn final_requires_flag_and_both_scores() {
        let mut f = base();
        assert!(!f.has_final());

        f.is_final = Some(true);
        assert!(!f.has_final());

        f.home_score = Some(24);
        assert!(!f.has_final());

        f.away_score = Some(18);
        assert!(f.has_final());
        assert_eq!(f.final_score(), Some((24, 18)));

        f.is_final = Some(false);
        assert!(!f.has_final());
        assert_eq!(f.final_score(), None);
    }

    #[test]
    fn parses_feed_shape() {
        let raw = r#"[
            {"id":"R01-001","round":1,"kickoffAEST":"2025-03-06T19:50:00+10:00",
             "venue":"Suncorp Stadium","home":"Broncos","away":"Cowboys",
             "homeScore":24,"awayScore":18,"final":true,"hashId":"a1b2c3"},
            {"id":"R01-002","round":1,"kickoff":"2025-03-07T18:00:00+10:00",
             "venue":"Accor Stadium","home":"Rabbitohs","away":"Roosters"}
        ]"#;
        let fixtures = parse_fixtures_json(raw).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert!(fixtures[0].has_final());
        assert_eq!(fixtures[0].hash_id.as_deref(), Some("a1b2c3"));
        assert_eq!(fixtures[1].kickoff, "2025-03-07T18:00:00+10:00");
        assert!(!fixtures[1].has_final());
    }

    #[test]
    fn null_or_empty_is_no_fixtures() {
        assert!(parse_fixtures_json("null").unwrap().is_empty());
        assert!(parse_fixtures_json("  ").unwrap().is_empty());
    }

    #[test]
    fn rejects_negative_scores() {
        let raw = r#"[{"id":"x","round":1,"kickoffAEST":"2025-03-06T19:50:00+10:00",
            "venue":"v","home":"h","away":"a","homeScore":-1}]"#;
        assert!(parse_fixtures_json(raw).is_err());
    }
}
