use chrono::{DateTime, FixedOffset, Offset, Utc};
use once_cell::sync::Lazy;

use crate::error::StatusError;
use crate::policy::DurationPolicy;

/// Display zone label. Brisbane has no daylight saving, so a fixed +10:00 is exact.
pub const DISPLAY_ZONE_LABEL: &str = "AEST";
const DISPLAY_ZONE_OFFSET_SECS: i32 = 10 * 3600;

static DISPLAY_ZONE: Lazy<FixedOffset> = Lazy::new(|| {
    FixedOffset::east_opt(DISPLAY_ZONE_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
});

pub fn display_zone() -> FixedOffset {
    *DISPLAY_ZONE
}

/// Parse a kickoff instant. Only RFC 3339 with an explicit offset is accepted;
/// a bare local time is ambiguous and rejected.
pub fn parse_kickoff(raw: &str) -> Result<DateTime<FixedOffset>, StatusError> {
    DateTime::parse_from_rfc3339(raw.trim()).map_err(|_| StatusError::timestamp(raw))
}

pub fn estimate_finish(
    policy: &DurationPolicy,
    kickoff: DateTime<FixedOffset>,
) -> Result<DateTime<FixedOffset>, StatusError> {
    kickoff
        .checked_add_signed(policy.total())
        .ok_or_else(|| StatusError::timestamp(kickoff.to_rfc3339()))
}

pub fn estimate_finish_str(
    policy: &DurationPolicy,
    kickoff: &str,
) -> Result<DateTime<FixedOffset>, StatusError> {
    estimate_finish(policy, parse_kickoff(kickoff)?)
}

pub fn fmt_time<Tz: chrono::TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.with_timezone(&display_zone()).format("%H:%M").to_string()
}

pub fn fmt_date<Tz: chrono::TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.with_timezone(&display_zone())
        .format("%a %d %b %Y")
        .to_string()
}
