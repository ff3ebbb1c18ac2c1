use chrono::{DateTime, FixedOffset};

use crate::error::StatusError;
use crate::timing::parse_kickoff;

const SUFFIX_AHEAD: &str = "from now";
const SUFFIX_BEHIND: &str = "ago";

/// Render `a - b` as `"1h 5m from now"` / `"45m ago"`.
///
/// Whole minutes only; the magnitude is truncated, the sign picks the suffix.
/// A delta of zero counts as ahead.
pub fn diff_human(a: DateTime<FixedOffset>, b: DateTime<FixedOffset>) -> String {
    let delta = a - b;
    let suffix = if delta < chrono::Duration::zero() {
        SUFFIX_BEHIND
    } else {
        SUFFIX_AHEAD
    };
    let minutes = delta.num_minutes().unsigned_abs();
    let hours = minutes / 60;
    let rem = minutes % 60;
    if hours > 0 {
        format!("{hours}h {rem}m {suffix}")
    } else {
        format!("{rem}m {suffix}")
    }
}

pub fn diff_human_str(a: &str, b: &str) -> Result<String, StatusError> {
    Ok(diff_human(parse_kickoff(a)?, parse_kickoff(b)?))
}
