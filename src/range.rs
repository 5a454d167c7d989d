use crate::error::{GitliticsError, Result};
use crate::model::DateRange;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::time::Duration;

/// Builds the commit date window from user-supplied bounds.
pub fn resolve_range(since: Option<&str>, until: Option<&str>, now: DateTime<Utc>) -> Result<DateRange> {
    let since_dt = since.map(|s| parse_date(s, now)).transpose()?;
    let until_dt = until.map(|u| parse_date(u, now)).transpose()?;

    if let (Some(s), Some(u)) = (since_dt, until_dt) {
        if s > u {
            return Err(GitliticsError::InvalidDate(format!(
                "Invalid range: since ({s}) is after until ({u})"
            )));
        }
    }

    let mut range = DateRange::new();
    if let Some(s) = since_dt {
        range = range.with_since(s);
    }
    if let Some(u) = until_dt {
        range = range.with_until(u);
    }
    Ok(range)
}

/// Accepts RFC3339, `YYYY-MM-DD` (midnight UTC), "N days/weeks/months ago",
/// or a humantime duration such as `90d` measured back from `now`.
pub fn parse_date(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&datetime));
        }
    }

    let duration = parse_natural_duration(input)
        .or_else(|| humantime::parse_duration(input.trim().trim_start_matches('-')).ok())
        .ok_or_else(|| GitliticsError::InvalidDate(format!("Unrecognized date '{input}'")))?;

    let duration = chrono::Duration::from_std(duration)
        .map_err(|_| GitliticsError::InvalidDate(format!("Duration overflow for '{input}'")))?;
    now.checked_sub_signed(duration)
        .ok_or_else(|| GitliticsError::InvalidDate(format!("Duration overflow for '{input}'")))
}

fn parse_natural_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();
    let rest = input.strip_suffix(" ago")?;
    let (count, unit) = rest.split_once(' ')?;
    let n: u64 = count.trim().parse().ok()?;

    let days = match unit.trim() {
        "day" | "days" => n,
        "week" | "weeks" => n * 7,
        "month" | "months" => n * 30,
        _ => return None,
    };
    Some(Duration::from_secs(days * 86400))
}
